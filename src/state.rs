// src/state.rs

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::FromRef;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::config::Config;
use crate::models::exam_info::ExamInfo;
use crate::models::session::ExamSession;
use crate::sheets::SheetClient;
use crate::store::LocalStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: LocalStore,
    pub sheets: SheetClient,
    /// The resolved exam info singleton: default <- cached <- remote, mutated
    /// only through the admin settings path and the startup sync.
    pub exam_info: Arc<RwLock<ExamInfo>>,
    /// Live exam sessions, keyed by the id handed to the UI on start.
    pub sessions: Arc<Mutex<HashMap<Uuid, ExamSession>>>,
}

impl AppState {
    pub fn new(config: Config, store: LocalStore, initial_info: ExamInfo) -> Self {
        let sheets = SheetClient::new(config.sheet_url.clone());
        Self {
            config,
            store,
            sheets,
            exam_info: Arc::new(RwLock::new(initial_info)),
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

// Lets the admin gate middleware extract `State<Config>` directly.
impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
