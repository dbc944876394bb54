// src/main.rs

use std::net::SocketAddr;
use std::time::Duration;

use dotenvy::dotenv;
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use examroom::config::Config;
use examroom::models::exam_info::ExamInfo;
use examroom::routes;
use examroom::state::AppState;
use examroom::store::LocalStore;

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Initialize Database Pool
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&config.database_url)
        .await
        .expect("Failed to open the local database");

    tracing::info!("Database connected...");

    // Run Migrations Automatically
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    let store = LocalStore::new(pool);

    // Resolve the exam info from the local cache; the remote layer is applied
    // by the background sync once (and if) the sheet answers.
    let cached = match store.load_exam_info().await {
        Ok(cached) => cached,
        Err(e) => {
            tracing::warn!("could not read cached exam info: {}", e);
            None
        }
    };
    let initial_info = ExamInfo::resolve(cached.as_ref(), None);

    // Create AppState
    let state = AppState::new(config.clone(), store, initial_info);

    // Pull shared settings from the sheet without blocking startup
    tokio::spawn(sync_exam_info(state.clone()));

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("examroom listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    // Start the server
    axum::serve(listener, app).await.unwrap();
}

/// One-shot startup sync: fetch the shared settings from the sheet, merge
/// them over whatever is currently resolved, and cache the payload verbatim
/// for the next offline start. A dead or misbehaving sheet leaves the
/// cached/default values in place.
async fn sync_exam_info(state: AppState) {
    if !state.sheets.is_enabled() {
        return;
    }
    let Some((patch, raw_payload)) = state.sheets.fetch_settings().await else {
        tracing::info!("sheet settings unavailable, keeping cached exam info");
        return;
    };

    {
        let mut info = state.exam_info.write().await;
        *info = info.merged_with(&patch);
    }
    if let Err(e) = state.store.save_exam_info_raw(&raw_payload).await {
        tracing::warn!("could not cache remote exam info: {}", e);
    }
    tracing::info!("exam info synced from sheet");
}
