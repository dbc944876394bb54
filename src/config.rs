// src/config.rs

use dotenvy::dotenv;
use std::env;

/// Raw score required to pass the exam.
pub const PASS_SCORE: u32 = 16;
/// Maximum raw score (one point per question).
pub const MAX_RAW_SCORE: u32 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Google Apps Script webhook replicating records and settings to a sheet.
    /// `None` disables all remote sync; the service still runs fully offline.
    pub sheet_url: Option<String>,
    /// Static shared code gating the teacher panel. Not a security boundary.
    pub admin_code: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    /// Loads configuration from the environment. Every variable has a
    /// compiled-in default so the service comes up with no configuration at
    /// all (the exam must stay usable offline).
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://examroom.db?mode=rwc".to_string());

        let sheet_url = env::var("SHEET_WEBHOOK_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let admin_code = env::var("ADMIN_CODE").unwrap_or_else(|_| "12345".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            database_url,
            sheet_url,
            admin_code,
            port,
            rust_log,
        }
    }
}
