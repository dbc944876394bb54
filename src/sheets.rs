// src/sheets.rs

use reqwest::header::CONTENT_TYPE;

use crate::models::exam_info::{ExamInfo, ExamInfoPatch};
use crate::models::exam_record::ExamRecord;

/// Client for the Apps-Script sheet webhook. One URL, two semantics:
/// `GET ?type=setting` returns the exam info, plain `GET` returns the record
/// array, and `POST` ingests either a record or a `{type: "setting", ...}`
/// payload. The sheet is best-effort replication only — every failure here
/// degrades to the local store and is never surfaced on the student path.
///
/// The original UI posted with `mode: no-cors` and a text/plain body; the
/// same body format is kept so the deployed script needs no changes.
#[derive(Clone)]
pub struct SheetClient {
    http: reqwest::Client,
    url: Option<String>,
}

impl SheetClient {
    /// `None` disables the client entirely (offline deployment).
    pub fn new(url: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.url.is_some()
    }

    /// Fetches the shared exam info. Returns the validated patch together with
    /// the raw payload text, which the caller caches verbatim. Any network,
    /// parse or shape problem yields `None`.
    pub async fn fetch_settings(&self) -> Option<(ExamInfoPatch, String)> {
        let url = self.url.as_ref()?;
        let response = match self.http.get(url).query(&[("type", "setting")]).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("could not fetch exam info from sheet: {}", e);
                return None;
            }
        };
        let body = response.text().await.ok()?;
        let patch: ExamInfoPatch = serde_json::from_str(&body).ok()?;
        if !patch.is_valid_settings() {
            tracing::debug!("sheet settings payload rejected: missing school/title");
            return None;
        }
        Some((patch, body))
    }

    /// Fetches all records from the sheet. Anything that is not a JSON array
    /// of record-shaped objects yields `None` and the caller falls back to
    /// the local store.
    pub async fn fetch_records(&self) -> Option<Vec<ExamRecord>> {
        let url = self.url.as_ref()?;
        let response = match self.http.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("could not fetch records from sheet: {}", e);
                return None;
            }
        };
        let value: serde_json::Value = response.json().await.ok()?;
        if !value.is_array() {
            tracing::warn!("sheet returned a non-array record payload");
            return None;
        }
        serde_json::from_value(value).ok()
    }

    /// Fire-and-forget replication of one merged record. At-most-once: a
    /// failed push is logged and never retried; the local store already holds
    /// the authoritative copy.
    pub fn push_record_detached(&self, record: &ExamRecord) {
        let Some(url) = self.url.clone() else {
            return;
        };
        let body = match serde_json::to_string(record) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("could not serialize record {}: {}", record.id, e);
                return;
            }
        };
        let http = self.http.clone();
        let record_id = record.id.clone();
        tokio::spawn(async move {
            match http
                .post(&url)
                .header(CONTENT_TYPE, "text/plain")
                .body(body)
                .send()
                .await
            {
                Ok(_) => tracing::debug!("record {} replicated to sheet", record_id),
                Err(e) => tracing::error!("failed to sync record {} to sheet: {}", record_id, e),
            }
        });
    }

    /// Pushes the exam info to the sheet. Awaited so the admin save can report
    /// whether replication succeeded; the local write is never rolled back
    /// either way.
    pub async fn push_settings(&self, info: &ExamInfo) -> bool {
        let Some(url) = self.url.as_ref() else {
            return false;
        };
        let mut payload = match serde_json::to_value(info) {
            Ok(payload) => payload,
            Err(_) => return false,
        };
        if let serde_json::Value::Object(map) = &mut payload {
            map.insert("type".to_string(), "setting".into());
        }
        match self
            .http
            .post(url)
            .header(CONTENT_TYPE, "text/plain")
            .body(payload.to_string())
            .send()
            .await
        {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("failed to push settings to sheet: {}", e);
                false
            }
        }
    }
}
