// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    error::AppError,
    models::{exam_info::ExamInfo, exam_record::ExamRecord},
    state::AppState,
};

/// DTO for the login convenience check. The real gate is the middleware on
/// every other admin route; this endpoint only lets the UI verify the code
/// before switching to the teacher view.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub code: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.code != state.config.admin_code {
        return Err(AppError::AuthError("Invalid code".to_string()));
    }
    Ok(Json(serde_json::json!({ "ok": true })))
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    /// Room filter: "all" (default) or a room selector like "7" for 5/7.
    pub room: Option<String>,
}

/// One report row: the stored record plus its normalized room label.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    #[serde(flatten)]
    pub record: ExamRecord,
    pub display_room: String,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    /// "sheet" when the remote store answered, "local" otherwise, so the
    /// teacher knows when the report shows cached data.
    pub source: &'static str,
    pub total: usize,
    pub records: Vec<ReportRow>,
}

/// Builds the score report. Tries the sheet first; any failure or
/// wrong-shaped payload falls back to the local store.
pub async fn report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (source, records) = match state.sheets.fetch_records().await {
        Some(records) => ("sheet", records),
        None => ("local", state.store.load_records().await?),
    };

    let mut rows: Vec<ReportRow> = records
        .into_iter()
        .map(|record| ReportRow {
            display_room: record.display_room(),
            record,
        })
        .collect();

    if let Some(room) = query.room.as_deref().filter(|r| *r != "all") {
        let wanted = format!("5/{}", room);
        rows.retain(|row| row.display_room == wanted);
    }

    rows.sort_by(|a, b| {
        room_sort_key(&a.display_room)
            .cmp(&room_sort_key(&b.display_room))
            .then(a.record.number.cmp(&b.record.number))
    });

    Ok(Json(ReportResponse {
        source,
        total: rows.len(),
        records: rows,
    }))
}

/// Orders "5/2" before "5/11"; unparsable labels sort first.
fn room_sort_key(display_room: &str) -> u32 {
    display_room
        .split('/')
        .nth(1)
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

pub async fn get_settings(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.exam_info.read().await.clone())
}

/// DTO for the settings form. School and title must be present; the other
/// fields may be cleared on purpose.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[validate(length(min = 1))]
    pub school: String,
    #[validate(length(min = 1))]
    pub title: String,
    pub subject: String,
    pub score_info: String,
    pub instruction: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSettingsResponse {
    pub saved: bool,
    /// Whether the push to the sheet went through. The local write stands
    /// either way.
    pub remote_synced: bool,
}

/// Saves the exam info: singleton and local cache synchronously, then a push
/// to the sheet whose outcome is reported but never rolled back.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let info = ExamInfo {
        school: payload.school,
        title: payload.title,
        subject: payload.subject,
        score_info: payload.score_info,
        instruction: payload.instruction,
    };

    *state.exam_info.write().await = info.clone();
    state.store.save_exam_info(&info).await?;

    let remote_synced = state.sheets.push_settings(&info).await;
    tracing::info!(remote_synced, "exam info updated by admin");

    Ok(Json(SaveSettingsResponse {
        saved: true,
        remote_synced,
    }))
}

/// Restores the compiled-in default exam info, locally only.
pub async fn reset_settings(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let info = ExamInfo::default();
    *state.exam_info.write().await = info.clone();
    state.store.save_exam_info(&info).await?;
    Ok(Json(info))
}
