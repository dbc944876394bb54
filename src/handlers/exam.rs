// src/handlers/exam.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        question::{PaperQuestion, question_bank},
        session::ExamSession,
        student::StudentIdentity,
    },
    state::AppState,
};

/// Returns the resolved exam info for the header. Never fails: the singleton
/// always holds at least the compiled-in defaults.
pub async fn exam_info(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.exam_info.read().await.clone())
}

/// DTO for starting an exam session.
#[derive(Debug, Deserialize, Validate)]
pub struct StartExamRequest {
    #[validate(custom(function = validate_name))]
    pub name: String,
    /// Classroom selector, 1..=13 (displayed as 5/1 .. 5/13).
    #[validate(range(min = 1, max = 13))]
    pub room: u32,
    /// Seat number, 1..=40.
    #[validate(range(min = 1, max = 40))]
    pub number: u32,
}

fn validate_name(name: &str) -> Result<(), validator::ValidationError> {
    if name.trim().is_empty() {
        return Err(validator::ValidationError::new("name_cannot_be_blank"));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperResponse {
    pub session_id: Uuid,
    pub questions: Vec<PaperQuestion>,
    pub total: usize,
}

/// Starts a new exam session: validates identity, shuffles a fresh paper and
/// returns it without answer keys.
pub async fn start_exam(
    State(state): State<AppState>,
    Json(payload): Json<StartExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let student = StudentIdentity {
        name: payload.name.trim().to_string(),
        room: format!("5/{}", payload.room),
        number: payload.number,
    };
    tracing::info!(student = %student.record_id(), "exam started");

    // The thread rng must not cross an await point.
    let session = {
        let mut rng = rand::rng();
        ExamSession::start(student, question_bank(), &mut rng)
    };

    let session_id = Uuid::new_v4();
    let response = PaperResponse {
        session_id,
        total: session.total_questions(),
        questions: session.paper(),
    };
    state.sessions.lock().await.insert(session_id, session);

    Ok((StatusCode::CREATED, Json(response)))
}

/// DTO for answering one question.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectAnswerRequest {
    pub question_id: i64,
    pub option_index: usize,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub answered: usize,
    pub total: usize,
}

/// Upserts the chosen option for one question. Idempotent: re-answering
/// overwrites the previous choice.
pub async fn select_answer(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<SelectAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut sessions = state.sessions.lock().await;
    let session = sessions
        .get_mut(&session_id)
        .ok_or(AppError::SessionNotFound)?;

    session.select_answer(payload.question_id, payload.option_index)?;

    Ok(Json(ProgressResponse {
        answered: session.answered_count(),
        total: session.total_questions(),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchResponse {
    pub switch_count: u32,
}

/// Reports one visible-to-hidden transition of the exam tab. The UI calls
/// this from its visibility handler; the count only moves while answering.
pub async fn report_tab_switch(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut sessions = state.sessions.lock().await;
    let session = sessions
        .get_mut(&session_id)
        .ok_or(AppError::SessionNotFound)?;

    let switch_count = session.record_tab_switch()?;
    Ok(Json(SwitchResponse { switch_count }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub raw_score: u32,
    pub weighted_score: f64,
    pub passed: bool,
    pub switch_count: u32,
    pub attempts: u32,
}

/// Submits the exam: scores the sitting, merges it into the student's stored
/// record (local store is authoritative), then replicates to the sheet
/// fire-and-forget.
pub async fn submit_exam(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (student, attempt) = {
        let mut sessions = state.sessions.lock().await;
        let session = sessions
            .get_mut(&session_id)
            .ok_or(AppError::SessionNotFound)?;
        let attempt = session.submit()?;
        (session.student().clone(), attempt)
    };

    let timestamp = chrono::Utc::now().timestamp_millis();
    let record = state.store.upsert_record(&student, &attempt, timestamp).await?;
    state.sheets.push_record_detached(&record);

    tracing::info!(
        student = %record.id,
        raw = attempt.raw_score,
        passed = attempt.passed,
        attempts = record.attempts,
        "exam submitted"
    );

    Ok(Json(SubmitResponse {
        raw_score: attempt.raw_score,
        weighted_score: attempt.weighted_score,
        passed: attempt.passed,
        switch_count: attempt.switch_count,
        attempts: record.attempts,
    }))
}

/// Restarts the exam after a submission: fresh shuffle, cleared answers and
/// switch counter, same identity.
pub async fn retry_exam(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut sessions = state.sessions.lock().await;
    let session = sessions
        .get_mut(&session_id)
        .ok_or(AppError::SessionNotFound)?;

    {
        let mut rng = rand::rng();
        session.retry(question_bank(), &mut rng)?;
    }

    Ok(Json(PaperResponse {
        session_id,
        total: session.total_questions(),
        questions: session.paper(),
    }))
}

/// Ends the session and forgets all of its state.
pub async fn leave_exam(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state
        .sessions
        .lock()
        .await
        .remove(&session_id)
        .ok_or(AppError::SessionNotFound)?;
    Ok(StatusCode::NO_CONTENT)
}
