// src/routes.rs

use axum::{
    Router, http::Method, middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, exam},
    state::AppState,
    utils::auth::admin_middleware,
};

/// Assembles the main application router.
///
/// * `/api/exam` — the student-facing flow (info, start, answer, submit).
/// * `/api/admin` — the teacher panel, gated by the shared code header
///   (login itself stays open so the UI can verify the code).
/// * Applies global middleware (Trace, CORS) and injects the state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderName::from_static(crate::utils::auth::ADMIN_CODE_HEADER),
        ]);

    let exam_routes = Router::new()
        .route("/info", get(exam::exam_info))
        .route("/start", post(exam::start_exam))
        .route("/{session_id}/answer", post(exam::select_answer))
        .route("/{session_id}/switch", post(exam::report_tab_switch))
        .route("/{session_id}/submit", post(exam::submit_exam))
        .route("/{session_id}/retry", post(exam::retry_exam))
        .route("/{session_id}/home", post(exam::leave_exam));

    let admin_routes = Router::new()
        .route("/login", post(admin::login))
        .merge(
            Router::new()
                .route("/report", get(admin::report))
                .route(
                    "/settings",
                    get(admin::get_settings).put(admin::update_settings),
                )
                .route("/settings/reset", post(admin::reset_settings))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    admin_middleware,
                )),
        );

    Router::new()
        .nest("/api/exam", exam_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
