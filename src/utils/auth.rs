// src/utils/auth.rs

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::config::Config;

/// Header carrying the shared teacher code on admin requests.
pub const ADMIN_CODE_HEADER: &str = "x-admin-code";

/// Axum Middleware: teacher panel gate.
///
/// Compares the `x-admin-code` header against the configured shared code.
/// This is deliberately a weak, static gate (one code, no expiry) and not a
/// security boundary; it only keeps students out of the report view.
pub async fn admin_middleware(
    State(config): State<Config>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let code = req
        .headers()
        .get(ADMIN_CODE_HEADER)
        .and_then(|value| value.to_str().ok());

    match code {
        Some(code) if code == config.admin_code => Ok(next.run(req).await),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}
