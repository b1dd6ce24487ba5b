//! Admin authentication for the data reload endpoint.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

/// Admin token from config.
#[derive(Clone)]
pub struct AdminToken(pub Arc<String>);

/// Middleware that requires `Authorization: Bearer <admin_token>`.
pub async fn require_admin(
    State(admin_token): State<AdminToken>,
    request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match auth_header.map(|auth| auth.strip_prefix("Bearer ")) {
        Some(Some(token)) if token == admin_token.0.as_str() => next.run(request).await,
        Some(Some(_)) => {
            tracing::warn!("rejected admin request with invalid token");
            (
                StatusCode::FORBIDDEN,
                Json(serde_json::json!({
                    "error": "invalid_admin_token",
                    "hint": "Check CAMPUS_ADMIN_TOKEN environment variable"
                })),
            )
                .into_response()
        }
        Some(None) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "invalid_authorization_header",
                "expected": "Bearer <token>"
            })),
        )
            .into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "error": "authorization_required",
                "hint": "Add header: Authorization: Bearer <admin_token>"
            })),
        )
            .into_response(),
    }
}
