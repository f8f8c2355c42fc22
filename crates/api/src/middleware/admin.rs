//! Admin guard for the dashboard routes.
//!
//! Runs after `auth_middleware`, so the claims are already in the request.

use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use debttracker_core::admin::is_admin;
use debttracker_shared::Claims;
use serde_json::json;
use tracing::warn;

use crate::AppState;

/// Rejects requests whose token email is not the configured admin email.
pub async fn require_admin(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let allowed = request
        .extensions()
        .get::<Claims>()
        .is_some_and(|claims| is_admin(state.admin_email.as_deref(), &claims.email));

    if !allowed {
        if let Some(claims) = request.extensions().get::<Claims>() {
            warn!(user_id = %claims.sub, "Non-admin attempted to access admin routes");
        }
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "forbidden",
                "message": "Administrator access required"
            })),
        )
            .into_response();
    }

    next.run(request).await
}
