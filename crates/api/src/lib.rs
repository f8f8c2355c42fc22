//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes
//! - Authentication and admin middleware
//! - Error responses

pub mod error;
pub mod middleware;
pub mod routes;

use axum::Router;
use debttracker_core::assistant::AssistantService;
use debttracker_core::ledger::LedgerStore;
use debttracker_core::notify::Notifier;
use debttracker_shared::JwtService;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Storage behind the debtor ledger.
    pub ledger_store: Arc<dyn LedgerStore>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Outbound account notifications.
    pub notifier: Arc<dyn Notifier>,
    /// AI assistant, if a model is configured.
    pub assistant: Option<Arc<AssistantService>>,
    /// The administrator's email, if any.
    pub admin_email: Option<String>,
    /// Base URL of the web client, used in emailed links.
    pub frontend_url: String,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
