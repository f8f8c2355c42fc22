//! API route definitions.

use axum::{Router, middleware};

use crate::{
    AppState,
    middleware::{auth_middleware, require_admin},
};

pub mod admin;
pub mod assistant;
pub mod auth;
pub mod debtors;
pub mod health;

/// Creates the API router, wiring auth and admin middleware with state.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Admin checks run inside the auth layer so claims are present.
    let admin_routes = admin::routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        require_admin,
    ));

    let protected_routes = Router::new()
        .merge(debtors::routes())
        .merge(assistant::routes())
        .merge(admin_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}
