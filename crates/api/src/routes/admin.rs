//! Admin dashboard routes.
//!
//! Mounted behind `require_admin`.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get},
};
use debttracker_core::admin::{Account, AdminStats, UserOverview, build_overviews};
use debttracker_db::{DebtorRepository, UserRepository};
use debttracker_shared::types::{PageRequest, PageResponse};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::{ApiError, ApiResult, AppState, middleware::AuthUser};

/// Creates the admin routes (requires auth and admin middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/{user_id}", delete(delete_user))
        .route("/admin/stats", get(stats))
}

/// Result of deleting a user.
#[derive(Debug, Serialize)]
pub struct DeleteUserResponse {
    /// The removed user.
    pub user_id: Uuid,
    /// Debtors removed with them.
    pub deleted_debtors: u64,
}

/// GET /admin/users - Users with their debtors, newest first.
async fn list_users(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<PageResponse<UserOverview>>> {
    let page = page.normalized();
    let (users, total) = UserRepository::new((*state.db).clone())
        .list_newest_first(&page)
        .await?;

    let ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();
    let debtors = DebtorRepository::new((*state.db).clone())
        .list_for_owners(&ids)
        .await?;

    let accounts = users.into_iter().map(Account::from).collect();
    Ok(Json(PageResponse::new(
        build_overviews(accounts, debtors)?,
        page.page,
        page.per_page,
        total,
    )))
}

/// GET /admin/stats - Platform-wide totals.
async fn stats(State(state): State<AppState>) -> ApiResult<Json<AdminStats>> {
    let total_users = UserRepository::new((*state.db).clone()).count().await?;
    let totals = DebtorRepository::new((*state.db).clone()).totals().await?;

    Ok(Json(AdminStats {
        total_users,
        total_debtors: totals.debtors,
        total_debt_amount: totals.total_debt,
    }))
}

/// DELETE /admin/users/{user_id} - Delete a user and all their debtors.
async fn delete_user(
    State(state): State<AppState>,
    admin: AuthUser,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<DeleteUserResponse>> {
    let deleted_debtors = UserRepository::new((*state.db).clone())
        .delete_with_debtors(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    info!(
        admin_id = %admin.user_id(),
        user_id = %user_id,
        deleted_debtors,
        "Admin deleted user"
    );
    Ok(Json(DeleteUserResponse {
        user_id,
        deleted_debtors,
    }))
}
