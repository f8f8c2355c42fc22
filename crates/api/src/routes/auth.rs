//! Authentication routes: register, login, token refresh and password reset.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use chrono::Utc;
use debttracker_core::admin::is_admin;
use debttracker_core::auth::{hash_password, validate_password, verify_password};
use debttracker_core::notify::{Notification, dispatch_best_effort};
use debttracker_db::{UserRepository, entities::users};
use debttracker_shared::auth::{
    LoginRequest, LoginResponse, PasswordResetConfirmRequest, PasswordResetRequest,
    RefreshRequest, RegisterRequest, UserInfo, normalize_email,
};
use debttracker_shared::{AppError, TokenKind};
use sea_orm::SqlErr;
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::{ApiError, ApiResult, AppState};

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const RESET_LINK_USED: &str = "This reset link has already been used";

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/refresh", post(refresh))
        .route("/auth/password-reset", post(request_password_reset))
        .route("/auth/password-reset/confirm", post(confirm_password_reset))
}

/// Issues both tokens for `user`.
fn session_for(state: &AppState, user: users::Model) -> ApiResult<LoginResponse> {
    let access_token = state
        .jwt_service
        .generate_access_token(user.id, &user.email)?;
    let refresh_token = state
        .jwt_service
        .generate_refresh_token(user.id, &user.email)?;

    Ok(LoginResponse {
        is_admin: is_admin(state.admin_email.as_deref(), &user.email),
        user: UserInfo {
            id: user.id,
            email: user.email,
            created_at: user.created_at.to_utc(),
        },
        access_token,
        refresh_token,
        expires_in: state.jwt_service.access_token_expires_in(),
    })
}

/// POST /auth/login - Authenticate user and return tokens.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user_repo = UserRepository::new((*state.db).clone());
    let email = normalize_email(&payload.email);

    let Some(user) = user_repo.find_by_email(&email).await? else {
        info!(email = %email, "Login attempt for non-existent user");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        info!(user_id = %user.id, "Failed login attempt - invalid password");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    info!(user_id = %user.id, "User logged in successfully");
    Ok(Json(session_for(&state, user)?))
}

/// POST /auth/register - Register a new user and sign them in.
async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    payload.email = normalize_email(&payload.email);
    payload.validate()?;

    let user_repo = UserRepository::new((*state.db).clone());
    if user_repo.email_exists(&payload.email).await? {
        return Err(AppError::Conflict("An account with this email already exists".into()).into());
    }

    let password_hash = hash_password(&payload.password)?;
    let user = match user_repo.create(&payload.email, &password_hash).await {
        Ok(u) => u,
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return Err(
                AppError::Conflict("An account with this email already exists".into()).into(),
            );
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = %user.id, email = %user.email, "New user registered");

    dispatch_best_effort(
        state.notifier.clone(),
        Notification::UserRegistered {
            uid: user.id,
            email: user.email.clone(),
            created_at: user.created_at.to_utc(),
        },
    );

    Ok((StatusCode::CREATED, Json(session_for(&state, user)?)))
}

/// POST /auth/refresh - Exchange a refresh token for a new access token.
async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> ApiResult<impl IntoResponse> {
    let claims = state
        .jwt_service
        .validate_token(&payload.refresh_token, TokenKind::Refresh)?;

    let user_repo = UserRepository::new((*state.db).clone());
    let Some(user) = user_repo.find_by_id(claims.user_id()).await? else {
        info!(user_id = %claims.user_id(), "Refresh for deleted account");
        return Err(ApiError::unauthorized("Account no longer exists"));
    };

    let access_token = state
        .jwt_service
        .generate_access_token(user.id, &user.email)?;

    Ok(Json(json!({
        "access_token": access_token,
        "expires_in": state.jwt_service.access_token_expires_in()
    })))
}

/// POST /auth/password-reset - Email a reset link to a registered address.
async fn request_password_reset(
    State(state): State<AppState>,
    Json(payload): Json<PasswordResetRequest>,
) -> ApiResult<impl IntoResponse> {
    let email = normalize_email(&payload.email);
    if email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }

    let user_repo = UserRepository::new((*state.db).clone());
    let Some(user) = user_repo.find_by_email(&email).await? else {
        return Err(ApiError::not_found("No account is registered with this email"));
    };

    let token = state
        .jwt_service
        .generate_password_reset_token(user.id, &user.email, user.credential_stamp())?;
    let reset_url = format!(
        "{}/reset-password?token={token}",
        state.frontend_url.trim_end_matches('/')
    );

    dispatch_best_effort(
        state.notifier.clone(),
        Notification::PasswordReset {
            email: user.email,
            timestamp: Utc::now(),
            reset_url,
        },
    );
    info!(user_id = %user.id, "Password reset requested");

    Ok(Json(json!({
        "message": "If the email service is available, a reset link is on its way."
    })))
}

/// POST /auth/password-reset/confirm - Set a new password using a reset token.
async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(payload): Json<PasswordResetConfirmRequest>,
) -> ApiResult<impl IntoResponse> {
    payload.validate()?;
    validate_password(&payload.new_password)?;

    let claims = state
        .jwt_service
        .validate_token(&payload.token, TokenKind::PasswordReset)?;

    let user_repo = UserRepository::new((*state.db).clone());
    let Some(user) = user_repo.find_by_id(claims.user_id()).await? else {
        return Err(ApiError::not_found("Account no longer exists"));
    };
    state
        .jwt_service
        .validate_password_reset_token(&payload.token, user.credential_stamp())?;

    let password_hash = hash_password(&payload.new_password)?;
    if !user_repo.update_password(&user, &password_hash).await? {
        info!(user_id = %user.id, "Password reset lost a race with another reset");
        return Err(ApiError::unauthorized(RESET_LINK_USED));
    }

    info!(user_id = %user.id, "Password reset completed");
    Ok(Json(json!({ "message": "Password updated" })))
}
