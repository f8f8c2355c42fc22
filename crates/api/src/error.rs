//! HTTP error responses.
//!
//! Handlers return `Result<_, ApiError>`. The body is always
//! `{ "error": <snake_case code>, "message": <text> }`; infrastructure
//! failures are logged here and reach the client as a generic message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use debttracker_core::assistant::AssistantError;
use debttracker_core::auth::PasswordError;
use debttracker_core::ledger::{LedgerError, ValidationError};
use debttracker_shared::{AppError, JwtError};
use sea_orm::DbErr;
use serde_json::json;
use tracing::error;

/// Error type returned by handlers.
#[derive(Debug)]
pub struct ApiError(pub AppError);

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// 404 with `message`.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self(AppError::NotFound(message.into()))
    }

    /// 401 with `message`.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self(AppError::Unauthorized(message.into()))
    }

    /// 400 with `message`.
    pub fn validation(message: impl Into<String>) -> Self {
        Self(AppError::Validation(message.into()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.0.is_internal() {
            error!(error = %self.0, "Request failed");
        }

        (
            status,
            Json(json!({
                "error": self.0.error_code().to_lowercase(),
                "message": self.0.public_message(),
            })),
        )
            .into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self(err.into())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        Self(err.into())
    }
}

impl From<AssistantError> for ApiError {
    fn from(err: AssistantError) -> Self {
        Self(err.into())
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self(AppError::Database(err.to_string()))
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::EncodingError(_) => Self(AppError::Internal(err.to_string())),
            JwtError::Expired => Self::unauthorized("Token has expired"),
            JwtError::Superseded => Self::unauthorized("This reset link has already been used"),
            JwtError::DecodingError(_) | JwtError::WrongKind { .. } => {
                Self::unauthorized("Invalid or malformed token")
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .find_map(|e| e.message.as_ref().map(ToString::to_string))
            .unwrap_or_else(|| "Invalid request".to_string());

        Self::validation(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use rstest::rstest;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[rstest]
    #[case(AppError::NotFound("Debtor not found".into()), StatusCode::NOT_FOUND, "not_found")]
    #[case(AppError::Conflict("retry".into()), StatusCode::CONFLICT, "conflict")]
    #[case(
        AppError::Unavailable("off".into()),
        StatusCode::SERVICE_UNAVAILABLE,
        "service_unavailable"
    )]
    #[tokio::test]
    async fn test_error_body_shape(
        #[case] err: AppError,
        #[case] status: StatusCode,
        #[case] code: &str,
    ) {
        let message = err.public_message();
        let response = ApiError(err).into_response();

        assert_eq!(response.status(), status);
        let body = body_json(response).await;
        assert_eq!(body["error"], code);
        assert_eq!(body["message"], message);
    }

    #[tokio::test]
    async fn test_database_error_detail_is_hidden() {
        let response = ApiError::from(DbErr::Custom("password=secret".into())).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "database_error");
        assert!(!body["message"].as_str().unwrap().contains("secret"));
    }

    #[test]
    fn test_ledger_conflict_maps_to_409() {
        let err = ApiError::from(LedgerError::ConcurrentModification);
        assert_eq!(err.0.status_code(), 409);
    }

    #[test]
    fn test_expired_token_is_unauthorized() {
        let err = ApiError::from(JwtError::Expired);
        assert_eq!(err.0.status_code(), 401);
        assert_eq!(err.0.public_message(), "Token has expired");
    }

    #[test]
    fn test_superseded_reset_token_is_unauthorized() {
        let err = ApiError::from(JwtError::Superseded);
        assert_eq!(err.0.status_code(), 401);
        assert_eq!(
            err.0.public_message(),
            "This reset link has already been used"
        );
    }
}
