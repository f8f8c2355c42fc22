//! Authentication helpers.
//!
//! - Password policy
//! - Password hashing with Argon2id
//! - Password verification

mod password;

pub use password::{
    MIN_PASSWORD_LEN, PasswordError, hash_password, validate_password, verify_password,
};

use debttracker_shared::AppError;

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooShort { .. } => Self::Validation(err.to_string()),
            PasswordError::HashError(_)
            | PasswordError::VerifyError(_)
            | PasswordError::InvalidHash => Self::Internal(err.to_string()),
        }
    }
}
