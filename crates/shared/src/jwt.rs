//! JWT token generation and validation.
//!
//! Access, refresh and password reset tokens share one signing key and are
//! told apart by the `kind` claim.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;
use uuid::Uuid;

use crate::auth::{Claims, TokenKind};
use crate::config::JwtConfig;

/// Errors that can occur during JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Token encoding failed.
    #[error("failed to encode token: {0}")]
    EncodingError(String),

    /// Token decoding failed.
    #[error("failed to decode token: {0}")]
    DecodingError(String),

    /// Token has expired.
    #[error("token has expired")]
    Expired,

    /// Token is valid but was issued for another purpose.
    #[error("token kind mismatch: expected {expected:?}, got {actual:?}")]
    WrongKind {
        /// Kind the caller asked for.
        expected: TokenKind,
        /// Kind found in the claims.
        actual: TokenKind,
    },

    /// Token was issued against credentials that have since changed.
    #[error("token has been superseded")]
    Superseded,
}

/// JWT service for token operations.
#[derive(Clone)]
pub struct JwtService {
    access_ttl: Duration,
    refresh_ttl: Duration,
    password_reset_ttl: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("password_reset_ttl", &self.password_reset_ttl)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

#[allow(clippy::cast_possible_wrap)]
fn seconds(secs: u64) -> Duration {
    Duration::seconds(secs as i64)
}

impl JwtService {
    /// Creates a new JWT service from configuration.
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            access_ttl: seconds(config.access_token_expiry_secs),
            refresh_ttl: seconds(config.refresh_token_expiry_secs),
            password_reset_ttl: seconds(config.password_reset_expiry_secs),
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
        }
    }

    fn claims_for(&self, user_id: Uuid, email: &str, kind: TokenKind) -> Claims {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
            TokenKind::PasswordReset => self.password_reset_ttl,
        };
        Claims::new(user_id, email, kind, Utc::now() + ttl)
    }

    fn issue(&self, user_id: Uuid, email: &str, kind: TokenKind) -> Result<String, JwtError> {
        self.sign(&self.claims_for(user_id, email, kind))
    }

    fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    /// Generates an access token for a user.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if token generation fails.
    pub fn generate_access_token(&self, user_id: Uuid, email: &str) -> Result<String, JwtError> {
        self.issue(user_id, email, TokenKind::Access)
    }

    /// Generates a refresh token for a user.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if token generation fails.
    pub fn generate_refresh_token(&self, user_id: Uuid, email: &str) -> Result<String, JwtError> {
        self.issue(user_id, email, TokenKind::Refresh)
    }

    /// Generates a password reset token bound to the account's current
    /// credential stamp. Changing the password moves the stamp, so the token
    /// is accepted at most once.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if token generation fails.
    pub fn generate_password_reset_token(
        &self,
        user_id: Uuid,
        email: &str,
        stamp: i64,
    ) -> Result<String, JwtError> {
        self.sign(
            &self
                .claims_for(user_id, email, TokenKind::PasswordReset)
                .with_stamp(stamp),
        )
    }

    /// Validates a password reset token against the account's current
    /// credential stamp.
    ///
    /// # Errors
    ///
    /// Everything `validate_token` returns, plus `JwtError::Superseded` when
    /// the stamp is missing or no longer matches.
    pub fn validate_password_reset_token(
        &self,
        token: &str,
        current_stamp: i64,
    ) -> Result<Claims, JwtError> {
        let claims = self.validate_token(token, TokenKind::PasswordReset)?;
        if claims.stamp != Some(current_stamp) {
            return Err(JwtError::Superseded);
        }
        Ok(claims)
    }

    /// Validates a token and checks that it was issued for `expected`.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Expired` if the token has expired, `JwtError::WrongKind`
    /// if it belongs to another flow, `JwtError::DecodingError` otherwise.
    pub fn validate_token(&self, token: &str, expected: TokenKind) -> Result<Claims, JwtError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::DecodingError(e.to_string()),
            })?;

        if claims.kind != expected {
            return Err(JwtError::WrongKind {
                expected,
                actual: claims.kind,
            });
        }

        Ok(claims)
    }

    /// Returns the access token expiration in seconds.
    #[must_use]
    pub const fn access_token_expires_in(&self) -> i64 {
        self.access_ttl.num_seconds()
    }
}

#[cfg(test)]
#[path = "jwt_tests.rs"]
mod tests;
