//! Unit tests for JWT functionality.

use super::*;
use crate::config::JwtConfig;

fn config(access_secs: u64) -> JwtConfig {
    JwtConfig {
        secret: "test-secret-key-for-jwt".to_string(),
        access_token_expiry_secs: access_secs,
        refresh_token_expiry_secs: 604_800,
        password_reset_expiry_secs: 3600,
    }
}

fn service() -> JwtService {
    JwtService::new(&config(900))
}

#[test]
fn test_claims_new_sets_correct_fields() {
    let user_id = Uuid::new_v4();
    let expires_at = Utc::now() + Duration::hours(1);

    let claims = Claims::new(user_id, "ana@example.com", TokenKind::Access, expires_at);

    assert_eq!(claims.user_id(), user_id);
    assert_eq!(claims.email, "ana@example.com");
    assert_eq!(claims.kind, TokenKind::Access);
    assert!(claims.iat <= Utc::now().timestamp());
    assert_eq!(claims.exp, expires_at.timestamp());
}

#[test]
fn test_access_token_roundtrip() {
    let jwt = service();
    let user_id = Uuid::new_v4();

    let token = jwt.generate_access_token(user_id, "ana@example.com").unwrap();
    let claims = jwt.validate_token(&token, TokenKind::Access).unwrap();

    assert_eq!(claims.sub, user_id);
    assert_eq!(claims.email, "ana@example.com");
    assert_eq!(claims.kind, TokenKind::Access);
}

#[test]
fn test_refresh_token_rejected_as_access() {
    let jwt = service();
    let token = jwt
        .generate_refresh_token(Uuid::new_v4(), "ana@example.com")
        .unwrap();

    let err = jwt.validate_token(&token, TokenKind::Access).unwrap_err();
    assert!(matches!(
        err,
        JwtError::WrongKind {
            expected: TokenKind::Access,
            actual: TokenKind::Refresh
        }
    ));
}

#[test]
fn test_password_reset_token_only_valid_for_reset() {
    let jwt = service();
    let token = jwt
        .generate_password_reset_token(Uuid::new_v4(), "ana@example.com", 1_700_000_000_000_000)
        .unwrap();

    assert!(jwt.validate_token(&token, TokenKind::PasswordReset).is_ok());
    assert!(jwt.validate_token(&token, TokenKind::Refresh).is_err());
}

#[test]
fn test_password_reset_token_accepted_for_current_stamp() {
    let jwt = service();
    let user_id = Uuid::new_v4();
    let stamp = 1_700_000_000_000_000;
    let token = jwt
        .generate_password_reset_token(user_id, "ana@example.com", stamp)
        .unwrap();

    let claims = jwt.validate_password_reset_token(&token, stamp).unwrap();
    assert_eq!(claims.user_id(), user_id);
    assert_eq!(claims.stamp, Some(stamp));
}

#[test]
fn test_password_reset_token_rejected_after_password_change() {
    let jwt = service();
    let stamp = 1_700_000_000_000_000;
    let token = jwt
        .generate_password_reset_token(Uuid::new_v4(), "ana@example.com", stamp)
        .unwrap();

    // First use moved the stamp forward.
    let err = jwt
        .validate_password_reset_token(&token, stamp + 1)
        .unwrap_err();
    assert!(matches!(err, JwtError::Superseded));
}

#[test]
fn test_password_reset_token_without_stamp_rejected() {
    let jwt = service();
    let claims = Claims::new(
        Uuid::new_v4(),
        "ana@example.com",
        TokenKind::PasswordReset,
        Utc::now() + Duration::hours(1),
    );
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"test-secret-key-for-jwt"),
    )
    .unwrap();

    let err = jwt.validate_password_reset_token(&token, 0).unwrap_err();
    assert!(matches!(err, JwtError::Superseded));
}

#[test]
fn test_access_token_carries_no_stamp() {
    let jwt = service();
    let token = jwt
        .generate_access_token(Uuid::new_v4(), "ana@example.com")
        .unwrap();

    let claims = jwt.validate_token(&token, TokenKind::Access).unwrap();
    assert_eq!(claims.stamp, None);
}

#[test]
fn test_token_signed_with_other_secret_fails() {
    let token = service()
        .generate_access_token(Uuid::new_v4(), "ana@example.com")
        .unwrap();

    let mut other = config(900);
    other.secret = "another-secret".to_string();
    let err = JwtService::new(&other)
        .validate_token(&token, TokenKind::Access)
        .unwrap_err();

    assert!(matches!(err, JwtError::DecodingError(_)));
}

#[test]
fn test_garbage_token_fails() {
    let err = service()
        .validate_token("not.a.token", TokenKind::Access)
        .unwrap_err();
    assert!(matches!(err, JwtError::DecodingError(_)));
}

#[test]
fn test_expired_token() {
    let jwt = service();
    // Past the default 60s leeway.
    let claims = Claims::new(
        Uuid::new_v4(),
        "ana@example.com",
        TokenKind::Access,
        Utc::now() - Duration::minutes(5),
    );
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"test-secret-key-for-jwt"),
    )
    .unwrap();

    let err = jwt.validate_token(&token, TokenKind::Access).unwrap_err();
    assert!(matches!(err, JwtError::Expired));
}

#[test]
fn test_access_token_expires_in() {
    assert_eq!(service().access_token_expires_in(), 900);
    assert_eq!(JwtService::new(&config(60)).access_token_expires_in(), 60);
}

#[test]
fn test_debug_hides_keys() {
    let rendered = format!("{:?}", service());
    assert!(rendered.contains("[hidden]"));
    assert!(!rendered.contains("test-secret-key-for-jwt"));
}
