use devcamper_auth::{
    NOT_AUTHORIZED, RESET_TOKEN_TTL_MINUTES, ResetToken, create_token, hash_reset_token,
    verify_token,
};
use devcamper_config::JwtConfig;
use uuid::Uuid;

fn get_test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test_secret_key_for_testing_purposes".to_string(),
        expiry: 3600,
        cookie_expire_days: 30,
    }
}

#[test]
fn test_create_token_success() {
    let token = create_token(Uuid::new_v4(), &get_test_jwt_config()).unwrap();

    assert!(!token.is_empty());
    assert_eq!(token.split('.').count(), 3);
}

#[test]
fn test_verify_token_returns_subject() {
    let jwt_config = get_test_jwt_config();
    let user_id = Uuid::new_v4();

    let token = create_token(user_id, &jwt_config).unwrap();
    let claims = verify_token(&token, &jwt_config).unwrap();

    assert_eq!(claims.sub, user_id.to_string());
    assert_eq!(claims.user_id(), Some(user_id));
    assert_eq!(claims.exp - claims.iat, 3600);
}

#[test]
fn test_verify_token_wrong_secret() {
    let token = create_token(Uuid::new_v4(), &get_test_jwt_config()).unwrap();
    let other = JwtConfig {
        secret: "a_different_secret".to_string(),
        ..get_test_jwt_config()
    };

    let err = verify_token(&token, &other).unwrap_err();
    assert_eq!(err.status.as_u16(), 401);
    assert_eq!(err.message(), NOT_AUTHORIZED);
}

#[test]
fn test_verify_token_expired() {
    let expired = JwtConfig {
        expiry: -120,
        ..get_test_jwt_config()
    };
    let token = create_token(Uuid::new_v4(), &expired).unwrap();

    let err = verify_token(&token, &get_test_jwt_config()).unwrap_err();
    assert_eq!(err.status.as_u16(), 401);
}

#[test]
fn test_verify_token_tampered() {
    let jwt_config = get_test_jwt_config();
    let token = create_token(Uuid::new_v4(), &jwt_config).unwrap();
    let other = create_token(Uuid::new_v4(), &jwt_config).unwrap();

    // Another user's payload under the original signature.
    let mut parts: Vec<&str> = token.split('.').collect();
    parts[1] = other.split('.').nth(1).unwrap();
    let tampered = parts.join(".");

    assert!(verify_token(&tampered, &jwt_config).is_err());
}

#[test]
fn test_verify_token_garbage() {
    let jwt_config = get_test_jwt_config();

    assert!(verify_token("", &jwt_config).is_err());
    assert!(verify_token("invalid.token.here", &jwt_config).is_err());
}

#[test]
fn test_reset_token_expires_after_ttl() {
    let before = chrono::Utc::now();
    let token = ResetToken::generate();
    let ttl = token.expires_at - before;

    assert!(ttl <= chrono::Duration::minutes(RESET_TOKEN_TTL_MINUTES));
    assert!(ttl > chrono::Duration::minutes(RESET_TOKEN_TTL_MINUTES - 1));
    assert_eq!(hash_reset_token(&token.raw), token.hashed);
}
