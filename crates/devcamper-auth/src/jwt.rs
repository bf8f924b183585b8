//! Identity tokens.
//!
//! Tokens are HS256 JWTs carrying the user id. The lifetime comes from
//! [`JwtConfig::expiry`].
//!
//! ```ignore
//! let token = create_token(user.id.into_inner(), &config.jwt)?;
//! let claims = verify_token(&token, &config.jwt)?;
//! ```

use anyhow::anyhow;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use devcamper_config::JwtConfig;
use devcamper_core::AppError;

use crate::claims::Claims;

pub const NOT_AUTHORIZED: &str = "Not authorized to access this route";

pub fn create_token(user_id: Uuid, jwt_config: &JwtConfig) -> Result<String, AppError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now as usize,
        exp: now.saturating_add(jwt_config.expiry) as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create token: {}", e)))
}

pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!(error = %e, "Token rejected");
        AppError::unauthorized(anyhow!(NOT_AUTHORIZED))
    })
}
