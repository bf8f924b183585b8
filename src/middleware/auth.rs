use anyhow::anyhow;
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use devcamper_auth::{NOT_AUTHORIZED, verify_token};
use devcamper_core::AppError;
use devcamper_models::{User, UserId, UserRole};

use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::utils::cookies::{LOGGED_OUT, TOKEN_COOKIE};

/// The caller, loaded from the database on every request.
///
/// A token whose user has since been deleted is rejected.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl AuthUser {
    pub fn id(&self) -> UserId {
        self.0.id
    }

    pub fn role(&self) -> UserRole {
        self.0.role
    }
}

/// Bearer header first, then the `token` cookie.
fn extract_token(parts: &Parts) -> Option<String> {
    if let Some(Authorization(bearer)) = parts.headers.typed_get::<Authorization<Bearer>>() {
        return Some(bearer.token().to_string());
    }

    CookieJar::from_headers(&parts.headers)
        .get(TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty() && value != LOGGED_OUT)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Set by `require_admin` or an earlier extractor.
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let not_authorized = || AppError::unauthorized(anyhow!(NOT_AUTHORIZED));

        let token = extract_token(parts).ok_or_else(not_authorized)?;
        let claims = verify_token(&token, &state.config.jwt)?;
        let user_id = claims.user_id().ok_or_else(not_authorized)?;

        let user = UserService::find_user(&state.db, UserId::from(user_id))
            .await?
            .ok_or_else(|| {
                tracing::warn!(user.id = %user_id, "Token references a missing user");
                not_authorized()
            })?;

        let auth_user = AuthUser(user);
        parts.extensions.insert(auth_user.clone());
        Ok(auth_user)
    }
}
