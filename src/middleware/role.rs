//! Role-based authorization.
//!
//! Two ways to restrict a route:
//! 1. Extractors generated by `require_role!` (`RequirePublisher`, `RequireReviewer`)
//!    for per-handler checks
//! 2. `require_admin` as router middleware for whole route groups
//!
//! Ownership is checked separately in the services through [`ensure_owner_or_admin`].

use anyhow::anyhow;
use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use devcamper_core::AppError;
use devcamper_models::{User, UserId, UserRole};

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Fails with 403 unless the caller's role is in `allowed`.
pub fn authorize_roles(user: &User, allowed: &[UserRole]) -> Result<(), AppError> {
    if allowed.contains(&user.role) {
        return Ok(());
    }

    tracing::warn!(user.id = %user.id, role = %user.role, "Role not allowed on route");
    Err(AppError::forbidden(anyhow!(
        "User role '{}' is not authorized to access this route",
        user.role
    )))
}

/// Fails with 401 unless `user` owns the resource or is an admin.
///
/// `action` and `resource` only shape the message, e.g. `"update"` and `"bootcamp"`.
pub fn ensure_owner_or_admin(
    user: &User,
    owner_id: UserId,
    action: &str,
    resource: &str,
) -> Result<(), AppError> {
    if user.id == owner_id || user.role.is_admin() {
        return Ok(());
    }

    Err(AppError::unauthorized(anyhow!(
        "User {} is not authorized to {} this {}",
        user.id,
        action,
        resource
    )))
}

/// Defines an extractor that authenticates the caller and checks their role.
macro_rules! require_role {
    ($(#[$meta:meta])* $name:ident, [$($role:expr),+ $(,)?]) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name(pub AuthUser);

        impl FromRequestParts<AppState> for $name {
            type Rejection = AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                let auth_user = AuthUser::from_request_parts(parts, state).await?;
                authorize_roles(&auth_user.0, &[$($role),+])?;
                Ok($name(auth_user))
            }
        }
    };
}

require_role!(
    /// Publishers and admins: bootcamp and course management.
    RequirePublisher,
    [UserRole::Publisher, UserRole::Admin]
);

require_role!(
    /// Regular users and admins: writing reviews.
    RequireReviewer,
    [UserRole::User, UserRole::Admin]
);

/// Authenticates the request and checks the caller's role before running `next`.
///
/// The resolved [`AuthUser`] stays in the request extensions for the handler.
pub async fn require_roles(
    state: &AppState,
    req: Request,
    next: Next,
    allowed: &[UserRole],
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, state).await?;
    authorize_roles(&auth_user.0, allowed)?;

    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// Router middleware for admin-only route groups.
///
/// ```rust,ignore
/// Router::new()
///     .nest("/users", init_users_router())
///     .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));
/// ```
pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(&state, req, next, &[UserRole::Admin]).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}
