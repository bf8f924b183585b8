use axum::{
    Json,
    extract::{Path, State},
};
use axum_extra::extract::CookieJar;
use devcamper_auth::create_token;
use devcamper_core::{AppError, ApiResponse, TokenResponse};
use devcamper_models::{
    ForgotPasswordDto, LoginDto, RegisterDto, ResetPasswordDto, UpdateDetailsDto,
    UpdatePasswordDto, User,
};
use serde_json::{Value, json};
use tracing::instrument;

use super::service::AuthService;
use crate::docs::ErrorResponse;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::utils::cookies::{logout_cookie, token_cookie};
use crate::validator::ValidatedJson;

/// Signs a token for `user` and sets it as the `token` cookie.
fn issue_token(
    state: &AppState,
    jar: CookieJar,
    user: &User,
) -> Result<(CookieJar, Json<TokenResponse>), AppError> {
    let config = &state.config;
    let token = create_token(user.id.into_inner(), &config.jwt)?;
    let cookie = token_cookie(
        token.clone(),
        config.jwt.cookie_expire_days,
        config.server.environment.is_production(),
    );

    Ok((jar.add(cookie), Json(TokenResponse::new(token))))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterDto,
    responses(
        (status = 200, description = "User registered, token issued", body = TokenResponse),
        (status = 400, description = "Validation error or email already exists", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, jar, dto))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(dto): ValidatedJson<RegisterDto>,
) -> Result<(CookieJar, Json<TokenResponse>), AppError> {
    let user = AuthService::register(&state.db, dto).await?;
    issue_token(&state, jar, &user)
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginDto,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Email or password missing", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, jar, dto))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(dto): ValidatedJson<LoginDto>,
) -> Result<(CookieJar, Json<TokenResponse>), AppError> {
    let user = AuthService::login(&state.db, dto).await?;
    issue_token(&state, jar, &user)
}

/// Log out by expiring the token cookie
#[utoipa::path(
    get,
    path = "/api/v1/auth/logout",
    responses((status = 200, description = "Cookie cleared")),
    tag = "Authentication"
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<ApiResponse<Value>>) {
    (jar.add(logout_cookie()), Json(ApiResponse::ok(json!({}))))
}

/// Get the current user
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip(auth_user), fields(user.id = %auth_user.id()))]
pub async fn get_me(auth_user: AuthUser) -> Json<ApiResponse<User>> {
    Json(ApiResponse::ok(auth_user.0))
}

/// Update the current user's name or email
#[utoipa::path(
    put,
    path = "/api/v1/auth/updatedetails",
    request_body = UpdateDetailsDto,
    responses(
        (status = 200, description = "Details updated", body = User),
        (status = 400, description = "Validation error or email already exists", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip(state, auth_user, dto), fields(user.id = %auth_user.id()))]
pub async fn update_details(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<UpdateDetailsDto>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let user = AuthService::update_details(&state.db, auth_user.id(), dto).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// Change the current user's password
#[utoipa::path(
    put,
    path = "/api/v1/auth/updatepassword",
    request_body = UpdatePasswordDto,
    responses(
        (status = 200, description = "Password changed, new token issued", body = TokenResponse),
        (status = 401, description = "Current password is incorrect", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip(state, jar, auth_user, dto), fields(user.id = %auth_user.id()))]
pub async fn update_password(
    State(state): State<AppState>,
    jar: CookieJar,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<UpdatePasswordDto>,
) -> Result<(CookieJar, Json<TokenResponse>), AppError> {
    let user = AuthService::update_password(&state.db, auth_user.id(), dto).await?;
    issue_token(&state, jar, &user)
}

/// Email a password reset link
#[utoipa::path(
    post,
    path = "/api/v1/auth/forgotpassword",
    request_body = ForgotPasswordDto,
    responses(
        (status = 200, description = "Email sent"),
        (status = 404, description = "No user with that email", body = ErrorResponse),
        (status = 500, description = "Email could not be sent", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<ForgotPasswordDto>,
) -> Result<Json<ApiResponse<&'static str>>, AppError> {
    AuthService::forgot_password(
        &state.db,
        state.mailer.as_ref(),
        &state.config.server.base_url,
        dto,
    )
    .await?;

    Ok(Json(ApiResponse::ok("Email sent")))
}

/// Set a new password using a reset token
#[utoipa::path(
    put,
    path = "/api/v1/auth/resetpassword/{resettoken}",
    params(("resettoken" = String, Path, description = "Raw token from the reset email")),
    request_body = ResetPasswordDto,
    responses(
        (status = 200, description = "Password reset, token issued", body = TokenResponse),
        (status = 400, description = "Invalid or expired token", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn reset_password(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(reset_token): Path<String>,
    ValidatedJson(dto): ValidatedJson<ResetPasswordDto>,
) -> Result<(CookieJar, Json<TokenResponse>), AppError> {
    let user = AuthService::reset_password(&state.db, &reset_token, dto).await?;
    issue_token(&state, jar, &user)
}
