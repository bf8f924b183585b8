use anyhow::anyhow;
use devcamper_auth::{ResetToken, hash_reset_token};
use devcamper_core::{AppError, hash_password, verify_password};
use devcamper_db::map_db_error;
use devcamper_models::users::USER_COLUMNS;
use devcamper_models::{
    ForgotPasswordDto, LoginDto, RegisterDto, ResetPasswordDto, UpdateDetailsDto,
    UpdatePasswordDto, User, UserId,
};
use sqlx::PgPool;
use tracing::instrument;

use crate::modules::users::service::UserService;
use crate::utils::email::Mailer;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(sqlx::FromRow)]
struct UserWithPassword {
    #[sqlx(flatten)]
    user: User,
    password: String,
}

pub struct AuthService;

impl AuthService {
    #[instrument(skip(db, dto))]
    pub async fn register(db: &PgPool, dto: RegisterDto) -> Result<User, AppError> {
        UserService::insert_user(db, &dto.name, &dto.email, dto.role, &dto.password).await
    }

    /// Unknown email and wrong password fail identically.
    #[instrument(skip(db, dto))]
    pub async fn login(db: &PgPool, dto: LoginDto) -> Result<User, AppError> {
        let (email, password) = dto.credentials().ok_or_else(|| {
            AppError::bad_request(anyhow!("Please provide an email and password"))
        })?;

        let found = sqlx::query_as::<_, UserWithPassword>(&format!(
            "SELECT {}, password FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(db)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| AppError::unauthorized(anyhow!(INVALID_CREDENTIALS)))?;

        if !verify_password(password, &found.password)? {
            tracing::warn!(user.id = %found.user.id, "Login with wrong password");
            return Err(AppError::unauthorized(anyhow!(INVALID_CREDENTIALS)));
        }

        Ok(found.user)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_details(
        db: &PgPool,
        user_id: UserId,
        dto: UpdateDetailsDto,
    ) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET name = COALESCE($2, name),
                 email = COALESCE($3, email),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user_id)
        .bind(dto.name)
        .bind(dto.email)
        .fetch_one(db)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_password(
        db: &PgPool,
        user_id: UserId,
        dto: UpdatePasswordDto,
    ) -> Result<User, AppError> {
        let current: String = sqlx::query_scalar("SELECT password FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_one(db)
            .await
            .map_err(map_db_error)?;

        if !verify_password(&dto.current_password, &current)? {
            return Err(AppError::unauthorized(anyhow!(
                "Current password is incorrect"
            )));
        }

        let hashed_password = hash_password(&dto.new_password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET password = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user_id)
        .bind(&hashed_password)
        .fetch_one(db)
        .await
        .map_err(map_db_error)?;

        tracing::info!(user.id = %user.id, "Password changed");
        Ok(user)
    }

    /// Stores a hashed reset token and mails the raw one. If the mail cannot be
    /// sent the stored token is cleared again.
    #[instrument(skip(db, mailer, dto))]
    pub async fn forgot_password(
        db: &PgPool,
        mailer: &dyn Mailer,
        base_url: &str,
        dto: ForgotPasswordDto,
    ) -> Result<(), AppError> {
        let reset = ResetToken::generate();

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET reset_password_token = $2, reset_password_expire = $3
             WHERE email = $1
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&dto.email)
        .bind(&reset.hashed)
        .bind(reset.expires_at)
        .fetch_optional(db)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| AppError::not_found(anyhow!("No user found with that email")))?;

        let reset_url = format!("{}/api/v1/auth/resetpassword/{}", base_url, reset.raw);

        if let Err(e) = mailer
            .send_password_reset(&user.email, &user.name, &reset_url)
            .await
        {
            tracing::error!(user.id = %user.id, error = %e, "Password reset email failed");

            sqlx::query(
                "UPDATE users
                 SET reset_password_token = NULL, reset_password_expire = NULL
                 WHERE id = $1",
            )
            .bind(user.id)
            .execute(db)
            .await
            .map_err(map_db_error)?;

            return Err(AppError::internal_error("Email could not be sent"));
        }

        tracing::info!(user.id = %user.id, "Password reset email sent");
        Ok(())
    }

    /// Consumes a reset token. Matching, expiry check and clearing happen in a
    /// single statement, so a token works at most once.
    #[instrument(skip(db, raw_token, dto))]
    pub async fn reset_password(
        db: &PgPool,
        raw_token: &str,
        dto: ResetPasswordDto,
    ) -> Result<User, AppError> {
        let hashed_token = hash_reset_token(raw_token);
        let hashed_password = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET password = $2,
                 reset_password_token = NULL,
                 reset_password_expire = NULL,
                 updated_at = NOW()
             WHERE reset_password_token = $1 AND reset_password_expire > NOW()
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&hashed_token)
        .bind(&hashed_password)
        .fetch_optional(db)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| AppError::bad_request(anyhow!("Invalid token")))?;

        tracing::info!(user.id = %user.id, "Password reset");
        Ok(user)
    }
}
