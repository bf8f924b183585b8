//! Admin account creation.

use anyhow::{Context, anyhow};
use devcamper_core::hash_password;
use devcamper_models::{UserId, UserRole};
use sqlx::PgPool;

/// Inserts a user with the `admin` role. Fails if the email is taken.
pub async fn create_admin(
    db: &PgPool,
    name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<UserId> {
    if password.len() < 6 {
        return Err(anyhow!("Password must be at least 6 characters"));
    }

    let hashed = hash_password(password).map_err(|e| e.error)?;

    let id = sqlx::query_scalar::<_, UserId>(
        "INSERT INTO users (name, email, role, password)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (email) DO NOTHING
         RETURNING id",
    )
    .bind(name)
    .bind(email.to_lowercase())
    .bind(UserRole::Admin)
    .bind(&hashed)
    .fetch_optional(db)
    .await
    .context("Failed to insert admin")?;

    id.ok_or_else(|| anyhow!("A user with email {} already exists", email))
}
