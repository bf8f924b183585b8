use anyhow::anyhow;
use devcamper_core::{AppError, Pagination, hash_password};
use devcamper_db::{AdvancedQuery, Column, ColumnKind, Resource, map_db_error};
use devcamper_models::users::USER_COLUMNS;
use devcamper_models::{CreateUserDto, UpdateUserDto, User, UserId, UserRole};
use sqlx::PgPool;
use tracing::instrument;

/// Filterable and sortable user columns. The password and reset fields are not listed.
pub static USERS: Resource = Resource {
    table: "users",
    columns: &[
        Column::new("id", ColumnKind::Uuid),
        Column::new("name", ColumnKind::Text),
        Column::new("email", ColumnKind::Text),
        Column::new("role", ColumnKind::Enum),
        Column::new("created_at", ColumnKind::Timestamp),
        Column::new("updated_at", ColumnKind::Timestamp),
    ],
};

fn user_not_found(id: UserId) -> AppError {
    AppError::not_found(anyhow!("User not found with id of {}", id))
}

pub struct UserService;

impl UserService {
    /// Hashes `password` and inserts the user. A taken email is a 400.
    #[instrument(skip(db, password))]
    pub async fn insert_user(
        db: &PgPool,
        name: &str,
        email: &str,
        role: UserRole,
        password: &str,
    ) -> Result<User, AppError> {
        let hashed_password = hash_password(password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, role, password)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(name)
        .bind(email)
        .bind(role)
        .bind(&hashed_password)
        .fetch_one(db)
        .await
        .map_err(map_db_error)?;

        tracing::info!(user.id = %user.id, role = %user.role, "User created");
        Ok(user)
    }

    #[instrument(skip(db))]
    pub async fn find_user(db: &PgPool, id: UserId) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(db)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(db))]
    pub async fn get_user(db: &PgPool, id: UserId) -> Result<User, AppError> {
        Self::find_user(db, id)
            .await?
            .ok_or_else(|| user_not_found(id))
    }

    #[instrument(skip(db, query))]
    pub async fn list_users(
        db: &PgPool,
        query: &AdvancedQuery,
    ) -> Result<(Vec<User>, Pagination), AppError> {
        query.fetch::<User>(db, USER_COLUMNS).await
    }

    #[instrument(skip(db, dto))]
    pub async fn create_user(db: &PgPool, dto: CreateUserDto) -> Result<User, AppError> {
        Self::insert_user(db, &dto.name, &dto.email, dto.role, &dto.password).await
    }

    #[instrument(skip(db, dto))]
    pub async fn update_user(
        db: &PgPool,
        id: UserId,
        dto: UpdateUserDto,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET name = COALESCE($2, name),
                 email = COALESCE($3, email),
                 role = COALESCE($4, role),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(dto.name)
        .bind(dto.email)
        .bind(dto.role)
        .fetch_optional(db)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| user_not_found(id))?;

        tracing::info!(user.id = %user.id, "User updated");
        Ok(user)
    }

    /// Fails with 400 while the user still owns bootcamps, courses or reviews.
    #[instrument(skip(db))]
    pub async fn delete_user(db: &PgPool, id: UserId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(id));
        }

        tracing::info!(user.id = %id, "User deleted");
        Ok(())
    }
}
