//! # DevCamper DB
//!
//! Connection pool, embedded migrations, database error mapping and the
//! filter/sort/paginate query layer shared by the listing endpoints.
//!
//! ```ignore
//! use devcamper_db::{init_db_pool, run_migrations};
//!
//! let pool = init_db_pool(&config.database).await?;
//! run_migrations(&pool).await?;
//! ```

pub mod aggregates;
pub mod query;

use anyhow::anyhow;
use devcamper_config::DatabaseConfig;
use devcamper_core::AppError;
use sqlx::postgres::PgPoolOptions;

pub use query::{AdvancedQuery, Column, ColumnKind, Resource};
pub use sqlx::PgPool;

pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
}

pub async fn run_migrations(db: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(db).await
}

/// Maps a driver error onto the API error envelope.
///
/// Constraint violations are the caller's fault and become 400s; anything else
/// is logged and reported as a generic 500.
pub fn map_db_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::bad_request(anyhow!("Duplicate field value entered"));
        }
        if db_err.is_foreign_key_violation() {
            return AppError::bad_request(anyhow!(
                "Operation violates a reference between resources"
            ));
        }
        if db_err.is_check_violation() {
            return AppError::bad_request(anyhow!("Invalid field value"));
        }
    }

    if matches!(e, sqlx::Error::RowNotFound) {
        return AppError::not_found(anyhow!("Resource not found"));
    }

    tracing::error!(error = %e, "Database error");
    AppError::internal(anyhow!("Server Error"))
}

/// True when `e` is a unique violation on the named constraint.
pub fn is_unique_violation_on(e: &sqlx::Error, constraint: &str) -> bool {
    match e {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation() && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_404() {
        let err = map_db_error(sqlx::Error::RowNotFound);
        assert_eq!(err.status.as_u16(), 404);
    }

    #[test]
    fn test_other_errors_map_to_generic_500() {
        let err = map_db_error(sqlx::Error::PoolTimedOut);
        assert_eq!(err.status.as_u16(), 500);
        assert_eq!(err.message(), "Server Error");
    }

    #[test]
    fn test_unique_violation_on_ignores_non_database_errors() {
        assert!(!is_unique_violation_on(
            &sqlx::Error::RowNotFound,
            "reviews_one_per_user"
        ));
    }
}
