//! Derived bootcamp columns. Callers run these on the same transaction as the
//! child write so the stored value matches what was committed.

use sqlx::PgExecutor;
use uuid::Uuid;

/// Recomputes `average_rating` from the bootcamp's reviews. NULL when none remain.
pub async fn refresh_average_rating<'e, E>(
    executor: E,
    bootcamp_id: Uuid,
) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        "UPDATE bootcamps
         SET average_rating = (SELECT AVG(rating)::float8 FROM reviews WHERE bootcamp_id = $1)
         WHERE id = $1",
    )
    .bind(bootcamp_id)
    .execute(executor)
    .await?;

    tracing::debug!(bootcamp.id = %bootcamp_id, "Average rating refreshed");
    Ok(())
}

/// Recomputes `average_cost` as the mean tuition rounded up to the next multiple of ten.
pub async fn refresh_average_cost<'e, E>(
    executor: E,
    bootcamp_id: Uuid,
) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        "UPDATE bootcamps
         SET average_cost = (
             SELECT CEIL(AVG(tuition) / 10) * 10 FROM courses WHERE bootcamp_id = $1
         )
         WHERE id = $1",
    )
    .bind(bootcamp_id)
    .execute(executor)
    .await?;

    tracing::debug!(bootcamp.id = %bootcamp_id, "Average cost refreshed");
    Ok(())
}

/// Recomputes both averages for every bootcamp. Used after bulk seeding.
pub async fn refresh_all<'e, E>(executor: E) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE bootcamps b
         SET average_rating = (
                 SELECT AVG(r.rating)::float8 FROM reviews r WHERE r.bootcamp_id = b.id
             ),
             average_cost = (
                 SELECT CEIL(AVG(c.tuition) / 10) * 10 FROM courses c WHERE c.bootcamp_id = b.id
             )",
    )
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}
