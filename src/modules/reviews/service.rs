use anyhow::anyhow;
use devcamper_core::{AppError, Pagination};
use devcamper_db::aggregates::refresh_average_rating;
use devcamper_db::{
    AdvancedQuery, Column, ColumnKind, Resource, is_unique_violation_on, map_db_error,
};
use devcamper_models::reviews::REVIEW_COLUMNS;
use devcamper_models::{
    BootcampId, CreateReviewDto, Review, ReviewId, ReviewWithBootcamp, UpdateReviewDto, User,
};
use sqlx::PgPool;
use tracing::instrument;

use crate::middleware::role::ensure_owner_or_admin;
use crate::modules::bootcamps::service::BootcampService;

pub static REVIEWS: Resource = Resource {
    table: "reviews",
    columns: &[
        Column::new("id", ColumnKind::Uuid),
        Column::new("bootcamp_id", ColumnKind::Uuid),
        Column::new("user_id", ColumnKind::Uuid),
        Column::new("title", ColumnKind::Text),
        Column::new("text", ColumnKind::Text),
        Column::new("rating", ColumnKind::Integer),
        Column::new("created_at", ColumnKind::Timestamp),
        Column::new("updated_at", ColumnKind::Timestamp),
    ],
};

const ONE_REVIEW_PER_USER: &str = "reviews_one_per_user";

fn review_not_found(id: ReviewId) -> AppError {
    AppError::not_found(anyhow!("Review not found with id of {}", id))
}

pub struct ReviewService;

impl ReviewService {
    #[instrument(skip(db, query))]
    pub async fn list_reviews(
        db: &PgPool,
        query: &AdvancedQuery,
    ) -> Result<(Vec<ReviewWithBootcamp>, Pagination), AppError> {
        let (reviews, pagination) = query.fetch::<Review>(db, REVIEW_COLUMNS).await?;

        let ids: Vec<BootcampId> = reviews.iter().map(|r| r.bootcamp_id).collect();
        let summaries = BootcampService::fetch_summaries(db, &ids).await?;

        let data = reviews
            .into_iter()
            .filter_map(|review| {
                summaries
                    .get(&review.bootcamp_id)
                    .cloned()
                    .map(|bootcamp| ReviewWithBootcamp { review, bootcamp })
            })
            .collect();

        Ok((data, pagination))
    }

    #[instrument(skip(db))]
    pub async fn reviews_for_bootcamp(
        db: &PgPool,
        bootcamp_id: BootcampId,
    ) -> Result<Vec<Review>, AppError> {
        BootcampService::bootcamp_owner(db, bootcamp_id).await?;

        sqlx::query_as::<_, Review>(&format!(
            "SELECT {} FROM reviews WHERE bootcamp_id = $1 ORDER BY created_at DESC, id ASC",
            REVIEW_COLUMNS
        ))
        .bind(bootcamp_id)
        .fetch_all(db)
        .await
        .map_err(map_db_error)
    }

    async fn find_review(db: &PgPool, id: ReviewId) -> Result<Review, AppError> {
        sqlx::query_as::<_, Review>(&format!(
            "SELECT {} FROM reviews WHERE id = $1",
            REVIEW_COLUMNS
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| review_not_found(id))
    }

    #[instrument(skip(db))]
    pub async fn get_review(db: &PgPool, id: ReviewId) -> Result<ReviewWithBootcamp, AppError> {
        let review = Self::find_review(db, id).await?;
        let summaries = BootcampService::fetch_summaries(db, &[review.bootcamp_id]).await?;

        let bootcamp = summaries
            .get(&review.bootcamp_id)
            .cloned()
            .ok_or_else(|| review_not_found(id))?;

        Ok(ReviewWithBootcamp { review, bootcamp })
    }

    /// One review per user and bootcamp, enforced by the unique constraint.
    #[instrument(skip(db, caller, dto), fields(user.id = %caller.id))]
    pub async fn create_review(
        db: &PgPool,
        caller: &User,
        bootcamp_id: BootcampId,
        dto: CreateReviewDto,
    ) -> Result<Review, AppError> {
        BootcampService::bootcamp_owner(db, bootcamp_id).await?;

        let mut tx = db.begin().await.map_err(map_db_error)?;

        let review = sqlx::query_as::<_, Review>(&format!(
            "INSERT INTO reviews (bootcamp_id, user_id, title, text, rating)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            REVIEW_COLUMNS
        ))
        .bind(bootcamp_id)
        .bind(caller.id)
        .bind(&dto.title)
        .bind(&dto.text)
        .bind(dto.rating)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation_on(&e, ONE_REVIEW_PER_USER) {
                AppError::bad_request(anyhow!("You have already reviewed this bootcamp"))
            } else {
                map_db_error(e)
            }
        })?;

        refresh_average_rating(&mut *tx, bootcamp_id.into_inner())
            .await
            .map_err(map_db_error)?;
        tx.commit().await.map_err(map_db_error)?;

        tracing::info!(review.id = %review.id, bootcamp.id = %bootcamp_id, "Review created");
        Ok(review)
    }

    #[instrument(skip(db, caller, dto), fields(user.id = %caller.id))]
    pub async fn update_review(
        db: &PgPool,
        caller: &User,
        id: ReviewId,
        dto: UpdateReviewDto,
    ) -> Result<Review, AppError> {
        let existing = Self::find_review(db, id).await?;
        ensure_owner_or_admin(caller, existing.user_id, "update", "review")?;

        let mut tx = db.begin().await.map_err(map_db_error)?;

        let review = sqlx::query_as::<_, Review>(&format!(
            "UPDATE reviews
             SET title = COALESCE($2, title),
                 text = COALESCE($3, text),
                 rating = COALESCE($4, rating),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            REVIEW_COLUMNS
        ))
        .bind(id)
        .bind(dto.title)
        .bind(dto.text)
        .bind(dto.rating)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| review_not_found(id))?;

        refresh_average_rating(&mut *tx, review.bootcamp_id.into_inner())
            .await
            .map_err(map_db_error)?;
        tx.commit().await.map_err(map_db_error)?;

        tracing::info!(review.id = %id, "Review updated");
        Ok(review)
    }

    /// Deleting the last review resets the bootcamp's average rating to null.
    #[instrument(skip(db, caller), fields(user.id = %caller.id))]
    pub async fn delete_review(db: &PgPool, caller: &User, id: ReviewId) -> Result<(), AppError> {
        let review = Self::find_review(db, id).await?;
        ensure_owner_or_admin(caller, review.user_id, "delete", "review")?;

        let mut tx = db.begin().await.map_err(map_db_error)?;

        sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        refresh_average_rating(&mut *tx, review.bootcamp_id.into_inner())
            .await
            .map_err(map_db_error)?;
        tx.commit().await.map_err(map_db_error)?;

        tracing::info!(review.id = %id, bootcamp.id = %review.bootcamp_id, "Review deleted");
        Ok(())
    }
}
