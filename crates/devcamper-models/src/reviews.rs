//! Bootcamp reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::bootcamps::BootcampSummary;
use crate::ids::{BootcampId, ReviewId, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
pub struct Review {
    pub id: ReviewId,
    pub bootcamp_id: BootcampId,
    pub user_id: UserId,
    pub title: String,
    pub text: String,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column list matching [`Review`].
pub const REVIEW_COLUMNS: &str =
    "id, bootcamp_id, user_id, title, text, rating, created_at, updated_at";

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReviewWithBootcamp {
    #[serde(flatten)]
    pub review: Review,
    pub bootcamp: BootcampSummary,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateReviewDto {
    #[validate(length(min = 1, max = 100, message = "Please add a title for the review"))]
    pub title: String,
    #[validate(length(min = 1, message = "Please add some text"))]
    pub text: String,
    #[validate(range(min = 1, max = 10, message = "Please add a rating between 1 and 10"))]
    pub rating: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateReviewDto {
    #[validate(length(min = 1, max = 100, message = "Please add a title for the review"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Please add some text"))]
    pub text: Option<String>,
    #[validate(range(min = 1, max = 10, message = "Please add a rating between 1 and 10"))]
    pub rating: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(rating: i32) -> CreateReviewDto {
        CreateReviewDto {
            title: "Learned a ton!".into(),
            text: "Great instructors".into(),
            rating,
        }
    }

    #[test]
    fn test_rating_bounds() {
        assert!(dto(1).validate().is_ok());
        assert!(dto(10).validate().is_ok());
        assert!(dto(0).validate().is_err());
        assert!(dto(11).validate().is_err());
    }

    #[test]
    fn test_title_longer_than_100_fails() {
        let dto = CreateReviewDto {
            title: "t".repeat(101),
            ..dto(5)
        };
        assert!(dto.validate().unwrap_err().field_errors().contains_key("title"));
    }

    #[test]
    fn test_update_rating_bounds() {
        let dto = UpdateReviewDto {
            rating: Some(12),
            ..Default::default()
        };
        assert!(dto.validate().is_err());
    }
}
