use std::collections::HashMap;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use devcamper_core::{AppError, ApiResponse};
use devcamper_db::AdvancedQuery;
use devcamper_models::{
    BootcampId, CreateReviewDto, Review, ReviewId, ReviewWithBootcamp, UpdateReviewDto,
};
use serde_json::{Value, json};
use tracing::instrument;

use super::service::{REVIEWS, ReviewService};
use crate::docs::ErrorResponse;
use crate::middleware::role::RequireReviewer;
use crate::state::AppState;
use crate::validator::{IdPath, ValidatedJson};

/// List reviews with their bootcamp
#[utoipa::path(
    get,
    path = "/api/v1/reviews",
    params(
        ("select" = Option<String>, Query, description = "Comma separated fields to return"),
        ("sort" = Option<String>, Query, description = "Sort fields, `-` prefix for descending"),
        ("page" = Option<i64>, Query, description = "Page number, from 1"),
        ("limit" = Option<i64>, Query, description = "Page size, 1 to 100"),
    ),
    responses(
        (status = 200, description = "Paginated reviews", body = [ReviewWithBootcamp]),
        (status = 400, description = "Unknown filter, sort or select field", body = ErrorResponse)
    ),
    tag = "Reviews"
)]
#[instrument(skip(state))]
pub async fn get_reviews(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<Vec<Value>>>, AppError> {
    let query = AdvancedQuery::parse(&params, &REVIEWS)?;
    let (reviews, pagination) = ReviewService::list_reviews(&state.db, &query).await?;

    let data = reviews
        .into_iter()
        .map(|r| serde_json::to_value(r).map(|v| query.project(v, &["bootcamp"])))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(ApiResponse::paginated(data, pagination)))
}

/// List the reviews of one bootcamp
#[utoipa::path(
    get,
    path = "/api/v1/bootcamps/{id}/reviews",
    params(("id" = String, Path, description = "Bootcamp id")),
    responses(
        (status = 200, description = "Reviews of the bootcamp", body = [Review]),
        (status = 404, description = "Bootcamp not found", body = ErrorResponse)
    ),
    tag = "Reviews"
)]
#[instrument(skip(state))]
pub async fn get_bootcamp_reviews(
    State(state): State<AppState>,
    IdPath(bootcamp_id): IdPath<BootcampId>,
) -> Result<Json<ApiResponse<Vec<Review>>>, AppError> {
    let reviews = ReviewService::reviews_for_bootcamp(&state.db, bootcamp_id).await?;
    Ok(Json(ApiResponse::collection(reviews)))
}

/// Get a review
#[utoipa::path(
    get,
    path = "/api/v1/reviews/{id}",
    params(("id" = String, Path, description = "Review id")),
    responses(
        (status = 200, description = "Review with its bootcamp", body = ReviewWithBootcamp),
        (status = 404, description = "Review not found", body = ErrorResponse)
    ),
    tag = "Reviews"
)]
#[instrument(skip(state))]
pub async fn get_review(
    State(state): State<AppState>,
    IdPath(id): IdPath<ReviewId>,
) -> Result<Json<ApiResponse<ReviewWithBootcamp>>, AppError> {
    let review = ReviewService::get_review(&state.db, id).await?;
    Ok(Json(ApiResponse::ok(review)))
}

/// Review a bootcamp
#[utoipa::path(
    post,
    path = "/api/v1/bootcamps/{id}/reviews",
    params(("id" = String, Path, description = "Bootcamp id")),
    request_body = CreateReviewDto,
    responses(
        (status = 201, description = "Review created", body = Review),
        (status = 400, description = "Validation error or bootcamp already reviewed", body = ErrorResponse),
        (status = 403, description = "Publishers may not write reviews", body = ErrorResponse),
        (status = 404, description = "Bootcamp not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
#[instrument(skip(state, auth_user, dto), fields(user.id = %auth_user.id()))]
pub async fn create_review(
    State(state): State<AppState>,
    RequireReviewer(auth_user): RequireReviewer,
    IdPath(bootcamp_id): IdPath<BootcampId>,
    ValidatedJson(dto): ValidatedJson<CreateReviewDto>,
) -> Result<(StatusCode, Json<ApiResponse<Review>>), AppError> {
    let review = ReviewService::create_review(&state.db, &auth_user.0, bootcamp_id, dto).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(review))))
}

/// Update a review
#[utoipa::path(
    put,
    path = "/api/v1/reviews/{id}",
    params(("id" = String, Path, description = "Review id")),
    request_body = UpdateReviewDto,
    responses(
        (status = 200, description = "Review updated", body = Review),
        (status = 401, description = "Caller did not write the review", body = ErrorResponse),
        (status = 404, description = "Review not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
#[instrument(skip(state, auth_user, dto), fields(user.id = %auth_user.id()))]
pub async fn update_review(
    State(state): State<AppState>,
    RequireReviewer(auth_user): RequireReviewer,
    IdPath(id): IdPath<ReviewId>,
    ValidatedJson(dto): ValidatedJson<UpdateReviewDto>,
) -> Result<Json<ApiResponse<Review>>, AppError> {
    let review = ReviewService::update_review(&state.db, &auth_user.0, id, dto).await?;
    Ok(Json(ApiResponse::ok(review)))
}

/// Delete a review
#[utoipa::path(
    delete,
    path = "/api/v1/reviews/{id}",
    params(("id" = String, Path, description = "Review id")),
    responses(
        (status = 200, description = "Review deleted"),
        (status = 401, description = "Caller did not write the review", body = ErrorResponse),
        (status = 404, description = "Review not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
#[instrument(skip(state, auth_user), fields(user.id = %auth_user.id()))]
pub async fn delete_review(
    State(state): State<AppState>,
    RequireReviewer(auth_user): RequireReviewer,
    IdPath(id): IdPath<ReviewId>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    ReviewService::delete_review(&state.db, &auth_user.0, id).await?;
    Ok(Json(ApiResponse::ok(json!({}))))
}
