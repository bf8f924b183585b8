use axum::{Router, routing::get};

use super::controller::{
    create_review, delete_review, get_bootcamp_reviews, get_review, get_reviews, update_review,
};
use crate::state::AppState;

pub fn init_reviews_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_reviews))
        .route("/{id}", get(get_review).put(update_review).delete(delete_review))
}

/// Mounted under `/bootcamps/{id}/reviews`.
pub fn init_bootcamp_reviews_router() -> Router<AppState> {
    Router::new().route("/", get(get_bootcamp_reviews).post(create_review))
}
