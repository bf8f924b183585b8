use axum::{Router, routing::get};

use super::controller::{
    create_course, delete_course, get_bootcamp_courses, get_course, get_courses, update_course,
};
use crate::state::AppState;

pub fn init_courses_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_courses))
        .route("/{id}", get(get_course).put(update_course).delete(delete_course))
}

/// Mounted under `/bootcamps/{id}/courses`.
pub fn init_bootcamp_courses_router() -> Router<AppState> {
    Router::new().route("/", get(get_bootcamp_courses).post(create_course))
}
