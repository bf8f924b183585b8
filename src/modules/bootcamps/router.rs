use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, put},
};

use super::controller::{
    create_bootcamp, delete_bootcamp, get_bootcamp, get_bootcamps, get_bootcamps_in_radius,
    update_bootcamp, upload_photo,
};
use crate::modules::courses::router::init_bootcamp_courses_router;
use crate::modules::reviews::router::init_bootcamp_reviews_router;
use crate::state::AppState;

pub fn init_bootcamps_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_bootcamps).post(create_bootcamp))
        .route(
            "/{id}",
            get(get_bootcamp).put(update_bootcamp).delete(delete_bootcamp),
        )
        .route("/radius/{zipcode}/{distance}", get(get_bootcamps_in_radius))
        // The upload size is enforced while streaming the `file` part.
        .route(
            "/{id}/photo",
            put(upload_photo).layer(DefaultBodyLimit::disable()),
        )
        .nest("/{id}/courses", init_bootcamp_courses_router())
        .nest("/{id}/reviews", init_bootcamp_reviews_router())
}
