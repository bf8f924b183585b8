use axum::{Router, routing::get};

use super::controller::{create_user, delete_user, get_user, get_users, update_user};
use crate::state::AppState;

/// Admin-only; the caller mounts it behind `require_admin`.
pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_users).post(create_user))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
}
