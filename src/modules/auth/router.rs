use axum::{
    Router,
    routing::{get, post, put},
};

use super::controller::{
    forgot_password, get_me, login, logout, register, reset_password, update_details,
    update_password,
};
use crate::state::AppState;

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", get(logout))
        .route("/me", get(get_me))
        .route("/updatedetails", put(update_details))
        .route("/updatepassword", put(update_password))
        .route("/forgotpassword", post(forgot_password))
        .route("/resetpassword/{resettoken}", put(reset_password))
}
