//! User routes, including login and the email availability check.

use crate::handlers::users::{check_email, create_user, delete_user, get_user, list_users, login, update_user};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn user_routes(state: AppState) -> Router {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/check-email", get(check_email))
        .route("/users/login", post(login))
        .route("/users/:id", get(get_user).put(update_user).delete(delete_user))
        .with_state(state)
}
