//! User routes

use axum::{routing::post, Router};

use crate::handlers::user;
use crate::state::AppState;
use crate::store::AuthStore;

/// Create user routes
pub fn user_routes<S: AuthStore + 'static>() -> Router<AppState<S>> {
    Router::new().route(
        "/v1/user",
        post(user::create_user::<S>)
            .get(user::get_profile::<S>)
            .patch(user::update_password::<S>)
            .delete(user::delete_user::<S>),
    )
}
