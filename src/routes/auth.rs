//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::auth;
use crate::state::AppState;
use crate::store::AuthStore;

/// Create authentication routes
pub fn auth_routes<S: AuthStore + 'static>() -> Router<AppState<S>> {
    Router::new()
        .route("/v1/login", post(auth::login::<S>))
        .route("/v1/refresh", post(auth::refresh::<S>))
        .route("/v1/logout", post(auth::logout::<S>))
        .route("/v1/session", get(auth::introspect::<S>))
}
