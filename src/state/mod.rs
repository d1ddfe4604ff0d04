//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::AuthService;
use crate::store::AuthStore;
use crate::users::UserService;

/// Shared application state, generic over the store adapter so the same
/// router mounts on Postgres in production and on the in-memory store in
/// tests.
pub struct AppState<S: AuthStore> {
    pub auth_service: Arc<AuthService<S>>,
    pub user_service: Arc<UserService<S>>,
}

impl<S: AuthStore> AppState<S> {
    pub fn new(auth_service: Arc<AuthService<S>>, user_service: Arc<UserService<S>>) -> Self {
        Self {
            auth_service,
            user_service,
        }
    }
}

// Manual Clone: the derive would demand S: Clone, which the Arcs make
// unnecessary.
impl<S: AuthStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            auth_service: self.auth_service.clone(),
            user_service: self.user_service.clone(),
        }
    }
}

impl<S: AuthStore> FromRef<AppState<S>> for Arc<AuthService<S>> {
    fn from_ref(app_state: &AppState<S>) -> Self {
        app_state.auth_service.clone()
    }
}

impl<S: AuthStore> FromRef<AppState<S>> for Arc<UserService<S>> {
    fn from_ref(app_state: &AppState<S>) -> Self {
        app_state.user_service.clone()
    }
}
