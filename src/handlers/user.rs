//! User-related API handlers

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use super::AuthenticatedUser;
use crate::error::ApiError;
use crate::models::{CreateUserRequest, UpdatePasswordRequest, UserResponse};
use crate::state::AppState;
use crate::store::AuthStore;

/// POST /v1/user - Register a new user
pub async fn create_user<S: AuthStore>(
    State(state): State<AppState<S>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    req.validate()?;

    let user = state.user_service.create_user(req).await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /v1/user - Profile of the authenticated caller
pub async fn get_profile<S: AuthStore>(
    State(state): State<AppState<S>>,
    user: AuthenticatedUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.user_service.get_user(user.user_id).await?;

    Ok(Json(user.into()))
}

/// PATCH /v1/user - Change the caller's password
pub async fn update_password<S: AuthStore>(
    State(state): State<AppState<S>>,
    user: AuthenticatedUser,
    Json(req): Json<UpdatePasswordRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    req.validate()?;

    let user = state
        .user_service
        .update_password(user.user_id, &req.password)
        .await?;

    Ok(Json(user.into()))
}

/// DELETE /v1/user - Delete the caller's account and its sessions
pub async fn delete_user<S: AuthStore>(
    State(state): State<AppState<S>>,
    user: AuthenticatedUser,
) -> Result<StatusCode, ApiError> {
    state.user_service.delete_user(user.user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
