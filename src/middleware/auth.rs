//! Authentication middleware
//!
//! Extractor that turns a bearer access token into the caller's identity.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::UserRole;
use crate::state::AppState;
use crate::store::AuthStore;

/// Authenticated caller extracted from a verified access token whose session
/// row is still live.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub session_id: Uuid,
}

#[async_trait]
impl<S> FromRequestParts<AppState<S>> for AuthenticatedUser
where
    S: AuthStore + 'static,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    ApiError::Unauthorized(
                        "Authorization header with Bearer token required".to_string(),
                    )
                    .into_response()
                })?;

        let claims = state
            .auth_service
            .authenticate(bearer.token())
            .await
            .map_err(|e| ApiError::from(e).into_response())?;

        let user_id = claims
            .user_id()
            .map_err(|_| ApiError::Unauthorized("Invalid user ID in token".to_string()).into_response())?;

        let session_id = claims
            .session_id()
            .map_err(|_| ApiError::Unauthorized("Invalid session ID in token".to_string()).into_response())?;

        let role = UserRole::parse(&claims.role).ok_or_else(|| {
            ApiError::Unauthorized("Invalid role in token".to_string()).into_response()
        })?;

        Ok(AuthenticatedUser {
            user_id,
            email: claims.email,
            role,
            session_id,
        })
    }
}
