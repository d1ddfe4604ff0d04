//! Authentication HTTP handlers
//!
//! Endpoints for the session lifecycle: login, refresh, introspection, and
//! logout.

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::auth::{AccessClaims, TokenPair};
use crate::error::ApiError;
use crate::models::{LoginRequest, RefreshTokenRequest, TokenPairResponse};
use crate::state::AppState;
use crate::store::AuthStore;

fn token_response<S: AuthStore>(state: &AppState<S>, pair: TokenPair) -> TokenPairResponse {
    TokenPairResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: state.auth_service.access_token_ttl_seconds(),
    }
}

/// POST /v1/login - Verify credentials and open a session
pub async fn login<S: AuthStore>(
    State(state): State<AppState<S>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenPairResponse>, ApiError> {
    let pair = state
        .auth_service
        .password_login(&req.email, &req.password)
        .await?;

    Ok(Json(token_response(&state, pair)))
}

/// POST /v1/refresh - Exchange a refresh token for a new access token
pub async fn refresh<S: AuthStore>(
    State(state): State<AppState<S>>,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<Json<TokenPairResponse>, ApiError> {
    let pair = state.auth_service.refresh_login(&req.refresh_token).await?;

    Ok(Json(token_response(&state, pair)))
}

/// GET /v1/session - Validate an access token and return its claims
pub async fn introspect<S: AuthStore>(
    State(state): State<AppState<S>>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<AccessClaims>, ApiError> {
    let claims = state.auth_service.authenticate(bearer.token()).await?;

    Ok(Json(claims))
}

/// POST /v1/logout - Terminate the token's session (idempotent)
///
/// Takes the raw bearer token rather than the authenticated-user extractor:
/// logout must succeed for expired tokens and for sessions that are already
/// gone, both of which the extractor rejects.
pub async fn logout<S: AuthStore>(
    State(state): State<AppState<S>>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
) -> Result<StatusCode, ApiError> {
    state.auth_service.logout(bearer.token()).await?;

    Ok(StatusCode::NO_CONTENT)
}
