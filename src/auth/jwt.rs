//! JWT token generation and validation
//!
//! Handles creation and verification of access and refresh tokens. Access
//! tokens carry identity claims; refresh tokens carry only the session id
//! they are bound to. Expiry is validated with zero leeway.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::User;

/// JWT-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtError {
    #[error("Token encoding failed: {0}")]
    EncodingFailed(String),

    #[error("Token expired")]
    Expired,

    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Refresh verification failure. `session_id` is populated only when the
/// token's signature verified but the token was expired — the one case where
/// the embedded session id can be trusted and used as a revocation trigger.
#[derive(Error, Debug)]
#[error("{kind}")]
pub struct RefreshTokenError {
    pub kind: JwtError,
    pub session_id: Option<Uuid>,
}

/// JWT claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    /// Subject (user ID)
    pub sub: String,
    /// User email
    pub email: String,
    /// User role
    pub role: String,
    /// Session ID binding this token to a persisted login
    pub sid: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

impl AccessClaims {
    pub fn user_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub).map_err(|e| JwtError::Invalid(e.to_string()))
    }

    pub fn session_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sid).map_err(|e| JwtError::Invalid(e.to_string()))
    }
}

/// JWT claims for refresh tokens — a session reference and nothing else, so a
/// leaked refresh token identifies no user on its own.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshClaims {
    /// Session ID
    pub sid: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

impl RefreshClaims {
    pub fn session_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sid).map_err(|e| JwtError::Invalid(e.to_string()))
    }
}

fn strict_validation() -> Validation {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    validation.leeway = 0;
    validation
}

/// Generate an access token for a user bound to `session_id`.
pub fn sign_access_token(
    user: &User,
    session_id: Uuid,
    secret: &str,
    ttl_seconds: i64,
) -> Result<String, JwtError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(ttl_seconds);

    let claims = AccessClaims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        role: user.role.as_str().to_string(),
        sid: session_id.to_string(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| JwtError::EncodingFailed(e.to_string()))
}

/// Generate a refresh token for `session_id`.
pub fn sign_refresh_token(
    session_id: Uuid,
    secret: &str,
    ttl_days: i64,
) -> Result<String, JwtError> {
    let now = Utc::now();
    let exp = now + Duration::days(ttl_days);

    let claims = RefreshClaims {
        sid: session_id.to_string(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| JwtError::EncodingFailed(e.to_string()))
}

/// Verify and decode an access token. The signature is checked before any
/// claim is trusted; expiry is enforced with no grace period.
pub fn verify_access_token(token: &str, secret: &str) -> Result<AccessClaims, JwtError> {
    let token_data = decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &strict_validation(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::Invalid(e.to_string()),
    })?;

    Ok(token_data.claims)
}

/// Decode an access token while tolerating expiry. The signature must still
/// verify. Used by logout, where an expired credential is a valid request to
/// end its session.
pub fn decode_access_token_allow_expired(
    token: &str,
    secret: &str,
) -> Result<AccessClaims, JwtError> {
    let mut validation = strict_validation();
    validation.validate_exp = false;

    let token_data = decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| JwtError::Invalid(e.to_string()))?;

    Ok(token_data.claims)
}

/// Verify and decode a refresh token.
///
/// An expired-but-well-formed token fails with its session id attached so the
/// caller can revoke the session it references. A token whose signature does
/// not verify never exposes a session id.
pub fn verify_refresh_token(token: &str, secret: &str) -> Result<RefreshClaims, RefreshTokenError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    match decode::<RefreshClaims>(token, &key, &strict_validation()) {
        Ok(token_data) => Ok(token_data.claims),
        Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => {
            let mut lenient = strict_validation();
            lenient.validate_exp = false;
            let session_id = decode::<RefreshClaims>(token, &key, &lenient)
                .ok()
                .and_then(|data| Uuid::parse_str(&data.claims.sid).ok());

            Err(RefreshTokenError {
                kind: JwtError::Expired,
                session_id,
            })
        }
        Err(e) => Err(RefreshTokenError {
            kind: JwtError::Invalid(e.to_string()),
            session_id: None,
        }),
    }
}
