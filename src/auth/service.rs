//! Authentication service
//!
//! Core business logic for the session lifecycle. A session moves from
//! created (login) through touches (refresh) to deleted (logout or
//! compromise), and every multi-step mutation runs inside one store
//! transaction: either the whole operation commits or none of it does.

use std::sync::Arc;

use thiserror::Error;

use crate::models::Session;
use crate::store::{AuthStore, StoreError};

use super::jwt::{self, AccessClaims, JwtError};
use super::password;

/// Auth service errors. All are terminal for the current call; nothing is
/// retried here.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Unknown email or wrong password — deliberately indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("session not found or revoked")]
    SessionNotFound,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("token expired")]
    TokenExpired,

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        AuthError::StoreUnavailable(e.to_string())
    }
}

impl From<JwtError> for AuthError {
    fn from(e: JwtError) -> Self {
        match e {
            JwtError::Expired => AuthError::TokenExpired,
            JwtError::EncodingFailed(msg) | JwtError::Invalid(msg) => {
                AuthError::TokenInvalid(msg)
            }
        }
    }
}

/// A freshly issued access/refresh token pair.
#[derive(Debug)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Authentication service over a transactional store.
pub struct AuthService<S: AuthStore> {
    store: Arc<S>,
    jwt_secret: String,
    access_token_ttl_seconds: i64,
    refresh_token_ttl_days: i64,
}

impl<S: AuthStore> AuthService<S> {
    pub fn new(
        store: Arc<S>,
        jwt_secret: String,
        access_token_ttl_seconds: i64,
        refresh_token_ttl_days: i64,
    ) -> Self {
        Self {
            store,
            jwt_secret,
            access_token_ttl_seconds,
            refresh_token_ttl_days,
        }
    }

    /// Access token lifetime, for `expires_in` response fields.
    pub fn access_token_ttl_seconds(&self) -> i64 {
        self.access_token_ttl_seconds
    }

    /// Verify an email/password pair and open a new session.
    ///
    /// A user-lookup miss and a password mismatch produce the same error, so
    /// the caller learns nothing about which accounts exist. No session row
    /// survives a failed login: the transaction commits only after both
    /// tokens are signed.
    pub async fn password_login(&self, email: &str, secret: &str) -> Result<TokenPair, AuthError> {
        let mut tx = self.store.begin().await?;

        let user = self
            .store
            .find_user_by_email(&mut tx, email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !password::verify_secret(secret, &user.password_hash) {
            tracing::info!(user_id = %user.id, "password login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let session = Session::new(user.id);
        self.store.insert_session(&mut tx, &session).await?;

        let access_token = jwt::sign_access_token(
            &user,
            session.id,
            &self.jwt_secret,
            self.access_token_ttl_seconds,
        )?;
        let refresh_token =
            jwt::sign_refresh_token(session.id, &self.jwt_secret, self.refresh_token_ttl_days)?;

        self.store.commit(tx).await?;

        tracing::info!(user_id = %user.id, session_id = %session.id, "password login succeeded");

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Validate an access token and confirm its session is still live.
    ///
    /// The session lookup catches tokens signed before a logout that predates
    /// their natural expiry. Read-only; no state changes on any path.
    pub async fn authenticate(&self, access_token: &str) -> Result<AccessClaims, AuthError> {
        let claims = jwt::verify_access_token(access_token, &self.jwt_secret)?;
        let session_id = claims.session_id()?;

        let mut tx = self.store.begin().await?;
        let session = self.store.find_session(&mut tx, session_id).await?;
        self.store.commit(tx).await?;

        if session.is_none() {
            tracing::info!(session_id = %session_id, "access token for terminated session");
            return Err(AuthError::SessionNotFound);
        }

        Ok(claims)
    }

    /// Exchange a refresh token for a fresh access token.
    ///
    /// The session id is stable across refreshes: only the access token is
    /// reissued and the caller keeps the refresh token it presented. The
    /// session row's `updated_at` advances as the rotation marker.
    ///
    /// A refresh token that fails verification is treated as a compromise
    /// signal, not just a rejected request: when the failure still yields a
    /// trustworthy session id (expired but signature-valid), that session is
    /// deleted before the error is surfaced.
    pub async fn refresh_login(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = match jwt::verify_refresh_token(refresh_token, &self.jwt_secret) {
            Ok(claims) => claims,
            Err(err) => {
                if let Some(session_id) = err.session_id {
                    let mut tx = self.store.begin().await?;
                    let deleted = self.store.delete_session(&mut tx, session_id).await?;
                    self.store.commit(tx).await?;
                    tracing::warn!(
                        session_id = %session_id,
                        deleted,
                        "revoked session after refresh token verification failure"
                    );
                }
                return Err(err.kind.into());
            }
        };
        let session_id = claims.session_id()?;

        let mut tx = self.store.begin().await?;

        let session = self
            .store
            .touch_session(&mut tx, session_id)
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        let user = self
            .store
            .find_user_by_id(&mut tx, session.user_id)
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        let access_token = jwt::sign_access_token(
            &user,
            session.id,
            &self.jwt_secret,
            self.access_token_ttl_seconds,
        )?;

        self.store.commit(tx).await?;

        tracing::info!(user_id = %user.id, session_id = %session.id, "access token refreshed");

        Ok(TokenPair {
            access_token,
            refresh_token: refresh_token.to_string(),
        })
    }

    /// Terminate the session named by an access token. Idempotent: a token
    /// whose session is already gone, or from which no session id can be
    /// recovered, still succeeds. Expired tokens are honored — the signature
    /// must verify, but a stale credential is a valid request to end its own
    /// session.
    pub async fn logout(&self, access_token: &str) -> Result<(), AuthError> {
        let claims = match jwt::decode_access_token_allow_expired(access_token, &self.jwt_secret) {
            Ok(claims) => claims,
            Err(err) => {
                tracing::debug!(error = %err, "logout with unverifiable token");
                return Ok(());
            }
        };

        let Ok(session_id) = claims.session_id() else {
            return Ok(());
        };

        let mut tx = self.store.begin().await?;
        let deleted = self.store.delete_session(&mut tx, session_id).await?;
        self.store.commit(tx).await?;

        tracing::info!(session_id = %session_id, deleted, "logged out");

        Ok(())
    }
}
