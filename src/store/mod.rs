//! Persistence contract for users and sessions.
//!
//! The authentication and user services own every lifecycle decision; a store
//! only executes the requested operation. All operations run inside a
//! transaction handle obtained from [`AuthStore::begin`], so a multi-step call
//! (login's lookup-then-insert, refresh's find-and-touch) is all-or-nothing:
//! writes become visible to other transactions only on [`AuthStore::commit`],
//! and dropping an uncommitted handle aborts it.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Session, User};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgAuthStore;

/// Store-level failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("unique constraint violated: {0}")]
    Conflict(String),
}

/// Transactional store for user and session records.
///
/// One trait covers both tables so a single transaction handle can span them.
/// Reads inside a transaction observe that transaction's own writes.
#[async_trait]
pub trait AuthStore: Send + Sync {
    /// Transaction handle. Dropping it without commit rolls back.
    type Tx: Send;

    async fn begin(&self) -> Result<Self::Tx, StoreError>;
    async fn commit(&self, tx: Self::Tx) -> Result<(), StoreError>;

    async fn insert_user(&self, tx: &mut Self::Tx, user: &User) -> Result<(), StoreError>;
    async fn find_user_by_id(&self, tx: &mut Self::Tx, id: Uuid)
        -> Result<Option<User>, StoreError>;
    async fn find_user_by_email(
        &self,
        tx: &mut Self::Tx,
        email: &str,
    ) -> Result<Option<User>, StoreError>;
    async fn update_user_password(
        &self,
        tx: &mut Self::Tx,
        id: Uuid,
        password_hash: &str,
    ) -> Result<Option<User>, StoreError>;
    /// Delete a user and every session that belongs to them. Returns whether
    /// a user row existed.
    async fn delete_user(&self, tx: &mut Self::Tx, id: Uuid) -> Result<bool, StoreError>;

    async fn insert_session(&self, tx: &mut Self::Tx, session: &Session)
        -> Result<(), StoreError>;
    async fn find_session(
        &self,
        tx: &mut Self::Tx,
        id: Uuid,
    ) -> Result<Option<Session>, StoreError>;
    /// Atomically advance `updated_at` and return the updated row, or `None`
    /// if no such session exists.
    async fn touch_session(
        &self,
        tx: &mut Self::Tx,
        id: Uuid,
    ) -> Result<Option<Session>, StoreError>;
    /// Returns whether a session row existed.
    async fn delete_session(&self, tx: &mut Self::Tx, id: Uuid) -> Result<bool, StoreError>;
}
