//! In-memory store adapter.
//!
//! Useful for local development and for exercising the services without a
//! database. Transactions are snapshots: `begin` clones the current state,
//! operations run against the clone, and `commit` swaps it back in. Dropping
//! an uncommitted transaction discards the clone, so rollback is automatic.
//! Concurrent transactions follow last-writer-wins, which mirrors the
//! accepted lost-update behavior documented for concurrent refreshes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::models::{Session, User};

use super::{AuthStore, StoreError};

#[derive(Default, Clone)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    sessions: HashMap<Uuid, Session>,
}

/// Snapshot transaction over [`MemoryStore`].
pub struct MemoryTx {
    state: MemoryState,
}

/// Process-local store keyed on the same records as the Postgres schema.
#[derive(Default, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live session rows. Intended for diagnostics and tests.
    pub fn session_count(&self) -> usize {
        self.inner.lock().expect("memory store lock poisoned").sessions.len()
    }

    /// Number of user rows. Intended for diagnostics and tests.
    pub fn user_count(&self) -> usize {
        self.inner.lock().expect("memory store lock poisoned").users.len()
    }

    fn snapshot(&self) -> MemoryState {
        self.inner.lock().expect("memory store lock poisoned").clone()
    }

    fn replace(&self, state: MemoryState) {
        *self.inner.lock().expect("memory store lock poisoned") = state;
    }
}

#[async_trait]
impl AuthStore for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        Ok(MemoryTx {
            state: self.snapshot(),
        })
    }

    async fn commit(&self, tx: Self::Tx) -> Result<(), StoreError> {
        self.replace(tx.state);
        Ok(())
    }

    async fn insert_user(&self, tx: &mut Self::Tx, user: &User) -> Result<(), StoreError> {
        if tx.state.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(format!(
                "email already registered: {}",
                user.email
            )));
        }
        tx.state.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user_by_id(
        &self,
        tx: &mut Self::Tx,
        id: Uuid,
    ) -> Result<Option<User>, StoreError> {
        Ok(tx.state.users.get(&id).cloned())
    }

    async fn find_user_by_email(
        &self,
        tx: &mut Self::Tx,
        email: &str,
    ) -> Result<Option<User>, StoreError> {
        Ok(tx.state.users.values().find(|u| u.email == email).cloned())
    }

    async fn update_user_password(
        &self,
        tx: &mut Self::Tx,
        id: Uuid,
        password_hash: &str,
    ) -> Result<Option<User>, StoreError> {
        match tx.state.users.get_mut(&id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = Utc::now();
                Ok(Some(user.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_user(&self, tx: &mut Self::Tx, id: Uuid) -> Result<bool, StoreError> {
        let existed = tx.state.users.remove(&id).is_some();
        if existed {
            tx.state.sessions.retain(|_, s| s.user_id != id);
        }
        Ok(existed)
    }

    async fn insert_session(
        &self,
        tx: &mut Self::Tx,
        session: &Session,
    ) -> Result<(), StoreError> {
        tx.state.sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn find_session(
        &self,
        tx: &mut Self::Tx,
        id: Uuid,
    ) -> Result<Option<Session>, StoreError> {
        Ok(tx.state.sessions.get(&id).cloned())
    }

    async fn touch_session(
        &self,
        tx: &mut Self::Tx,
        id: Uuid,
    ) -> Result<Option<Session>, StoreError> {
        match tx.state.sessions.get_mut(&id) {
            Some(session) => {
                session.updated_at = Utc::now();
                Ok(Some(session.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_session(&self, tx: &mut Self::Tx, id: Uuid) -> Result<bool, StoreError> {
        Ok(tx.state.sessions.remove(&id).is_some())
    }
}
