//! User provisioning service
//!
//! Create, read, update-password, and delete for user records. Passwords are
//! bcrypt-hashed before they reach the store; the plaintext never leaves this
//! module's call frame.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::password;
use crate::models::{CreateUserRequest, User, UserRole};
use crate::store::{AuthStore, StoreError};

/// User service errors
#[derive(Error, Debug)]
pub enum UserError {
    #[error("a user with this email already exists")]
    EmailTaken,

    #[error("user not found")]
    NotFound,

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<StoreError> for UserError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(_) => UserError::EmailTaken,
            other => UserError::StoreUnavailable(other.to_string()),
        }
    }
}

/// User service over a transactional store.
pub struct UserService<S: AuthStore> {
    store: Arc<S>,
    bcrypt_cost: u32,
}

impl<S: AuthStore> UserService<S> {
    pub fn new(store: Arc<S>, bcrypt_cost: u32) -> Self {
        Self { store, bcrypt_cost }
    }

    /// Register a new user. New accounts get the `tenant` role.
    pub async fn create_user(&self, req: CreateUserRequest) -> Result<User, UserError> {
        let mut tx = self.store.begin().await?;

        if self
            .store
            .find_user_by_email(&mut tx, &req.email)
            .await?
            .is_some()
        {
            return Err(UserError::EmailTaken);
        }

        let password_hash = password::hash_secret(&req.password, self.bcrypt_cost)
            .map_err(|e| UserError::Hash(e.to_string()))?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: req.email,
            name: req.name,
            password_hash,
            role: UserRole::Tenant,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_user(&mut tx, &user).await?;
        self.store.commit(tx).await?;

        tracing::info!(user_id = %user.id, "user created");

        Ok(user)
    }

    /// Fetch a user by id.
    pub async fn get_user(&self, id: Uuid) -> Result<User, UserError> {
        let mut tx = self.store.begin().await?;
        let user = self.store.find_user_by_id(&mut tx, id).await?;
        self.store.commit(tx).await?;

        user.ok_or(UserError::NotFound)
    }

    /// Replace a user's password hash.
    pub async fn update_password(&self, id: Uuid, new_password: &str) -> Result<User, UserError> {
        let password_hash = password::hash_secret(new_password, self.bcrypt_cost)
            .map_err(|e| UserError::Hash(e.to_string()))?;

        let mut tx = self.store.begin().await?;
        let user = self
            .store
            .update_user_password(&mut tx, id, &password_hash)
            .await?
            .ok_or(UserError::NotFound)?;
        self.store.commit(tx).await?;

        tracing::info!(user_id = %user.id, "password updated");

        Ok(user)
    }

    /// Remove a user and all of their sessions.
    pub async fn delete_user(&self, id: Uuid) -> Result<(), UserError> {
        let mut tx = self.store.begin().await?;
        let existed = self.store.delete_user(&mut tx, id).await?;
        self.store.commit(tx).await?;

        if !existed {
            return Err(UserError::NotFound);
        }

        tracing::info!(user_id = %id, "user deleted");

        Ok(())
    }
}
