//! PostgreSQL store adapter backed by sqlx.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::{Session, User};

use super::{AuthStore, StoreError};

/// Session and user store on a PostgreSQL pool.
#[derive(Clone)]
pub struct PgAuthStore {
    pool: PgPool,
}

impl PgAuthStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_insert_err(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::Database(ref db) if db.code().as_deref() == Some("23505") => {
            StoreError::Conflict(db.message().to_string())
        }
        other => StoreError::Database(other),
    }
}

#[async_trait]
impl AuthStore for PgAuthStore {
    type Tx = Transaction<'static, Postgres>;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        Ok(self.pool.begin().await?)
    }

    async fn commit(&self, tx: Self::Tx) -> Result<(), StoreError> {
        Ok(tx.commit().await?)
    }

    async fn insert_user(&self, tx: &mut Self::Tx, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, password_hash, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(map_insert_err)?;

        Ok(())
    }

    async fn find_user_by_id(
        &self,
        tx: &mut Self::Tx,
        id: Uuid,
    ) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, role, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(user)
    }

    async fn find_user_by_email(
        &self,
        tx: &mut Self::Tx,
        email: &str,
    ) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, role, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(user)
    }

    async fn update_user_password(
        &self,
        tx: &mut Self::Tx,
        id: Uuid,
        password_hash: &str,
    ) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET password_hash = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, email, name, password_hash, role, created_at, updated_at
            "#,
        )
        .bind(password_hash)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(user)
    }

    async fn delete_user(&self, tx: &mut Self::Tx, id: Uuid) -> Result<bool, StoreError> {
        // Sessions are removed by the ON DELETE CASCADE on sessions.user_id.
        let rows_affected = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn insert_session(
        &self,
        tx: &mut Self::Tx,
        session: &Session,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (id, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(session.created_at)
        .bind(session.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(map_insert_err)?;

        Ok(())
    }

    async fn find_session(
        &self,
        tx: &mut Self::Tx,
        id: Uuid,
    ) -> Result<Option<Session>, StoreError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, user_id, created_at, updated_at
            FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(session)
    }

    async fn touch_session(
        &self,
        tx: &mut Self::Tx,
        id: Uuid,
    ) -> Result<Option<Session>, StoreError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            UPDATE sessions
            SET updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(session)
    }

    async fn delete_session(&self, tx: &mut Self::Tx, id: Uuid) -> Result<bool, StoreError> {
        let rows_affected = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }
}
