use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction};

use super::{StoreError, UserSession, UserStore};
use crate::models::{NewUser, User};

#[derive(Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn session(&self) -> Result<Box<dyn UserSession>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(SqliteUserSession { tx: Some(tx) }))
    }
}

/// One transaction on a pooled connection. Dropping it without a commit rolls
/// the transaction back and returns the connection to the pool.
pub struct SqliteUserSession {
    tx: Option<Transaction<'static, Sqlite>>,
}

impl SqliteUserSession {
    fn tx(&mut self) -> Result<&mut Transaction<'static, Sqlite>, StoreError> {
        self.tx.as_mut().ok_or(StoreError::SessionClosed)
    }
}

#[async_trait]
impl UserSession for SqliteUserSession {
    async fn insert(&mut self, user: NewUser) -> Result<User, StoreError> {
        let tx = self.tx()?;
        let created = sqlx::query_as::<_, User>(
            "INSERT INTO users (name) VALUES (?) RETURNING id, name",
        )
        .bind(&user.name)
        .fetch_one(&mut **tx)
        .await?;

        Ok(created)
    }

    async fn find(&mut self, id: i64) -> Result<Option<User>, StoreError> {
        let tx = self.tx()?;
        let user = sqlx::query_as::<_, User>("SELECT id, name FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(user)
    }

    async fn all(&mut self) -> Result<Vec<User>, StoreError> {
        let tx = self.tx()?;
        let users = sqlx::query_as::<_, User>("SELECT id, name FROM users ORDER BY id")
            .fetch_all(&mut **tx)
            .await?;

        Ok(users)
    }

    async fn update(&mut self, user: &User) -> Result<(), StoreError> {
        let tx = self.tx()?;
        let result = sqlx::query("UPDATE users SET name = ? WHERE id = ?")
            .bind(&user.name)
            .bind(user.id)
            .execute(&mut **tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Rejected(format!(
                "update matched no row for id {}",
                user.id
            )));
        }

        Ok(())
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        match self.tx.take() {
            Some(tx) => Ok(tx.commit().await?),
            None => Err(StoreError::SessionClosed),
        }
    }

    async fn rollback(&mut self) -> Result<(), StoreError> {
        if let Some(tx) = self.tx.take() {
            tx.rollback().await?;
        }
        Ok(())
    }
}
