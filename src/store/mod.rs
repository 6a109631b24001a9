//! Persistence seam for user records.
//!
//! Handlers only see [`UserStore`] and [`UserSession`]; the concrete backend is
//! chosen at startup and injected into the app. A session wraps one unit of
//! work and is released when it is dropped, whichever way the request ends.
//! Work that was not committed before the drop is discarded.

pub mod sqlite;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;

use crate::models::{NewUser, User};

pub use sqlite::SqliteUserStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("session is already closed")]
    SessionClosed,

    #[error("{0}")]
    Rejected(String),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Opens a session scoped to a single request.
    async fn session(&self) -> Result<Box<dyn UserSession>, StoreError>;
}

#[async_trait]
pub trait UserSession: Send {
    /// Inserts a row and returns it with its assigned id. Not visible to other
    /// sessions until [`commit`](UserSession::commit).
    async fn insert(&mut self, user: NewUser) -> Result<User, StoreError>;

    async fn find(&mut self, id: i64) -> Result<Option<User>, StoreError>;

    async fn all(&mut self) -> Result<Vec<User>, StoreError>;

    /// Writes the record's mutable fields back.
    async fn update(&mut self, user: &User) -> Result<(), StoreError>;

    async fn commit(&mut self) -> Result<(), StoreError>;

    /// Discards pending work. A no-op once the session has been committed.
    async fn rollback(&mut self) -> Result<(), StoreError>;
}
