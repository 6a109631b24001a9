//! In-process store for handler tests: same session semantics as the SQLite
//! store, plus commit failure injection and session/rollback accounting.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{StoreError, UserSession, UserStore};
use crate::models::{NewUser, User};

const NAME_MAX_LEN: usize = 80;

#[derive(Default)]
struct Rows {
    by_id: BTreeMap<i64, String>,
    last_id: i64,
}

#[derive(Clone, Default)]
pub struct MemoryUserStore {
    rows: Arc<Mutex<Rows>>,
    fail_commits: Arc<AtomicBool>,
    unavailable: Arc<AtomicBool>,
    open_sessions: Arc<AtomicUsize>,
    rollbacks: Arc<AtomicUsize>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every commit from now on fails with a store error.
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// Opening a session fails, as with an unreachable database.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }

    pub fn rollbacks(&self) -> usize {
        self.rollbacks.load(Ordering::SeqCst)
    }

    pub fn seed(&self, name: &str) -> User {
        let mut rows = self.rows.lock().unwrap();
        rows.last_id += 1;
        let id = rows.last_id;
        rows.by_id.insert(id, name.to_string());
        User { id, name: name.to_string() }
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().by_id.len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn session(&self) -> Result<Box<dyn UserSession>, StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        self.open_sessions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryUserSession {
            store: self.clone(),
            pending: BTreeMap::new(),
            closed: false,
        }))
    }
}

pub struct MemoryUserSession {
    store: MemoryUserStore,
    pending: BTreeMap<i64, String>,
    closed: bool,
}

impl MemoryUserSession {
    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed {
            return Err(StoreError::SessionClosed);
        }
        Ok(())
    }
}

#[async_trait]
impl UserSession for MemoryUserSession {
    async fn insert(&mut self, user: NewUser) -> Result<User, StoreError> {
        self.ensure_open()?;
        // ids are burned even if the insert is rolled back, like a sequence
        let id = {
            let mut rows = self.store.rows.lock().unwrap();
            rows.last_id += 1;
            rows.last_id
        };
        self.pending.insert(id, user.name.clone());
        Ok(User { id, name: user.name })
    }

    async fn find(&mut self, id: i64) -> Result<Option<User>, StoreError> {
        self.ensure_open()?;
        let name = match self.pending.get(&id) {
            Some(name) => Some(name.clone()),
            None => self.store.rows.lock().unwrap().by_id.get(&id).cloned(),
        };
        Ok(name.map(|name| User { id, name }))
    }

    async fn all(&mut self) -> Result<Vec<User>, StoreError> {
        self.ensure_open()?;
        let mut merged = self.store.rows.lock().unwrap().by_id.clone();
        merged.extend(self.pending.clone());
        Ok(merged.into_iter().map(|(id, name)| User { id, name }).collect())
    }

    async fn update(&mut self, user: &User) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.pending.insert(user.id, user.name.clone());
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        self.ensure_open()?;
        if self.store.fail_commits.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected("database is locked".to_string()));
        }
        if let Some(name) = self.pending.values().find(|n| n.chars().count() > NAME_MAX_LEN) {
            log::debug!("rejecting {}-char name", name.chars().count());
            return Err(StoreError::Rejected(format!(
                "error returned from database: (code: 275) CHECK constraint failed: length(name) <= {}",
                NAME_MAX_LEN
            )));
        }

        let pending = std::mem::take(&mut self.pending);
        self.store.rows.lock().unwrap().by_id.extend(pending);
        self.closed = true;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), StoreError> {
        self.store.rollbacks.fetch_add(1, Ordering::SeqCst);
        self.pending.clear();
        self.closed = true;
        Ok(())
    }
}

impl Drop for MemoryUserSession {
    fn drop(&mut self) {
        self.store.open_sessions.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn drop_releases_session_and_discards_pending() {
        let store = MemoryUserStore::new();

        let mut session = store.session().await.unwrap();
        session.insert(NewUser { name: "ghost".into() }).await.unwrap();
        assert_eq!(store.open_sessions(), 1);
        drop(session);

        assert_eq!(store.open_sessions(), 0);
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn failed_commit_keeps_rows_untouched() {
        let store = MemoryUserStore::new();
        store.fail_commits(true);

        let mut session = store.session().await.unwrap();
        session.insert(NewUser { name: "Alice".into() }).await.unwrap();
        assert!(session.commit().await.is_err());
        drop(session);

        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn rollback_is_counted() {
        let store = MemoryUserStore::new();
        let mut session = store.session().await.unwrap();

        session.rollback().await.unwrap();
        assert_eq!(store.rollbacks(), 1);
        assert!(matches!(session.all().await, Err(StoreError::SessionClosed)));
    }
}
