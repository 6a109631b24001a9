use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::config::DatabaseSettings;
use crate::store::SqliteUserStore;

const USERS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name VARCHAR(80) NOT NULL CHECK (length(name) <= 80)
)
"#;

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&settings.url)
            .with_context(|| format!("invalid database URL: {}", settings.url))?
            .create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new()
            .acquire_timeout(Duration::from_secs(5));

        pool_options = if settings.is_memory() {
            // Uma única conexão que nunca expira, senão o banco em memória some
            pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options
                .max_connections(settings.max_connections)
                .idle_timeout(Duration::from_secs(300))
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .context("failed to open database pool")?;

        let database = Self { pool };
        database.ensure_schema().await?;

        Ok(database)
    }

    /// Creates the users table when it does not exist yet.
    async fn ensure_schema(&self) -> Result<()> {
        log::info!("🔧 Ensuring database schema...");

        sqlx::query(USERS_SCHEMA)
            .execute(&self.pool)
            .await
            .context("failed to create users table")?;

        log::info!("✅ Database schema ready");
        Ok(())
    }

    pub fn user_store(&self) -> SqliteUserStore {
        SqliteUserStore::new(self.pool.clone())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
