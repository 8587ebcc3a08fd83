//! PostgreSQL-specific implementation

use crate::base::SqlxPermissionStore;
use crate::common::db_error;
use bazaar_core::{Result, StoreError};
use sqlx::postgres::PgPoolOptions;

/// PostgreSQL implementation of PermissionStore
pub type PostgresPermissionStore = SqlxPermissionStore<sqlx::Postgres>;

impl SqlxPermissionStore<sqlx::Postgres> {
    /// Connect to `database_url` and apply migrations
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| db_error("Failed to connect to database", e))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to run migrations: {e}")))?;

        Ok(Self::from_pool(pool))
    }
}
