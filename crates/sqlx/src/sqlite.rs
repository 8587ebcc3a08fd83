//! SQLite-specific implementation

use crate::base::SqlxPermissionStore;
use crate::common::db_error;
use bazaar_core::{Result, StoreError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

/// SQLite implementation of PermissionStore
pub type SqlitePermissionStore = SqlxPermissionStore<sqlx::Sqlite>;

impl SqlxPermissionStore<sqlx::Sqlite> {
    /// Open (creating if missing) the database at `database_url` and apply migrations
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| StoreError::Unavailable(format!("Invalid database URL: {e}")))?
            .create_if_missing(true);

        // Every connection to an in-memory database sees its own empty database
        let pool_options = if database_url.contains(":memory:") || database_url.contains("mode=memory") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| db_error("Failed to connect to database", e))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to run migrations: {e}")))?;

        Ok(Self::from_pool(pool))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::PermissionStore;
    use bazaar_core::access::{GrantFlags, Resource, RoleId};
    use bazaar_core::tests::store::PermissionStoreTestSuite;

    async fn setup_sqlite_store() -> SqlitePermissionStore {
        SqlitePermissionStore::new(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_sqlite_compliance() {
        let store = setup_sqlite_store().await;
        let suite = PermissionStoreTestSuite::new(store);
        suite.run_all_tests().await.expect("All tests should pass");
    }

    #[tokio::test]
    async fn test_revocation_keeps_row() {
        let store = setup_sqlite_store().await;
        let role = RoleId::from("admin");
        let order = Resource::from("Order");

        store
            .upsert_grant(&role, &order, GrantFlags::all())
            .await
            .unwrap();
        assert!(store.revoke_grant(&role, &order).await.unwrap());
        assert!(!store.revoke_grant(&role, &order).await.unwrap());

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM grants WHERE revoked_at IS NOT NULL")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);

        // Re-granting revives the row
        let grant = store
            .upsert_grant(&role, &order, GrantFlags::view_only())
            .await
            .unwrap();
        assert_eq!(grant.flags(), GrantFlags::view_only());
        assert_eq!(store.find_grant(&role, &order).await.unwrap(), Some(grant));
    }

    #[tokio::test]
    async fn test_file_database_persists_across_pools() {
        let path = std::env::temp_dir().join(format!("bazaar-grants-{}.db", std::process::id()));
        let url = format!("sqlite://{}", path.display());
        let role = RoleId::from("viewer");
        let payout = Resource::from("Payout");

        {
            let store = SqlitePermissionStore::new(&url).await.unwrap();
            store
                .upsert_grant(&role, &payout, GrantFlags::view_only())
                .await
                .unwrap();
            store.pool().close().await;
        }

        let store = SqlitePermissionStore::new(&url).await.unwrap();
        let grant = store.find_grant(&role, &payout).await.unwrap().unwrap();
        assert!(grant.can_view);
        store.pool().close().await;
        let _ = std::fs::remove_file(path);
    }
}
