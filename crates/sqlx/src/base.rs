//! Base generic SQLx implementation

use async_trait::async_trait;
use bazaar_core::{
    PermissionStore, Result,
    access::{Grant, GrantFlags, Resource, RoleId},
};
use chrono::Utc;
use sqlx::{Database, Executor, FromRow, IntoArguments, Pool};
use tracing::{debug, instrument};

use crate::common::{GRANT_COLUMNS, GrantRow, datetime_to_string, db_error};

/// Generic SQLx implementation of PermissionStore
pub struct SqlxPermissionStore<DB: Database> {
    pool: Pool<DB>,
}

impl<DB: Database> SqlxPermissionStore<DB> {
    /// Wrap an existing pool. The `grants` table must already exist.
    pub fn from_pool(pool: Pool<DB>) -> Self {
        Self { pool }
    }

    /// Get the underlying pool (for running migrations externally)
    pub fn pool(&self) -> &Pool<DB> {
        &self.pool
    }
}

#[async_trait]
impl<DB> PermissionStore for SqlxPermissionStore<DB>
where
    DB: Database,
    for<'c> &'c mut <DB as Database>::Connection: Executor<'c, Database = DB>,
    for<'r> GrantRow: FromRow<'r, DB::Row>,
    for<'r> (String,): FromRow<'r, DB::Row>,
    // Required for async_trait with generic parameters
    DB: Send + Sync,
    DB::Connection: Send,
    // Required for parameter binding
    for<'q> String: sqlx::Encode<'q, DB> + sqlx::Type<DB>,
    for<'q> &'q str: sqlx::Encode<'q, DB> + sqlx::Type<DB>,
    for<'q> bool: sqlx::Encode<'q, DB> + sqlx::Type<DB>,
    // Required for queries
    for<'q> <DB as Database>::Arguments<'q>: IntoArguments<'q, DB>,
{
    #[instrument(name = "db.upsert_grant", skip(self), fields(role = %role_id, resource = %resource))]
    async fn upsert_grant(
        &self,
        role_id: &RoleId,
        resource: &Resource,
        flags: GrantFlags,
    ) -> Result<Grant> {
        // Single statement so racing writers each replace the whole row
        let query = format!(
            "INSERT INTO grants (role_id, resource, can_view, can_edit, can_delete, updated_at, revoked_at) \
             VALUES ($1, $2, $3, $4, $5, $6, NULL) \
             ON CONFLICT (role_id, resource) DO UPDATE SET \
                 can_view = excluded.can_view, \
                 can_edit = excluded.can_edit, \
                 can_delete = excluded.can_delete, \
                 updated_at = excluded.updated_at, \
                 revoked_at = NULL \
             RETURNING {GRANT_COLUMNS}"
        );

        let row = sqlx::query_as::<_, GrantRow>(&query)
            .bind(role_id.as_str())
            .bind(resource.as_str())
            .bind(flags.can_view)
            .bind(flags.can_edit)
            .bind(flags.can_delete)
            .bind(datetime_to_string(Utc::now()))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Failed to upsert grant", e))?;

        row.try_into()
    }

    #[instrument(name = "db.find_grant", skip(self), fields(role = %role_id, resource = %resource))]
    async fn find_grant(&self, role_id: &RoleId, resource: &Resource) -> Result<Option<Grant>> {
        let query = format!(
            "SELECT {GRANT_COLUMNS} FROM grants \
             WHERE role_id = $1 AND resource = $2 AND revoked_at IS NULL"
        );

        let row = sqlx::query_as::<_, GrantRow>(&query)
            .bind(role_id.as_str())
            .bind(resource.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find grant", e))?;

        row.map(Grant::try_from).transpose()
    }

    #[instrument(name = "db.revoke_grant", skip(self), fields(role = %role_id, resource = %resource))]
    async fn revoke_grant(&self, role_id: &RoleId, resource: &Resource) -> Result<bool> {
        let revoked = sqlx::query_as::<_, (String,)>(
            "UPDATE grants SET revoked_at = $3, updated_at = $3 \
             WHERE role_id = $1 AND resource = $2 AND revoked_at IS NULL \
             RETURNING role_id",
        )
        .bind(role_id.as_str())
        .bind(resource.as_str())
        .bind(datetime_to_string(Utc::now()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to revoke grant", e))?;

        debug!(revoked = revoked.is_some(), "Revocation applied");
        Ok(revoked.is_some())
    }

    #[instrument(name = "db.list_grants", skip(self), fields(role = %role_id))]
    async fn list_grants(&self, role_id: &RoleId) -> Result<Vec<Grant>> {
        let query = format!(
            "SELECT {GRANT_COLUMNS} FROM grants \
             WHERE role_id = $1 AND revoked_at IS NULL \
             ORDER BY resource"
        );

        let rows = sqlx::query_as::<_, GrantRow>(&query)
            .bind(role_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list grants", e))?;

        rows.into_iter().map(Grant::try_from).collect()
    }
}
