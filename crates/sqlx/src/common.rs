//! Common types and utilities shared between database implementations

use bazaar_core::{
    Result, StoreError,
    access::{Grant, Resource, RoleId},
};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub const GRANT_COLUMNS: &str = "role_id, resource, can_view, can_edit, can_delete, updated_at";

// Helper functions for timestamp conversion
pub fn datetime_to_string(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

pub fn string_to_datetime(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Unavailable(format!("Invalid timestamp format: {e}")))
}

pub fn db_error(context: &str, err: sqlx::Error) -> StoreError {
    StoreError::Unavailable(format!("{context}: {err}"))
}

#[derive(FromRow)]
pub struct GrantRow {
    pub role_id: String,
    pub resource: String,
    pub can_view: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub updated_at: String, // ISO8601 format
}

impl TryFrom<GrantRow> for Grant {
    type Error = StoreError;

    fn try_from(row: GrantRow) -> Result<Self> {
        Ok(Self {
            role_id: RoleId::from(row.role_id),
            resource: Resource::from(row.resource),
            can_view: row.can_view,
            can_edit: row.can_edit,
            can_delete: row.can_delete,
            updated_at: string_to_datetime(&row.updated_at)?,
        })
    }
}
