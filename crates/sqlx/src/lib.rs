//! SQLx-based PermissionStore implementations for PostgreSQL and SQLite

mod base;
mod common;

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "sqlite")]
mod sqlite;

// Re-export the base type for those who need the generic version
pub use base::SqlxPermissionStore;

// Re-export database-specific types
#[cfg(feature = "postgres")]
pub use postgres::PostgresPermissionStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqlitePermissionStore;
