//! Bazaar access-control core: grants, the permission store contract and the
//! authorization gate

pub mod access;
pub mod cache;
pub mod error;
pub mod store;
pub mod tracing;

#[cfg(any(test, feature = "tests"))]
pub mod tests;

pub use access::{Action, AuthorizationGate, Decision, Denial, Grant, GrantFlags, Principal};
pub use cache::CachedPermissionStore;
pub use error::{Result, StoreError};
pub use store::PermissionStore;
