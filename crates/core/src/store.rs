use crate::Result;
use crate::access::{Grant, GrantFlags, Resource, RoleId};
use async_trait::async_trait;

/// Persistence for `(role, resource)` grants.
///
/// Implementations keep at most one live grant per pair. `upsert_grant` must
/// be atomic with respect to concurrent callers on the same pair: the stored
/// record always matches exactly one caller's input.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Create the grant, or replace all three flags of the existing one
    async fn upsert_grant(
        &self,
        role_id: &RoleId,
        resource: &Resource,
        flags: GrantFlags,
    ) -> Result<Grant>;

    /// Exact-match lookup of a live grant
    async fn find_grant(&self, role_id: &RoleId, resource: &Resource) -> Result<Option<Grant>>;

    /// Mark the grant revoked. Returns `false` if no live grant existed.
    async fn revoke_grant(&self, role_id: &RoleId, resource: &Resource) -> Result<bool>;

    /// Live grants of a role, ordered by resource
    async fn list_grants(&self, role_id: &RoleId) -> Result<Vec<Grant>>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use mockall::mock;

    mock! {
        pub PermissionStore {}

        #[async_trait]
        impl PermissionStore for PermissionStore {
            async fn upsert_grant(
                &self,
                role_id: &RoleId,
                resource: &Resource,
                flags: GrantFlags,
            ) -> Result<Grant>;
            async fn find_grant(&self, role_id: &RoleId, resource: &Resource) -> Result<Option<Grant>>;
            async fn revoke_grant(&self, role_id: &RoleId, resource: &Resource) -> Result<bool>;
            async fn list_grants(&self, role_id: &RoleId) -> Result<Vec<Grant>>;
        }
    }
}
