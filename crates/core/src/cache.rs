//! Short-lived grant cache in front of a [`PermissionStore`]
//!
//! Lookups run on every protected request, so resolved grants (including
//! "no grant") are kept for a bounded time. Writes through this wrapper
//! invalidate the affected key before they return.

use crate::Result;
use crate::access::{Grant, GrantFlags, Resource, RoleId};
use crate::store::PermissionStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, instrument, trace};

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

type GrantKey = (RoleId, Resource);

#[derive(Debug, Clone)]
struct CachedGrant {
    grant: Option<Grant>,
    expires_at: Instant,
}

/// Cache hit and miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

pub struct CachedPermissionStore<S> {
    inner: S,
    ttl: Duration,
    entries: RwLock<HashMap<GrantKey, CachedGrant>>,
    // Bumped on every invalidation. A lookup only fills the cache if no
    // invalidation happened while it was reading the inner store.
    generation: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<S: PermissionStore> CachedPermissionStore<S> {
    pub fn new(inner: S) -> Self {
        Self::with_ttl(inner, DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    async fn invalidate(&self, role_id: &RoleId, resource: &Resource) {
        let mut entries = self.entries.write().await;
        self.generation.fetch_add(1, Ordering::AcqRel);
        entries.remove(&(role_id.clone(), resource.clone()));
        trace!(role = %role_id, resource = %resource, "Invalidated cached grant");
    }
}

#[async_trait]
impl<S: PermissionStore> PermissionStore for CachedPermissionStore<S> {
    async fn upsert_grant(
        &self,
        role_id: &RoleId,
        resource: &Resource,
        flags: GrantFlags,
    ) -> Result<Grant> {
        let result = self.inner.upsert_grant(role_id, resource, flags).await;
        // Invalidate even on error: the write may have landed before the failure surfaced.
        self.invalidate(role_id, resource).await;
        result
    }

    #[instrument(name = "cache.find_grant", skip_all, fields(role = %role_id, resource = %resource))]
    async fn find_grant(&self, role_id: &RoleId, resource: &Resource) -> Result<Option<Grant>> {
        let key = (role_id.clone(), resource.clone());

        {
            let entries = self.entries.read().await;
            if let Some(cached) = entries.get(&key)
                && cached.expires_at > Instant::now()
            {
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!("Cache hit");
                return Ok(cached.grant.clone());
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let generation = self.generation.load(Ordering::Acquire);
        let grant = self.inner.find_grant(role_id, resource).await?;

        let mut entries = self.entries.write().await;
        if self.generation.load(Ordering::Acquire) == generation {
            entries.insert(
                key,
                CachedGrant {
                    grant: grant.clone(),
                    expires_at: Instant::now() + self.ttl,
                },
            );
        } else {
            debug!("Grant changed during lookup, not caching");
        }

        Ok(grant)
    }

    async fn revoke_grant(&self, role_id: &RoleId, resource: &Resource) -> Result<bool> {
        let result = self.inner.revoke_grant(role_id, resource).await;
        self.invalidate(role_id, resource).await;
        result
    }

    async fn list_grants(&self, role_id: &RoleId) -> Result<Vec<Grant>> {
        self.inner.list_grants(role_id).await
    }
}
