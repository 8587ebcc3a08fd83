//! Request-time authorization decisions
//!
//! The gate turns `(credential, resource, action)` into a terminal
//! [`Decision`]. It never returns an error: every failure mode, including
//! store outages, becomes a denial with a reason attached.

use super::identity::{Principal, Resource, TokenVerifier};
use super::permissions::{Action, Decision, Denial, evaluate};
use crate::store::PermissionStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Default bound on a single token verification
pub const DEFAULT_VERIFY_TIMEOUT: Duration = Duration::from_secs(2);

/// Role/resource permission gate
#[derive(Clone)]
pub struct AuthorizationGate {
    store: Arc<dyn PermissionStore>,
    verifier: Arc<dyn TokenVerifier>,
    verify_timeout: Duration,
}

impl AuthorizationGate {
    pub fn new(store: Arc<dyn PermissionStore>, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self {
            store,
            verifier,
            verify_timeout: DEFAULT_VERIFY_TIMEOUT,
        }
    }

    pub fn with_verify_timeout(mut self, timeout: Duration) -> Self {
        self.verify_timeout = timeout;
        self
    }

    pub fn verify_timeout(&self) -> Duration {
        self.verify_timeout
    }

    /// Full request check starting from the raw `Authorization` header value
    #[instrument(name = "gate.authorize", skip_all, fields(resource = %resource, action = %action))]
    pub async fn authorize(
        &self,
        authorization: Option<&str>,
        resource: &Resource,
        action: Action,
    ) -> Decision {
        let credential = match authorization.map(extract_bearer_token) {
            None => return deny(Denial::unauthenticated("Missing authorization header")),
            Some(None) => {
                return deny(Denial::unauthenticated(
                    "Invalid authorization header format",
                ));
            }
            Some(Some(credential)) => credential,
        };

        let principal = match self.resolve(credential).await {
            Ok(principal) => principal,
            Err(denial) => return deny(denial),
        };

        self.check(principal, resource, action).await
    }

    /// Check an already-resolved principal against the stored grant
    #[instrument(name = "gate.check", skip_all, fields(principal = %principal.id, resource = %resource, action = %action))]
    pub async fn check(&self, principal: Principal, resource: &Resource, action: Action) -> Decision {
        let Some(role) = principal.role.as_ref() else {
            return deny(Denial::missing_role());
        };

        let grant = match self.store.find_grant(role, resource).await {
            Ok(grant) => grant,
            Err(e) => {
                warn!(role = %role, "Grant lookup failed: {e}");
                return Decision::Deny(Denial::store_unavailable(e.to_string()));
            }
        };

        match evaluate(grant.as_ref(), action) {
            Ok(()) => {
                debug!(role = %role, "Access granted");
                Decision::Allow(principal)
            }
            Err(denial) => deny(denial),
        }
    }

    async fn resolve(&self, credential: &str) -> Result<Principal, Denial> {
        match tokio::time::timeout(self.verify_timeout, self.verifier.verify(credential)).await {
            Ok(Ok(principal)) => Ok(principal),
            Ok(Err(e)) => Err(Denial::unauthenticated(e.to_string())),
            Err(_) => {
                warn!(timeout = ?self.verify_timeout, "Token verification timed out");
                Err(Denial::verifier_timeout())
            }
        }
    }
}

fn deny(denial: Denial) -> Decision {
    debug!(kind = ?denial.kind, "Access denied: {}", denial.reason);
    Decision::Deny(denial)
}

/// Extract the credential from a `Bearer <token>` header value
pub fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
