//! Application state management

use bazaar_core::{AuthorizationGate, PermissionStore};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Grant storage, usually the cached store the gate also reads from
    pub store: Arc<dyn PermissionStore>,
    /// Gate used by protected routes
    pub gate: Arc<AuthorizationGate>,
    /// Put the administration routes behind the gate
    pub protect_administration: bool,
}

impl AppState {
    pub fn new(store: Arc<dyn PermissionStore>, gate: Arc<AuthorizationGate>) -> Self {
        Self {
            store,
            gate,
            protect_administration: false,
        }
    }

    pub fn with_protected_administration(mut self, protect: bool) -> Self {
        self.protect_administration = protect;
        self
    }
}
