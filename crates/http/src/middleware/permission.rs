//! Role/resource permission middleware
//!
//! Wrap a protected route with [`check_permission`]:
//!
//! ```ignore
//! let orders = Router::new()
//!     .route("/orders", get(list_orders))
//!     .route_layer(from_fn_with_state(
//!         check_permission(&gate, "Order", Action::View),
//!         permission_middleware,
//!     ));
//! ```

use crate::error::HttpError;
use axum::{
    Router,
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::{Next, from_fn_with_state},
    response::Response,
};
use bazaar_core::access::{Action, AuthorizationGate, Resource};
use std::sync::Arc;

/// The `(resource, action)` requirement of one protected route
#[derive(Clone)]
pub struct PermissionGuard {
    gate: Arc<AuthorizationGate>,
    resource: Resource,
    action: Action,
}

impl PermissionGuard {
    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn action(&self) -> Action {
        self.action
    }

    /// Apply this guard to every route currently in `router`
    pub fn protect<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.route_layer(from_fn_with_state(self, permission_middleware))
    }
}

/// Build the guard for a protected route
pub fn check_permission(
    gate: &Arc<AuthorizationGate>,
    resource: impl Into<Resource>,
    action: Action,
) -> PermissionGuard {
    PermissionGuard {
        gate: gate.clone(),
        resource: resource.into(),
        action,
    }
}

/// Short-circuits with 401/403/503 on denial; otherwise forwards the request
/// with the resolved [`Principal`](bazaar_core::Principal) in its extensions.
pub async fn permission_middleware(
    State(guard): State<PermissionGuard>,
    mut req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    // A header that is not visible ASCII can never be a valid bearer credential
    let authorization = req
        .headers()
        .get(AUTHORIZATION)
        .map(|value| value.to_str().unwrap_or_default());

    let principal = guard
        .gate
        .authorize(authorization, &guard.resource, guard.action)
        .await
        .into_result()?;

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}
