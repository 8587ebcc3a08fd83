//! Middleware components for HTTP request processing

pub mod auth;
pub mod permission;
pub mod trace;

pub use auth::AuthenticatedPrincipal;
pub use permission::{PermissionGuard, check_permission, permission_middleware};
pub use trace::trace_middleware;
