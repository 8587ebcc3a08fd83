//! HTTP surface of the permission gate
//!
//! Provides the `check_permission` route middleware, the grant administration
//! routes and the JWT token verifier.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use error::{HttpError, Result};
pub use middleware::{AuthenticatedPrincipal, PermissionGuard, check_permission};
pub use state::AppState;

// Re-export commonly used types
pub use axum::{Json, extract, response};
pub use utoipa::OpenApi;
