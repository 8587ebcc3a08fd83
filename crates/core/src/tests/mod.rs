//! Test doubles and a reusable store compliance suite
//!
//! Enabled for unit tests and through the `tests` feature so downstream
//! crates can verify their own [`PermissionStore`](crate::PermissionStore)
//! implementations.

pub mod verifier;
