//! Service layer

pub mod jwt;

pub use jwt::{Claims, JwtConfig, JwtService};
