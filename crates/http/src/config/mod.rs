pub mod auth;

pub use auth::{AuthConfig, JwtConfigData};
