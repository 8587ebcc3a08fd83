//! Authentication configuration

use crate::services::jwt::JwtConfig;
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// JWT configuration that can be serialized
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JwtConfigData {
    /// Secret key for signing tokens
    pub secret: String,
    /// Token expiration duration in seconds
    pub expiration_seconds: i64,
    /// Token issuer
    pub issuer: String,
}

impl Default for JwtConfigData {
    fn default() -> Self {
        Self {
            secret: String::new(),
            expiration_seconds: 86400,
            issuer: "bazaar".to_string(),
        }
    }
}

impl From<JwtConfigData> for JwtConfig {
    fn from(data: JwtConfigData) -> Self {
        Self {
            secret: data.secret,
            expiration: Duration::seconds(data.expiration_seconds),
            issuer: data.issuer,
        }
    }
}

/// Authentication and gate configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt: JwtConfigData,
    /// Upper bound on a single credential verification, in milliseconds
    pub verify_timeout_ms: u64,
    /// Require the `Permission` grant on the administration routes
    pub protect_administration: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt: JwtConfigData::default(),
            verify_timeout_ms: bazaar_core::access::DEFAULT_VERIFY_TIMEOUT.as_millis() as u64,
            protect_administration: false,
        }
    }
}
