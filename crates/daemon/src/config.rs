//! Configuration management for the Bazaar daemon
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `BAZAAR__`-prefixed environment variables (`BAZAAR__AUTH__JWT__SECRET`).

use crate::{DaemonError, Result};
use bazaar_http::config::AuthConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_PREFIX: &str = "BAZAAR";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub cache: CacheConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; empty allows any
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_origins: vec![],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseKind {
    Sqlite,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `sqlite:` or `postgres://` connection URL
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://bazaar.db".to_string(),
            max_connections: 10,
        }
    }
}

impl DatabaseConfig {
    pub fn kind(&self) -> Option<DatabaseKind> {
        if self.url.starts_with("sqlite:") {
            Some(DatabaseKind::Sqlite)
        } else if self.url.starts_with("postgres://") || self.url.starts_with("postgresql://") {
            Some(DatabaseKind::Postgres)
        } else {
            None
        }
    }
}

/// Grant lookup cache
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: bazaar_core::cache::DEFAULT_CACHE_TTL.as_secs(),
        }
    }
}

impl Settings {
    /// Load settings from defaults, an optional file and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a value has the wrong type
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Like [`Settings::load`], reading `BAZAAR__` variables from `env`
    /// instead of the process environment when it is given
    pub fn load_with_env(path: Option<&Path>, env: Option<config::Map<String, String>>) -> Result<Self> {
        let defaults = config::Config::try_from(&Self::default())?;
        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Reject settings the daemon cannot run with
    ///
    /// # Errors
    ///
    /// Returns [`DaemonError::InvalidConfig`] naming the offending key
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt.secret.trim().is_empty() {
            return Err(DaemonError::InvalidConfig(
                "auth.jwt.secret must be set".to_string(),
            ));
        }
        if self.auth.verify_timeout_ms == 0 {
            return Err(DaemonError::InvalidConfig(
                "auth.verify_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.database.kind().is_none() {
            return Err(DaemonError::InvalidConfig(format!(
                "unsupported database url: {}",
                self.database.url
            )));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
