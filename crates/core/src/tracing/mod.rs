//! Tracing setup shared by Bazaar binaries

pub mod config;
#[cfg(feature = "tracing-init")]
pub mod init;

pub use config::InstrumentationConfig;
