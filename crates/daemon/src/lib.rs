//! Bazaar permission gate daemon

pub mod commands;
pub mod config;
pub mod error;
pub mod server;

pub use config::Settings;
pub use error::{DaemonError, Result};
pub use server::{ServerBuilder, connect_store, open_store, serve};
