//! Error types for ZoneRouter.
//!
//! Routing, monitoring and layout never return errors: per-window failures are
//! logged and skipped. This type covers the operations that do report failure
//! to a caller, which are configuration handling and the CLI.

use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::modules::zones::ActorError;

/// Errors that can occur during application execution.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum ZoneRouterError {
    /// Invalid command arguments.
    #[error("{0}")]
    InvalidArguments(String),
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// A zone id the current layout does not produce.
    #[error("Zone {0} does not exist")]
    ZoneNotFound(u32),
    /// Zone actor communication error.
    #[error("Actor error: {0}")]
    ActorError(String),
    /// IO error.
    #[error("IO error: {0}")]
    IoError(String),
    /// Generic command error.
    #[error("{0}")]
    CommandError(String),
}

impl From<std::io::Error> for ZoneRouterError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err.to_string()) }
}

impl From<serde_json::Error> for ZoneRouterError {
    fn from(err: serde_json::Error) -> Self { Self::CommandError(err.to_string()) }
}

impl From<ConfigError> for ZoneRouterError {
    fn from(err: ConfigError) -> Self { Self::ConfigError(err.to_string()) }
}

impl From<ActorError> for ZoneRouterError {
    fn from(err: ActorError) -> Self { Self::ActorError(err.to_string()) }
}

impl From<String> for ZoneRouterError {
    fn from(msg: String) -> Self { Self::CommandError(msg) }
}

impl From<&str> for ZoneRouterError {
    fn from(msg: &str) -> Self { Self::CommandError(msg.to_string()) }
}
