//! Error types for Ledge.
//!
//! The dock engine itself has no error channel; missing host data degrades to
//! a no-op. These types cover the ambient surfaces around it: configuration,
//! scenario files, the actor runtime and the CLI.

use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::runtime::ActorError;

/// Errors that can occur during application execution.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum LedgeError {
    /// Invalid command arguments.
    #[error("{0}")]
    InvalidArguments(String),
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// IO error.
    #[error("IO error: {0}")]
    IoError(String),
    /// A scenario or topology file could not be parsed.
    #[error("Scenario error: {0}")]
    ScenarioError(String),
    /// The dock runtime failed to respond.
    #[error("Runtime error: {0}")]
    RuntimeError(String),
}

impl From<std::io::Error> for LedgeError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err.to_string()) }
}

impl From<serde_json::Error> for LedgeError {
    fn from(err: serde_json::Error) -> Self { Self::ScenarioError(err.to_string()) }
}

impl From<ConfigError> for LedgeError {
    fn from(err: ConfigError) -> Self { Self::ConfigError(err.to_string()) }
}

impl From<ActorError> for LedgeError {
    fn from(err: ActorError) -> Self { Self::RuntimeError(err.to_string()) }
}

impl From<String> for LedgeError {
    fn from(msg: String) -> Self { Self::InvalidArguments(msg) }
}

impl From<&str> for LedgeError {
    fn from(msg: &str) -> Self { Self::InvalidArguments(msg.to_string()) }
}
