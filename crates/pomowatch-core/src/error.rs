//! Core error types for pomowatch-core.
//!
//! Engine transitions never fail; errors only come from the configuration
//! layer, the async driver and the scripted simulator.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomowatch-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The driver task has stopped and can no longer accept commands
    #[error("Timer driver is not running")]
    DriverStopped,

    /// A simulation script could not be parsed
    #[error("Invalid script step '{step}': {message}")]
    Script { step: String, message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// No home/config directory could be resolved
    #[error("Could not determine configuration directory")]
    NoConfigDir,
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for CoreError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        CoreError::DriverStopped
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for CoreError {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        CoreError::DriverStopped
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
