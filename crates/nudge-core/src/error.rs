//! Core error types for nudge-core.
//!
//! Decision paths (signals, show/hide, timers) never fail; these errors only
//! come out of the I/O edges: throttle stores, the config file and stats
//! sources. Callers at those edges degrade instead of propagating.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for nudge-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Throttle store errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Stats messaging errors
    #[error("Messaging error: {0}")]
    Messaging(#[from] MessagingError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by a [`ThrottleStore`](crate::throttle::ThrottleStore).
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backing file could not be read or written
    #[error("Storage I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Backing file holds something that is not a string map
    #[error("Storage file {path} is corrupt: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Store cannot be reached at all (no data dir, quota, disabled)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
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

    /// Key does not exist in the config tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Errors from the stats query channel.
#[derive(Error, Debug)]
pub enum MessagingError {
    /// Receiving end not injected yet, or reloaded mid-request
    #[error("Receiver not ready: {0}")]
    ReceiverNotReady(String),

    /// Transport failed
    #[error("Transport failed: {0}")]
    Transport(String),

    /// Response did not match the stats contract
    #[error("Malformed stats response: {0}")]
    Malformed(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
