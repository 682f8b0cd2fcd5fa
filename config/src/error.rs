//! Error types for schema file operations.
//!
//! Covers reading files, decoding JSON or YAML, and turning the decoded
//! definitions into a field set or a raw query.

use thiserror::Error;

/// Errors that can occur while loading a schema or input file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// The file decoded but describes an unusable field set.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// An input file holds a value that cannot be a query parameter.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience alias for results with [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;
