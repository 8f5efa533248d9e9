use std::path::PathBuf;

use thiserror::Error;

/// Errors related to application configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The env file could not be opened or contains a malformed line.
    #[error("Unable to read env file {path}: {source}")]
    Unreadable {
        /// Path of the env file.
        path: PathBuf,
        /// Underlying parse or I/O error.
        source: dotenvy::Error,
    },

    /// A key required by the application is not present.
    #[error("Missing configuration key: {0}")]
    MissingKey(String),

    /// A key is present but its value cannot be used.
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue {
        /// The offending key.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },
}
