use std::path::PathBuf;

use shared_utils::config::ConfigError;
use thiserror::Error;

/// The unified error type for the `fx_rates_etl` crate.
///
/// Each pipeline step maps its failures onto one of these variants; nothing is
/// retried, so an `EtlError` always aborts the run.
#[derive(Debug, Error)]
pub enum EtlError {
    /// Missing or malformed configuration values.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The database refused the connection (network or authentication).
    #[error("Unable to connect to database at {target}")]
    Connection {
        /// `host:port/db_name`, never including credentials.
        target: String,
        source: diesel::ConnectionError,
    },

    /// A SQL fragment could not be read from disk.
    #[error("Unable to read SQL file {path}")]
    SchemaRead { path: PathBuf, source: std::io::Error },

    /// The database rejected a schema statement batch.
    #[error("Schema statements from {path} were rejected")]
    Schema {
        path: PathBuf,
        source: diesel::result::Error,
    },

    /// The HTTP request for the rates archive failed.
    #[error("Request to {url} failed")]
    Fetch { url: String, source: reqwest::Error },

    /// The rates endpoint answered with a non-success status.
    #[error("Request to {url} returned status {status}")]
    FetchStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The payload is not a readable ZIP archive.
    #[error("Invalid rates archive")]
    Archive(#[from] zip::result::ZipError),

    /// The archive holds no file entries.
    #[error("Rates archive contains no data file")]
    EmptyArchive,

    /// The extracted table does not have the expected shape or values.
    #[error("Malformed rates table: {0}")]
    Parse(String),

    /// Low-level CSV decoding/encoding failure.
    #[error("CSV error")]
    Csv(#[from] csv::Error),

    /// The local snapshot could not be written.
    #[error("Unable to write snapshot {path}")]
    Snapshot { path: PathBuf, source: std::io::Error },

    /// The rates upsert was rejected.
    #[error("Unable to write rates into {table}")]
    Write {
        table: String,
        source: diesel::result::Error,
    },

    /// The order conversion statement was rejected.
    #[error("Unable to convert orders in {table}")]
    Conversion {
        table: String,
        source: diesel::result::Error,
    },

    /// A table name is not a plain SQL identifier.
    #[error("Invalid table name: {0:?}")]
    InvalidTableName(String),
}

/// Result alias used across the crate.
pub type EtlResult<T> = Result<T, EtlError>;
