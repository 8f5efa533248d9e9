//! Apply idempotent DDL fragments.
//!
//! The fragments live as plain `.sql` files (see `sql/schemas/`) and are executed
//! verbatim on every run, so each statement must tolerate already having been
//! applied (`CREATE TABLE IF NOT EXISTS`, `ADD COLUMN IF NOT EXISTS`).

use std::path::Path;

use diesel::connection::SimpleConnection;
use tracing::{error, info};

use crate::config::DbConfig;
use crate::db::connection::with_transaction;
use crate::errors::{EtlError, EtlResult};

/// Read a SQL file, logging where it came from.
pub fn read_sql_file(path: &Path) -> EtlResult<String> {
    info!(path = %path.display(), "Reading SQL file");
    std::fs::read_to_string(path).map_err(|source| {
        error!(path = %path.display(), error = %source, "SQL file could not be read");
        EtlError::SchemaRead {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Executes `schema_dir/file_name` as one statement batch in its own transaction.
///
/// The file is read before any connection is opened. On rejection the
/// transaction is rolled back and [`EtlError::Schema`] returned.
pub fn apply_schema_file(db: &DbConfig, schema_dir: &Path, file_name: &str) -> EtlResult<()> {
    let path = schema_dir.join(file_name);
    let sql = read_sql_file(&path)?;

    with_transaction(db, |conn| conn.batch_execute(&sql)).map_err(|e| {
        e.into_etl(|source| {
            error!(path = %path.display(), error = %source, "Error running schema file");
            EtlError::Schema {
                path: path.clone(),
                source,
            }
        })
    })?;

    info!(file = file_name, "Successfully updated schema");
    Ok(())
}
