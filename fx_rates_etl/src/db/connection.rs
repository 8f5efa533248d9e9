//! PostgreSQL connection helpers.
//!
//! Every database step owns its connection for the duration of one transaction:
//! open, run, commit, drop. Dropping a [`PgConnection`] closes it, so release
//! happens on every exit path; an `Err` from the closure rolls the transaction
//! back before that.
//!
//! Example:
//! ```no_run
//! use diesel::connection::SimpleConnection;
//! use fx_rates_etl::config::DbConfig;
//! use fx_rates_etl::db::connection::with_transaction;
//!
//! let db = DbConfig::from_env_file(".env").expect("config");
//! with_transaction(&db, |conn| conn.batch_execute("SELECT 1")).expect("query");
//! ```

use diesel::{Connection, PgConnection};
use tracing::{debug, error};

use crate::config::DbConfig;
use crate::errors::{EtlError, EtlResult};

/// Open an authenticated connection.
pub fn connect(db: &DbConfig) -> EtlResult<PgConnection> {
    debug!(target = %db.target(), "opening database connection");
    PgConnection::establish(&db.connection_string()).map_err(|source| {
        error!(target = %db.target(), error = %source, "Error connecting to the database");
        EtlError::Connection {
            target: db.target(),
            source,
        }
    })
}

/// Run `f` inside a transaction on a fresh connection, committing on `Ok`.
///
/// Connection failures come back as [`TxError::Connect`], anything raised by `f`
/// (or by the commit) as [`TxError::Query`].
pub fn with_transaction<T, F>(db: &DbConfig, f: F) -> Result<T, TxError>
where
    F: FnOnce(&mut PgConnection) -> diesel::QueryResult<T>,
{
    let mut conn = connect(db).map_err(TxError::Connect)?;
    conn.transaction(f).map_err(TxError::Query)
}

/// Failure of [`with_transaction`]: either the connection or the work inside it.
#[derive(Debug)]
pub enum TxError {
    /// The connection could not be opened.
    Connect(EtlError),
    /// The closure (or commit) failed; the transaction was rolled back.
    Query(diesel::result::Error),
}

impl TxError {
    /// Map a query failure into a step-specific error, keeping connection errors as-is.
    pub fn into_etl(self, on_query: impl FnOnce(diesel::result::Error) -> EtlError) -> EtlError {
        match self {
            TxError::Connect(e) => e,
            TxError::Query(e) => on_query(e),
        }
    }
}
