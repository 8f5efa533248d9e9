//! Upsert and read back persisted rates.
//!
//! The target table is expected to look like `sql/schemas/ecb_exchange_rates.sql`:
//! `currency_code` primary key, `rate DOUBLE PRECISION`, `updated_at TIMESTAMP`.

use chrono::{NaiveDateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Double, Text, Timestamp};
use tracing::{error, info};

use crate::config::DbConfig;
use crate::db::connection::with_transaction;
use crate::db::ident::TableName;
use crate::errors::{EtlError, EtlResult};
use crate::rates::RateMap;

/// One persisted rate.
#[derive(Debug, Clone, PartialEq, QueryableByName)]
pub struct StoredRate {
    /// ISO currency code.
    #[diesel(sql_type = Text)]
    pub currency_code: String,
    /// Units of currency per 1 EUR.
    #[diesel(sql_type = Double)]
    pub rate: f64,
    /// When this rate was last written.
    #[diesel(sql_type = Timestamp)]
    pub updated_at: NaiveDateTime,
}

/// `INSERT .. VALUES ($1,$2,$3), .. ON CONFLICT (currency_code) DO UPDATE ..` for `rows` rows.
pub fn upsert_statement(table: &TableName, rows: usize) -> String {
    let values = (0..rows)
        .map(|i| {
            let base = i * 3;
            format!("(${}, ${}, ${})", base + 1, base + 2, base + 3)
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {table} (currency_code, rate, updated_at) VALUES {values} \
         ON CONFLICT (currency_code) \
         DO UPDATE SET rate = EXCLUDED.rate, updated_at = EXCLUDED.updated_at"
    )
}

/// Single bulk upsert of every entry in `rates`, each stamped with `at`.
///
/// Rows for other currencies and columns other than `rate`/`updated_at` are untouched.
/// Returns the number of rows inserted or updated.
pub fn upsert_rates(
    conn: &mut PgConnection,
    table: &TableName,
    rates: &RateMap,
    at: NaiveDateTime,
) -> QueryResult<usize> {
    if rates.is_empty() {
        return Ok(0);
    }

    let mut query = sql_query(upsert_statement(table, rates.len())).into_boxed::<Pg>();
    for (code, rate) in rates {
        query = query
            .bind::<Text, _>(code.clone())
            .bind::<Double, _>(*rate)
            .bind::<Timestamp, _>(at);
    }
    query.execute(conn)
}

/// Scoped variant of [`upsert_rates`]: own connection, own transaction, current UTC time.
pub fn write_rates(db: &DbConfig, table: &TableName, rates: &RateMap) -> EtlResult<usize> {
    let at = Utc::now().naive_utc();

    let written = with_transaction(db, |conn| upsert_rates(conn, table, rates, at)).map_err(|e| {
        e.into_etl(|source| {
            error!(%table, error = %source, "Error saving rates to database");
            EtlError::Write {
                table: table.to_string(),
                source,
            }
        })
    })?;

    info!(count = written, %table, "Successfully wrote rates");
    Ok(written)
}

/// All rows of `table`, ordered by currency code.
pub fn load_rates(conn: &mut PgConnection, table: &TableName) -> QueryResult<Vec<StoredRate>> {
    sql_query(format!(
        "SELECT currency_code::TEXT AS currency_code, rate, updated_at FROM {table} ORDER BY currency_code"
    ))
    .load(conn)
}
