//! Recompute `converted_amount_eur` on the orders table from stored rates.
//!
//! The join is inner: orders whose currency has no stored rate keep whatever
//! `converted_amount_eur` they already had.

use diesel::prelude::*;
use diesel::sql_query;
use tracing::{error, info};

use crate::config::DbConfig;
use crate::db::connection::with_transaction;
use crate::db::ident::TableName;
use crate::errors::{EtlError, EtlResult};

/// The conversion `UPDATE .. FROM` statement.
///
/// EUR orders get `revenue - order_discount`; everything else is divided by the rate.
pub fn conversion_statement(orders: &TableName, rates: &TableName) -> String {
    format!(
        "UPDATE {orders} AS o \
         SET converted_amount_eur = \
             CASE \
                 WHEN o.currency_code = 'EUR' THEN (o.revenue - o.order_discount) \
                 ELSE (o.revenue - o.order_discount) / er.rate \
             END \
         FROM {rates} AS er \
         WHERE o.currency_code = er.currency_code"
    )
}

/// Runs the conversion on an existing connection. Returns the number of orders updated.
pub fn convert_orders(
    conn: &mut PgConnection,
    orders: &TableName,
    rates: &TableName,
) -> QueryResult<usize> {
    sql_query(conversion_statement(orders, rates)).execute(conn)
}

/// Scoped variant of [`convert_orders`] with its own connection and transaction.
pub fn convert_order_amounts(
    db: &DbConfig,
    orders: &TableName,
    rates: &TableName,
) -> EtlResult<usize> {
    let updated = with_transaction(db, |conn| convert_orders(conn, orders, rates)).map_err(|e| {
        e.into_etl(|source| {
            error!(%orders, error = %source, "Failed to convert orders");
            EtlError::Conversion {
                table: orders.to_string(),
                source,
            }
        })
    })?;

    info!(count = updated, %orders, "Converted order amounts to EUR");
    Ok(updated)
}
