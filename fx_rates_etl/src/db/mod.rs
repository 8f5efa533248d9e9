//! Database utilities: connections, DDL fragments, and identifier validation.
//!
//! This module provides:
//! - [`connection::connect`] and [`connection::with_transaction`]: one scoped
//!   PostgreSQL connection per step.
//! - [`migrate::apply_schema_file`]: executes an idempotent `.sql` fragment.
//! - [`ident::TableName`]: table names that can be spliced into statements.
//!
//! Note: building with PostgreSQL support requires the system libpq (e.g., libpq-dev on Debian/Ubuntu).

pub mod connection;
pub mod ident;
pub mod migrate;
