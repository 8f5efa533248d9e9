//! Daily ECB exchange-rate ETL.
//!
//! Downloads the zipped reference-rate publication, stores the rates in PostgreSQL,
//! and recomputes `converted_amount_eur` on the orders table. See [`pipeline::Pipeline`]
//! for the end-to-end sequence.

pub mod config;
pub mod convert;
pub mod db;
pub mod errors;
pub mod logging;
pub mod pipeline;
pub mod rates;
