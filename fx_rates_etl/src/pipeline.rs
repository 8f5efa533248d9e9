//! The end-to-end run: fetch → schema → write → schema → convert.
//!
//! Straight-line, no retries: the first failing step aborts the rest. Rows committed
//! by earlier steps stay committed.

use std::path::PathBuf;

use chrono::Utc;
use tracing::info;

use crate::config::PipelineConfig;
use crate::convert::convert_order_amounts;
use crate::db::migrate::apply_schema_file;
use crate::errors::EtlResult;
use crate::rates::{fetch_rates, repo::write_rates, source::RateSource};

/// What a completed run did.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Publication date as printed by the source.
    pub publication_date: String,
    /// Entries in the rate mapping, including EUR.
    pub rates_fetched: usize,
    /// Rows inserted or updated in the rates table.
    pub rates_written: usize,
    /// Orders whose converted amount was recomputed.
    pub orders_converted: usize,
    /// Location of the CSV snapshot.
    pub snapshot_path: PathBuf,
}

/// One configured run.
pub struct Pipeline<S> {
    config: PipelineConfig,
    source: S,
}

impl<S: RateSource> Pipeline<S> {
    /// Pairs a configuration with the source to download from.
    pub fn new(config: PipelineConfig, source: S) -> Self {
        Self { config, source }
    }

    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Executes every step in order.
    pub fn run(&self) -> EtlResult<RunSummary> {
        let cfg = &self.config;

        info!(source = %self.source.describe(), "Extracting latest rates ...");
        let fetched = fetch_rates(&self.source, &cfg.export_dir, Utc::now())?;
        info!(rates = ?fetched.rates, "Retrieved rates");

        info!(file = %cfg.rates_schema_file, "Setting up schema ...");
        apply_schema_file(&cfg.db, &cfg.schema_dir, &cfg.rates_schema_file)?;

        info!(table = %cfg.rates_table, "Writing rates to table ...");
        let rates_written = write_rates(&cfg.db, &cfg.rates_table, &fetched.rates)?;

        info!(file = %cfg.orders_schema_file, "Update schema before converting ...");
        apply_schema_file(&cfg.db, &cfg.schema_dir, &cfg.orders_schema_file)?;

        info!(table = %cfg.orders_table, "Converting order values to EUR ...");
        let orders_converted = convert_order_amounts(&cfg.db, &cfg.orders_table, &cfg.rates_table)?;

        info!("Done!");
        Ok(RunSummary {
            publication_date: fetched.publication_date,
            rates_fetched: fetched.rates.len(),
            rates_written,
            orders_converted,
            snapshot_path: fetched.snapshot_path,
        })
    }
}
