//! Exchange-rate extraction.
//!
//! ## What this does
//! - Downloads the zipped daily publication through a [`source::RateSource`].
//! - Extracts the single CSV table it contains ([`archive::extract_table`]).
//! - Turns the table into a [`RateMap`] (currency code -> units per 1 EUR) with a
//!   synthetic `EUR = 1.0` entry.
//! - Writes a dated CSV snapshot of the raw table ([`snapshot::write_snapshot`]).
//!
//! ## Ordering
//! [`fetch_rates`] parses before it writes anything, so a malformed payload
//! fails without leaving a snapshot behind.

pub mod archive;
pub mod repo;
pub mod snapshot;
pub mod source;

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use tracing::{info, warn};

use crate::errors::{EtlError, EtlResult};
use crate::rates::source::RateSource;

/// Currency code -> rate, in publication column order.
pub type RateMap = IndexMap<String, f64>;

/// Base currency of the publication; always present with rate 1.0.
pub const EUR: &str = "EUR";

// pandas' default NA markers; the ECB uses "N/A" for suspended currencies.
const MISSING_MARKERS: [&str; 3] = ["N/A", "NA", "NaN"];

/// The raw publication: trimmed header names and its single data row.
///
/// Column 0 is the publication date, the remaining columns are currency codes.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    headers: Vec<String>,
    values: Vec<String>,
}

impl RateTable {
    /// Builds a table, trimming every header and value.
    pub fn new(headers: Vec<String>, values: Vec<String>) -> Self {
        let trim = |v: Vec<String>| v.into_iter().map(|s| s.trim().to_string()).collect();
        Self {
            headers: trim(headers),
            values: trim(values),
        }
    }

    /// Column names, including the date column and any blank names.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// The data row.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// First cell of the data row, e.g. `"18 October 2024"`.
    pub fn publication_date(&self) -> &str {
        self.values.first().map(String::as_str).unwrap_or_default()
    }

    /// [`Self::publication_date`] parsed with the ECB's `%d %B %Y` layout.
    pub fn published_on(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.publication_date(), "%d %B %Y").ok()
    }

    /// Builds the rate mapping.
    ///
    /// - Columns with blank names are skipped.
    /// - Blank or NA values are logged and skipped.
    /// - Anything else that is not a finite number fails with [`EtlError::Parse`].
    /// - `EUR` is set to exactly 1.0, replacing any published value.
    pub fn rates(&self) -> EtlResult<RateMap> {
        let mut rates = RateMap::with_capacity(self.headers.len());

        for (i, currency) in self.headers.iter().enumerate().skip(1) {
            if currency.is_empty() {
                continue;
            }

            let raw = self.values.get(i).map(String::as_str).unwrap_or_default();
            if raw.is_empty() || MISSING_MARKERS.iter().any(|m| raw.eq_ignore_ascii_case(m)) {
                warn!(currency = %currency, "Missing value, skipping");
                continue;
            }

            let rate = raw
                .parse::<f64>()
                .ok()
                .filter(|r| r.is_finite())
                .ok_or_else(|| {
                    EtlError::Parse(format!("rate for {currency} is not a number: {raw:?}"))
                })?;
            rates.insert(currency.clone(), rate);
        }

        rates.insert(EUR.to_string(), 1.0);
        Ok(rates)
    }
}

/// Outcome of a successful fetch.
#[derive(Debug, Clone)]
pub struct FetchedRates {
    /// Publication date exactly as printed in the source.
    pub publication_date: String,
    /// Currency code -> rate, including `EUR`.
    pub rates: RateMap,
    /// Where the raw table was saved.
    pub snapshot_path: PathBuf,
}

/// Fetch, parse and snapshot the latest publication.
///
/// `now` names the snapshot file and fills its `updated_at` column.
pub fn fetch_rates<S>(source: &S, export_dir: &Path, now: DateTime<Utc>) -> EtlResult<FetchedRates>
where
    S: RateSource + ?Sized,
{
    let payload = source.fetch_archive()?;
    let table = archive::extract_table(&payload)?;
    info!(date = table.publication_date(), "Extracted rates");

    let rates = table.rates()?;
    let snapshot_path = snapshot::write_snapshot(&table, export_dir, now)?;

    info!(count = rates.len(), "Successfully retrieved currency rates");
    Ok(FetchedRates {
        publication_date: table.publication_date().to_string(),
        rates,
        snapshot_path,
    })
}
