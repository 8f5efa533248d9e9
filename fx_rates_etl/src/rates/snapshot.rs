//! Dated CSV copy of the raw publication, kept for audit.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::errors::{EtlError, EtlResult};
use crate::rates::RateTable;

/// Column appended to the snapshot holding the run timestamp.
pub const UPDATED_AT_COLUMN: &str = "updated_at";

/// `eurofxref-YYYY-MM-DD.csv` for the day of `now`.
pub fn snapshot_file_name(now: DateTime<Utc>) -> String {
    format!("eurofxref-{}.csv", now.date_naive())
}

/// Writes `table` plus an `updated_at` column to `export_dir`, creating the directory if needed.
///
/// Returns the path written. An existing snapshot for the same day is replaced.
pub fn write_snapshot(table: &RateTable, export_dir: &Path, now: DateTime<Utc>) -> EtlResult<PathBuf> {
    let path = export_dir.join(snapshot_file_name(now));
    let io_err = |source: std::io::Error| {
        error!(path = %path.display(), error = %source, "Unable to write snapshot");
        EtlError::Snapshot {
            path: path.clone(),
            source,
        }
    };

    fs::create_dir_all(export_dir).map_err(io_err)?;
    let file = File::create(&path).map_err(io_err)?;

    let width = table.headers().len().max(table.values().len());
    let padded = |cells: &[String]| -> Vec<String> {
        let mut row = cells.to_vec();
        row.resize(width, String::new());
        row
    };

    let mut header = padded(table.headers());
    header.push(UPDATED_AT_COLUMN.to_string());
    let mut row = padded(table.values());
    row.push(now.format("%Y-%m-%d %H:%M:%S%.6f").to_string());

    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(&header)?;
    writer.write_record(&row)?;
    writer.flush().map_err(io_err)?;

    info!(path = %path.display(), "Saved rates snapshot");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn writes_dated_file_with_updated_at_column() {
        let dir = tempfile::tempdir().unwrap();
        let export = dir.path().join("data").join("exchange_rates");
        let now = Utc.with_ymd_and_hms(2024, 10, 18, 16, 5, 0).unwrap();
        let table = RateTable::new(
            vec!["Date".into(), "USD".into(), "".into()],
            vec!["18 October 2024".into(), "1.0866".into()],
        );

        let path = write_snapshot(&table, &export, now).unwrap();

        assert_eq!(path, export.join("eurofxref-2024-10-18.csv"));
        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Date,USD,,updated_at");
        assert_eq!(lines[1], "18 October 2024,1.0866,,2024-10-18 16:05:00.000000");
    }

    #[test]
    fn export_dir_blocked_by_a_file_is_a_snapshot_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("exports");
        fs::write(&blocker, "not a directory").unwrap();
        let table = RateTable::new(vec!["Date".into()], vec!["1 July 2024".into()]);

        let err = write_snapshot(&table, &blocker, Utc::now()).unwrap_err();
        assert!(matches!(err, EtlError::Snapshot { .. }), "{err:?}");
    }
}
