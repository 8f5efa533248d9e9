//! ZIP + CSV decoding of the daily publication.

use std::io::{Cursor, Read};

use csv::{ReaderBuilder, Trim};
use tracing::{error, warn};
use zip::ZipArchive;

use crate::errors::{EtlError, EtlResult};
use crate::rates::RateTable;

/// Opens `payload` as a ZIP archive and parses its first file as a [`RateTable`].
///
/// Directory entries are ignored. If the archive holds several files only the
/// first is read and a warning is logged.
pub fn extract_table(payload: &[u8]) -> EtlResult<RateTable> {
    let mut archive = ZipArchive::new(Cursor::new(payload)).map_err(|e| {
        error!(error = %e, "Error with the zip file format");
        EtlError::Archive(e)
    })?;

    let mut files = Vec::new();
    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        if !entry.is_dir() {
            files.push((i, entry.name().to_string()));
        }
    }

    let Some((index, name)) = files.first().cloned() else {
        return Err(EtlError::EmptyArchive);
    };
    if files.len() > 1 {
        warn!(
            used = %name,
            total = files.len(),
            "Archive holds more than one file, reading the first"
        );
    }

    let entry = archive.by_index(index)?;
    parse_table(entry)
}

/// Parses CSV text whose first row is the header and second row the only data row.
///
/// Rows may differ in length; cells are trimmed.
pub fn parse_table<R: Read>(reader: R) -> EtlResult<RateTable> {
    let mut csv = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut records = csv.records();
    let headers = records
        .next()
        .transpose()?
        .ok_or_else(|| EtlError::Parse("table is empty".to_string()))?;
    let values = records
        .next()
        .transpose()?
        .ok_or_else(|| EtlError::Parse("table has no data row".to_string()))?;

    Ok(RateTable::new(
        headers.iter().map(str::to_string).collect(),
        values.iter().map(str::to_string).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    use super::*;

    const ECB_CSV: &str = "Date, USD, JPY, BGN, CZK, \n18 October 2024, 1.0866, 162.55, 1.9558, 25.342, \n";

    fn zip_of(files: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = || SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, body) in files {
            if name.ends_with('/') {
                writer.add_directory(*name, options()).unwrap();
            } else {
                writer.start_file(*name, options()).unwrap();
                writer.write_all(body.as_bytes()).unwrap();
            }
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn reads_ecb_daily_file() {
        let table = extract_table(&zip_of(&[("eurofxref.csv", ECB_CSV)])).unwrap();

        assert_eq!(table.publication_date(), "18 October 2024");
        assert_eq!(table.headers()[1], "USD");
        assert_eq!(table.headers().last().map(String::as_str), Some(""));

        let rates = table.rates().unwrap();
        assert_eq!(rates.len(), 5);
        assert_eq!(rates["CZK"], 25.342);
        assert_eq!(rates["EUR"], 1.0);
    }

    #[test]
    fn first_file_wins_and_directories_are_skipped() {
        let payload = zip_of(&[
            ("data/", ""),
            ("a.csv", "Date,USD\n1 July 2024,1.07\n"),
            ("b.csv", "Date,USD\n2 July 2024,9.99\n"),
        ]);
        let table = extract_table(&payload).unwrap();
        assert_eq!(table.publication_date(), "1 July 2024");
    }

    #[test]
    fn garbage_is_an_archive_error() {
        let err = extract_table(b"<html>not a zip</html>").unwrap_err();
        assert!(matches!(err, EtlError::Archive(_)), "{err:?}");
    }

    #[test]
    fn archive_without_files_is_rejected() {
        let err = extract_table(&zip_of(&[("only-a-dir/", "")])).unwrap_err();
        assert!(matches!(err, EtlError::EmptyArchive), "{err:?}");
    }

    #[test]
    fn header_only_table_is_a_parse_error() {
        let err = parse_table("Date, USD\n".as_bytes()).unwrap_err();
        assert!(matches!(err, EtlError::Parse(_)), "{err:?}");

        let err = parse_table("".as_bytes()).unwrap_err();
        assert!(matches!(err, EtlError::Parse(_)), "{err:?}");
    }
}
