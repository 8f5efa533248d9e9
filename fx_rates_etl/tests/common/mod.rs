#![allow(dead_code)]

use std::io::{Cursor, Read, Write};
use std::net::TcpListener;
use std::thread;

use fx_rates_etl::config::DbConfig;
use fx_rates_etl::errors::EtlResult;
use fx_rates_etl::rates::source::RateSource;
use shared_utils::env::get_env_var;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Trimmed-down copy of the ECB daily file, trailing separator included.
pub const ECB_CSV: &str = "Date, USD, JPY, GBP, \n18 October 2024, 2.0, 162.55, 0.8318, \n";

/// A source that always returns the same payload.
pub struct StaticSource(pub Vec<u8>);

impl RateSource for StaticSource {
    fn describe(&self) -> String {
        "static test payload".to_string()
    }

    fn fetch_archive(&self) -> EtlResult<Vec<u8>> {
        Ok(self.0.clone())
    }
}

pub fn zip_csv(name: &str, csv: &str) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file(name, SimpleFileOptions::default())
        .expect("start file");
    writer.write_all(csv.as_bytes()).expect("write csv");
    writer.finish().expect("finish zip").into_inner()
}

/// Serves one HTTP response on a loopback port and returns the URL to request.
pub fn serve_once(status_line: &'static str, body: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");

    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut request = [0u8; 4096];
            let _ = stream.read(&mut request);
            let head = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/zip\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(&body);
            let _ = stream.flush();
        }
    });

    format!("http://{addr}/stats/eurofxref/eurofxref.zip")
}

/// Client that ignores proxy settings so loopback requests stay local.
pub fn direct_client() -> reqwest::blocking::Client {
    reqwest::blocking::Client::builder()
        .no_proxy()
        .build()
        .expect("client")
}

/// Scratch database from `FX_ETL_TEST_PUBLIC_IP`, `FX_ETL_TEST_PORT`, `FX_ETL_TEST_DB_NAME`,
/// `FX_ETL_TEST_USER_NAME` and `FX_ETL_TEST_PASSWORD`; `None` when not configured.
pub fn test_db() -> Option<DbConfig> {
    let db = DbConfig::from_lookup(|key| {
        get_env_var(&format!("FX_ETL_TEST_{}", key.to_uppercase())).ok()
    });
    match db {
        Ok(db) => Some(db),
        Err(e) => {
            println!("Skipping: test database not configured ({e})");
            None
        }
    }
}
