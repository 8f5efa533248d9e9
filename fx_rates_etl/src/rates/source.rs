//! Where the zipped publication comes from.
//!
//! [`RateSource`] is the seam between the pipeline and the network: the binary
//! uses [`EcbZipSource`], tests hand in fixed payloads.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{error, info};

use crate::errors::{EtlError, EtlResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Supplier of the raw ZIP payload.
pub trait RateSource {
    /// Human-readable origin used in log lines.
    fn describe(&self) -> String;

    /// Downloads the archive bytes. One attempt, no retry.
    fn fetch_archive(&self) -> EtlResult<Vec<u8>>;
}

/// Blocking HTTP GET against the ECB (or any compatible) endpoint.
pub struct EcbZipSource {
    client: Client,
    url: String,
}

impl EcbZipSource {
    /// Creates a source with a default client (60 s timeout, system proxy settings).
    pub fn new(url: impl Into<String>) -> EtlResult<Self> {
        let url = url.into();
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| EtlError::Fetch {
                url: url.clone(),
                source,
            })?;
        Ok(Self::with_client(url, client))
    }

    /// Creates a source around a caller-configured client.
    pub fn with_client(url: impl Into<String>, client: Client) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Target URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl RateSource for EcbZipSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn fetch_archive(&self) -> EtlResult<Vec<u8>> {
        let fetch_err = |source: reqwest::Error| {
            error!(url = %self.url, error = %source, "Error downloading exchange rates zip");
            EtlError::Fetch {
                url: self.url.clone(),
                source,
            }
        };

        let response = self.client.get(&self.url).send().map_err(fetch_err)?;

        let status = response.status();
        if !status.is_success() {
            error!(url = %self.url, %status, "Exchange rates endpoint refused the request");
            return Err(EtlError::FetchStatus {
                url: self.url.clone(),
                status,
            });
        }

        let body = response.bytes().map_err(fetch_err)?;
        info!(bytes = body.len(), "Downloaded exchange rates archive");
        Ok(body.to_vec())
    }
}
