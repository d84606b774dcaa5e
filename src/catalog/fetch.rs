//! Remote version manifest retrieval

use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use ssb_streams::{Document, ProductManifest, StreamsError};
use tracing::debug;

use crate::config::FetchSettings;

/// Errors for remote manifest fetches
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected status {status} from {url}")]
    Status { url: String, status: StatusCode },

    #[error("Failed to read response from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid manifest at {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: StreamsError,
    },
}

/// Blocking fetcher for remote `ssb.json` documents.
///
/// No retries: a failed fetch leaves the product out of the catalog.
#[derive(Debug, Clone)]
pub struct ManifestFetcher {
    client: Client,
    authorization: Option<String>,
}

impl ManifestFetcher {
    /// Build a fetcher honouring the timeout, TLS and credential settings.
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .danger_accept_invalid_certs(settings.insecure_skip_verify)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            authorization: settings.authorization(),
        })
    }

    /// GET and parse the manifest at `url`.
    pub fn fetch(&self, url: &str) -> Result<ProductManifest, FetchError> {
        debug!(url, "fetching remote manifest");

        let mut request = self.client.get(url);
        if let Some(auth) = &self.authorization {
            request = request.header(AUTHORIZATION, auth);
        }

        let response = request.send().map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })?;

        ProductManifest::from_slice(&body).map_err(|source| FetchError::Parse {
            url: url.to_string(),
            source,
        })
    }
}
