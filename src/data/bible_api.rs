//! bible-api.com client
//!
//! This module provides the remote side of the verse cache: a `VerseFetcher`
//! trait that the cache policies call on a miss, and `BibleApiClient`, the
//! HTTP implementation of it. The client is stateless apart from its HTTP
//! connection pool and never retries.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use thiserror::Error;
use tracing::debug;

use super::VerseResponse;

/// Base URL for the Bible API
pub const BIBLE_API_BASE_URL: &str = "https://bible-api.com";

/// Per-request timeout for API calls
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Errors that can occur when fetching verses
#[derive(Debug, Error)]
pub enum FetchError {
    /// The reference did not resolve to any passage (HTTP 404)
    #[error("Verse not found. Try a reference like John 3:16.")]
    NotFound,

    /// The API answered with a status other than 200 or 404
    #[error("Server returned HTTP {status}.")]
    Http {
        /// Status code returned by the server
        status: u16,
    },

    /// The request could not be sent or the body could not be read
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body was not a valid verse payload
    #[error("Failed to decode response: {0}")]
    Decoding(#[from] serde_json::Error),

    /// The request URL could not be built from the base URL and reference
    #[error("Invalid URL for the request: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Message suitable for showing to a user
    ///
    /// A not-found reference gets a hint instead of a generic error, so it
    /// reads differently from being offline.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::NotFound => "Verse not found. Try e.g. John 3:16".to_string(),
            other => other.to_string(),
        }
    }
}

/// Source of verses consulted by the cache on a miss
///
/// Implementations must not cache; the policies in `crate::cache` decide
/// when to call them.
pub trait VerseFetcher: Send + Sync {
    /// Fetches the passage named by `reference` in `translation`
    fn fetch_by_reference(
        &self,
        reference: &str,
        translation: &str,
    ) -> impl Future<Output = Result<VerseResponse, FetchError>> + Send;

    /// Fetches a random verse in `translation`; never fails with `NotFound`
    fn fetch_random(
        &self,
        translation: &str,
    ) -> impl Future<Output = Result<VerseResponse, FetchError>> + Send;
}

/// Client for fetching verses from bible-api.com
#[derive(Debug, Clone)]
pub struct BibleApiClient {
    client: Client,
    base_url: String,
}

impl Default for BibleApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl BibleApiClient {
    /// Creates a client for the public API with a request timeout
    pub fn new() -> Self {
        Self::with_base_url(BIBLE_API_BASE_URL)
    }

    /// Creates a client that talks to a different host (mirrors, tests)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Creates a client with a custom HTTP client
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Builds `{base}/{percent-encoded reference}?translation={id}`
    fn reference_url(&self, reference: &str, translation: &str) -> Result<Url, FetchError> {
        let mut url = self.parse_base()?;
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push(reference);
        url.query_pairs_mut().append_pair("translation", translation);
        Ok(url)
    }

    /// Builds `{base}/?random=verse&translation={id}`
    fn random_url(&self, translation: &str) -> Result<Url, FetchError> {
        let mut url = self.parse_base()?;
        url.query_pairs_mut()
            .append_pair("random", "verse")
            .append_pair("translation", translation);
        Ok(url)
    }

    fn parse_base(&self) -> Result<Url, FetchError> {
        Url::parse(&self.base_url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", self.base_url, e)))
    }

    /// Sends a GET request and decodes a verse payload from it
    async fn perform_request(&self, url: Url) -> Result<VerseResponse, FetchError> {
        debug!(%url, "Requesting verse");
        let response = self.client.get(url).send().await?;
        check_status(response.status())?;
        let text = response.text().await?;
        decode_body(&text)
    }
}

impl VerseFetcher for BibleApiClient {
    async fn fetch_by_reference(
        &self,
        reference: &str,
        translation: &str,
    ) -> Result<VerseResponse, FetchError> {
        let url = self.reference_url(reference, translation)?;
        self.perform_request(url).await
    }

    async fn fetch_random(&self, translation: &str) -> Result<VerseResponse, FetchError> {
        let url = self.random_url(translation)?;
        self.perform_request(url).await
    }
}

/// Maps an HTTP status to the fetch error taxonomy; only 200 is success
fn check_status(status: StatusCode) -> Result<(), FetchError> {
    match status {
        StatusCode::OK => Ok(()),
        StatusCode::NOT_FOUND => Err(FetchError::NotFound),
        other => Err(FetchError::Http {
            status: other.as_u16(),
        }),
    }
}

/// Decodes a response body into a VerseResponse
fn decode_body(body: &str) -> Result<VerseResponse, FetchError> {
    Ok(serde_json::from_str(body)?)
}
