//! Entur journey-planner HTTP client.
//!
//! Sends the departure board query for one stop place and converts the
//! response to a validated [`DepartureBoard`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tokio::sync::Semaphore;
use tracing::debug;

use crate::domain::StopId;

use super::convert::{DepartureBoard, parse_board};
use super::error::EnturError;
use super::query::DeparturesRequest;

/// Default GraphQL endpoint of the Entur journey planner.
const DEFAULT_BASE_URL: &str = "https://api.entur.io/journey-planner/v3/graphql";

/// Client identification header; Entur rejects unidentified clients.
const CLIENT_NAME_HEADER: &str = "et-client-name";

/// Default client name.
const DEFAULT_CLIENT_NAME: &str = "student/Bergen-app";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Configuration for the Entur client.
#[derive(Debug, Clone)]
pub struct EnturConfig {
    /// Value of the `ET-Client-Name` header
    pub client_name: String,
    /// GraphQL endpoint URL
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl EnturConfig {
    /// Create a new config with the given client name.
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 10,
        }
    }

    /// Set a custom endpoint URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n.max(1);
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for EnturConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CLIENT_NAME)
    }
}

/// Entur journey-planner client.
///
/// Uses a semaphore to bound concurrent upstream requests across all
/// callers, and a per-request timeout so a slow upstream surfaces as an
/// error instead of a hang.
#[derive(Debug, Clone)]
pub struct EnturClient {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl EnturClient {
    /// Create a new client with the given configuration.
    pub fn new(config: EnturConfig) -> Result<Self, EnturError> {
        let mut headers = HeaderMap::new();

        let client_name = HeaderValue::from_str(&config.client_name)
            .map_err(|_| EnturError::NotConfigured("invalid ET-Client-Name value".to_string()))?;
        headers.insert(HeaderName::from_static(CLIENT_NAME_HEADER), client_name);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    /// Fetch the departure board of a station.
    ///
    /// # Arguments
    ///
    /// * `station` - Stop place id to query
    /// * `time_range_secs` - How far ahead to look, in seconds
    /// * `max_departures` - Maximum number of estimated calls to return
    pub async fn fetch(
        &self,
        station: &StopId,
        time_range_secs: u32,
        max_departures: u32,
    ) -> Result<DepartureBoard, EnturError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| EnturError::NotConfigured("semaphore closed".to_string()))?;

        debug!(station = %station, time_range_secs, max_departures, "querying departure board");

        let response = self
            .http
            .post(&self.base_url)
            .json(&DeparturesRequest::new(station, time_range_secs, max_departures))
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(EnturError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EnturError::Status {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let body = response.text().await?;
        parse_board(station, &body)
    }
}
