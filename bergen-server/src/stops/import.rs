//! GTFS static feed import.
//!
//! Downloads the aggregated GTFS archive, extracts `stops.txt` and parses it
//! into [`Stop`] records.

use std::io::{Cursor, Read};
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::domain::{Stop, StopId};

use super::error::StopImportError;

/// Default feed: Entur's aggregated GTFS for Skyss (Vestland).
const DEFAULT_FEED_URL: &str =
    "https://storage.googleapis.com/marduk-production/outbound/gtfs/rb_sky-aggregated-gtfs.zip";

/// Longest wait between download attempts.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Configuration for the feed importer.
#[derive(Debug, Clone)]
pub struct GtfsImporterConfig {
    /// URL of the GTFS zip archive
    pub feed_url: String,
    /// User-Agent sent with the download
    pub user_agent: String,
    /// Download timeout in seconds (the archive is large)
    pub timeout_secs: u64,
    /// Number of download attempts before giving up
    pub max_attempts: u32,
    /// Delay before the first retry; doubled on each further retry
    pub initial_backoff: Duration,
}

impl GtfsImporterConfig {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            user_agent: user_agent.into(),
            timeout_secs: 600,
            max_attempts: 5,
            initial_backoff: Duration::from_secs(1),
        }
    }

    /// Set a custom feed URL.
    pub fn with_feed_url(mut self, url: impl Into<String>) -> Self {
        self.feed_url = url.into();
        self
    }

    pub fn with_max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n.max(1);
        self
    }
}

/// Downloads and parses the stop feed.
#[derive(Debug, Clone)]
pub struct GtfsImporter {
    http: reqwest::Client,
    config: GtfsImporterConfig,
}

impl GtfsImporter {
    pub fn new(config: GtfsImporterConfig) -> Result<Self, StopImportError> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&config.user_agent).map_err(|_| {
            StopImportError::Archive {
                message: "invalid User-Agent header value".to_string(),
            }
        })?;
        headers.insert(USER_AGENT, agent);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, config })
    }

    pub fn feed_url(&self) -> &str {
        &self.config.feed_url
    }

    /// Download the feed (with retries) and parse its stops.
    pub async fn fetch_stops(&self) -> Result<Vec<Stop>, StopImportError> {
        let archive = self.download_with_retry().await?;
        info!(bytes = archive.len(), "downloaded GTFS archive");

        let stops = tokio::task::spawn_blocking(move || {
            let csv = extract_stops_txt(&archive)?;
            parse_stops(csv.as_slice())
        })
        .await
        .map_err(|e| StopImportError::Archive {
            message: format!("parse task failed: {e}"),
        })??;

        if stops.is_empty() {
            return Err(StopImportError::EmptyFeed);
        }

        info!(count = stops.len(), "parsed stops from GTFS feed");
        Ok(stops)
    }

    async fn download_with_retry(&self) -> Result<Vec<u8>, StopImportError> {
        let mut delay = self.config.initial_backoff;
        let mut attempt = 1;

        loop {
            match self.download().await {
                Ok(bytes) => return Ok(bytes),
                Err(e) if attempt < self.config.max_attempts => {
                    warn!(
                        attempt,
                        max_attempts = self.config.max_attempts,
                        retry_in_secs = delay.as_secs_f32(),
                        error = %e,
                        "GTFS download failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(MAX_BACKOFF);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn download(&self) -> Result<Vec<u8>, StopImportError> {
        debug!(url = %self.config.feed_url, "downloading GTFS archive");

        let response = self.http.get(&self.config.feed_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StopImportError::Status {
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Pull `stops.txt` out of a GTFS zip archive.
pub fn extract_stops_txt(archive: &[u8]) -> Result<Vec<u8>, StopImportError> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive)).map_err(|e| {
        StopImportError::Archive {
            message: e.to_string(),
        }
    })?;

    let mut entry = match zip.by_name("stops.txt") {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => {
            return Err(StopImportError::Archive {
                message: "stops.txt not found in archive".to_string(),
            });
        }
        Err(e) => {
            return Err(StopImportError::Archive {
                message: e.to_string(),
            });
        }
    };

    let mut buf = Vec::new();
    entry
        .read_to_end(&mut buf)
        .map_err(|e| StopImportError::Archive {
            message: format!("failed to read stops.txt: {e}"),
        })?;
    Ok(buf)
}

/// A `stops.txt` row. Columns are matched by header, so order and
/// optional columns don't matter.
#[derive(Debug, Deserialize)]
struct StopRow {
    stop_id: String,
    #[serde(default)]
    stop_name: String,
    #[serde(default)]
    stop_lat: Option<String>,
    #[serde(default)]
    stop_lon: Option<String>,
    #[serde(default)]
    stop_desc: Option<String>,
    #[serde(default)]
    location_type: Option<String>,
    #[serde(default)]
    parent_station: Option<String>,
    #[serde(default)]
    wheelchair_boarding: Option<String>,
    #[serde(default)]
    vehicle_type: Option<String>,
    #[serde(default)]
    platform_code: Option<String>,
}

/// Treat empty cells as absent.
fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Missing or unparseable coordinates become 0.0; the stop is still usable
/// for name lookups.
fn coordinate(cell: Option<String>) -> f64 {
    non_empty(cell).and_then(|c| c.parse().ok()).unwrap_or(0.0)
}

/// Parse `stops.txt` contents. Rows that fail to parse or carry an invalid
/// `stop_id` are skipped and logged.
pub fn parse_stops<R: Read>(reader: R) -> Result<Vec<Stop>, StopImportError> {
    let mut csv = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut stops = Vec::new();
    let mut skipped = 0usize;

    for (line, row) in csv.deserialize::<StopRow>().enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                skipped += 1;
                debug!(line = line + 2, error = %e, "skipping unparseable stops.txt row");
                continue;
            }
        };

        let Ok(stop_id) = StopId::parse(&row.stop_id) else {
            skipped += 1;
            debug!(line = line + 2, stop_id = %row.stop_id, "skipping row with invalid stop_id");
            continue;
        };

        let parent_station = match non_empty(row.parent_station) {
            Some(p) => match StopId::parse(&p) {
                Ok(p) => Some(p),
                Err(_) => {
                    skipped += 1;
                    debug!(line = line + 2, parent = %p, "skipping row with invalid parent_station");
                    continue;
                }
            },
            None => None,
        };

        stops.push(Stop {
            stop_id,
            stop_name: row.stop_name,
            stop_lat: coordinate(row.stop_lat),
            stop_lon: coordinate(row.stop_lon),
            stop_desc: non_empty(row.stop_desc),
            location_type: non_empty(row.location_type),
            parent_station,
            wheelchair_boarding: non_empty(row.wheelchair_boarding),
            vehicle_type: non_empty(row.vehicle_type),
            platform_code: non_empty(row.platform_code),
        });
    }

    if skipped > 0 {
        warn!(skipped, "skipped malformed stops.txt rows");
    }

    Ok(stops)
}
