//! Bergen Bysykkel GBFS proxy.
//!
//! GBFS splits a station across two feeds: `station_information` (name,
//! position, capacity) and `station_status` (bikes and docks available).
//! The dashboard wants them joined on `station_id`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use serde_json::{Map, Value};
use tracing::debug;

use super::error::ProxyError;
use super::{get_json, http_client};

const DEFAULT_STATUS_URL: &str =
    "https://gbfs.urbansharing.com/bergenbysykkel.no/station_status.json";
const DEFAULT_INFORMATION_URL: &str =
    "https://gbfs.urbansharing.com/bergenbysykkel.no/station_information.json";

const UPSTREAM: &str = "GBFS";

/// Configuration for the bike-share proxy.
#[derive(Debug, Clone)]
pub struct BikeConfig {
    pub user_agent: String,
    pub status_url: String,
    pub information_url: String,
    /// How long a merged station list is served from cache.
    pub ttl: Duration,
    pub timeout: Duration,
}

impl BikeConfig {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            status_url: DEFAULT_STATUS_URL.to_string(),
            information_url: DEFAULT_INFORMATION_URL.to_string(),
            ttl: Duration::from_secs(60),
            timeout: Duration::from_secs(10),
        }
    }

    /// Point both feeds at a different GBFS root (for testing).
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.status_url = format!("{base}/station_status.json");
        self.information_url = format!("{base}/station_information.json");
        self
    }
}

/// Fetches and joins the two GBFS station feeds.
pub struct BikeClient {
    http: reqwest::Client,
    config: BikeConfig,
    stations: MokaCache<(), Arc<Vec<Value>>>,
}

impl BikeClient {
    pub fn new(config: BikeConfig) -> Result<Self, ProxyError> {
        let http = http_client(&config.user_agent, config.timeout)?;
        let stations = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(1)
            .build();

        Ok(Self {
            http,
            config,
            stations,
        })
    }

    /// Merged station list, from cache when fresh.
    pub async fn stations(&self) -> Result<Arc<Vec<Value>>, ProxyError> {
        if let Some(cached) = self.stations.get(&()).await {
            return Ok(cached);
        }

        let (status, information) = tokio::try_join!(
            get_json(&self.http, UPSTREAM, &self.config.status_url),
            get_json(&self.http, UPSTREAM, &self.config.information_url),
        )?;

        let merged = Arc::new(merge_stations(&status, &information)?);
        debug!(stations = merged.len(), "bike stations refreshed");

        self.stations.insert((), Arc::clone(&merged)).await;
        Ok(merged)
    }
}

/// Join GBFS status and information feeds on `station_id`.
///
/// One entry per status station, in status order. Fields from the status
/// feed win over information fields of the same name. Status stations with
/// no information entry are passed through as they are.
pub fn merge_stations(status: &Value, information: &Value) -> Result<Vec<Value>, ProxyError> {
    let status_stations = feed_stations(status, "station_status")?;
    let info_stations = feed_stations(information, "station_information")?;

    let info_by_id: HashMap<&str, &Map<String, Value>> = info_stations
        .iter()
        .filter_map(|s| {
            let obj = s.as_object()?;
            Some((obj.get("station_id")?.as_str()?, obj))
        })
        .collect();

    Ok(status_stations
        .iter()
        .map(|station| {
            let Some(obj) = station.as_object() else {
                return station.clone();
            };

            let mut merged = obj
                .get("station_id")
                .and_then(Value::as_str)
                .and_then(|id| info_by_id.get(id))
                .map(|info| (*info).clone())
                .unwrap_or_default();

            for (k, v) in obj {
                merged.insert(k.clone(), v.clone());
            }
            Value::Object(merged)
        })
        .collect())
}

/// The `data.stations` array of a GBFS feed.
fn feed_stations<'a>(feed: &'a Value, name: &str) -> Result<&'a Vec<Value>, ProxyError> {
    feed.pointer("/data/stations")
        .and_then(Value::as_array)
        .ok_or_else(|| ProxyError::Malformed {
            upstream: UPSTREAM,
            message: format!("{name} has no data.stations array"),
        })
}
