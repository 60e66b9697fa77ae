//! Caching layer for Entur departure boards.
//!
//! Boards are cached per (station, time range, departure limit) for a short
//! TTL, so a burst of identical lookups hits upstream once. Failures are
//! never cached: the next request retries upstream.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::aggregate::DepartureSource;
use crate::domain::StopId;
use crate::entur::{DepartureBoard, EnturClient, EnturError};

/// Cache key for departure boards: (station, time range secs, max departures).
type BoardKey = (StopId, u32, u32);

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(30),
            max_capacity: 1000,
        }
    }
}

/// Departure source with a TTL cache in front.
///
/// Wraps an [`EnturClient`] by default; any [`DepartureSource`] works.
pub struct CachedEnturClient<S = EnturClient> {
    inner: S,
    boards: MokaCache<BoardKey, Arc<DepartureBoard>>,
}

impl<S: DepartureSource> CachedEnturClient<S> {
    /// Create a new cached client.
    pub fn new(inner: S, config: &CacheConfig) -> Self {
        let boards = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { inner, boards }
    }
}

impl<S: DepartureSource> DepartureSource for CachedEnturClient<S> {
    async fn departures(
        &self,
        station: &StopId,
        time_range_secs: u32,
        max_departures: u32,
    ) -> Result<DepartureBoard, EnturError> {
        let key = (station.clone(), time_range_secs, max_departures);

        if let Some(cached) = self.boards.get(&key).await {
            return Ok((*cached).clone());
        }

        let board = self
            .inner
            .departures(station, time_range_secs, max_departures)
            .await?;

        self.boards.insert(key, Arc::new(board.clone())).await;

        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts upstream calls; fails for stations ending in ":0".
    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
    }

    impl DepartureSource for Counting {
        async fn departures(
            &self,
            station: &StopId,
            _time_range_secs: u32,
            _max_departures: u32,
        ) -> Result<DepartureBoard, EnturError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if station.as_str().ends_with(":0") {
                return Err(EnturError::NotFound(station.clone()));
            }
            Ok(DepartureBoard {
                station_id: station.clone(),
                name: "Byparken".to_string(),
                departures: Vec::new(),
                dropped: 0,
            })
        }
    }

    fn id(s: &str) -> StopId {
        StopId::parse(s).unwrap()
    }

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(30));
        assert_eq!(config.max_capacity, 1000);
    }

    #[tokio::test]
    async fn repeated_lookup_hits_upstream_once() {
        let cached = CachedEnturClient::new(Counting::default(), &CacheConfig::default());
        let station = id("NSR:StopPlace:1");

        let first = cached.departures(&station, 7200, 15).await.unwrap();
        let second = cached.departures(&station, 7200, 15).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn key_includes_window_and_limit() {
        let cached = CachedEnturClient::new(Counting::default(), &CacheConfig::default());
        let station = id("NSR:StopPlace:1");

        cached.departures(&station, 7200, 15).await.unwrap();
        cached.departures(&station, 3600, 15).await.unwrap();
        cached.departures(&station, 7200, 5).await.unwrap();

        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cached = CachedEnturClient::new(Counting::default(), &CacheConfig::default());
        let station = id("NSR:StopPlace:0");

        assert!(cached.departures(&station, 7200, 15).await.is_err());
        assert!(cached.departures(&station, 7200, 15).await.is_err());

        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn entries_expire() {
        let config = CacheConfig {
            ttl: Duration::from_millis(50),
            max_capacity: 10,
        };
        let cached = CachedEnturClient::new(Counting::default(), &config);
        let station = id("NSR:StopPlace:1");

        cached.departures(&station, 7200, 15).await.unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;
        cached.departures(&station, 7200, 15).await.unwrap();

        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 2);
    }
}
