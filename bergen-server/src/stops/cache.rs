//! On-disk snapshot of the parsed stop table.
//!
//! The GTFS archive takes minutes to download, so the last good table is
//! kept under `DATA_DIR` and reused at startup. A snapshot only counts if it
//! came from the feed currently configured and is younger than the TTL.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::Stop;

use super::error::StopImportError;

/// One feed day.
const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Serialize, Deserialize)]
struct Snapshot {
    feed_url: String,
    written_unix: u64,
    stops: Vec<Stop>,
}

#[derive(Debug, Clone)]
pub struct StopCacheConfig {
    pub path: PathBuf,
    pub ttl: Duration,
}

impl StopCacheConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ttl: DEFAULT_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Stop table snapshot on disk.
#[derive(Debug, Clone)]
pub struct StopCache {
    config: StopCacheConfig,
}

impl StopCache {
    pub fn new(config: StopCacheConfig) -> Self {
        Self { config }
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Stops from a fresh, non-empty snapshot of `feed_url`, if there is one.
    pub fn load(&self, feed_url: &str) -> Option<Vec<Stop>> {
        let raw = std::fs::read(&self.config.path).ok()?;
        let snapshot: Snapshot = match serde_json::from_slice(&raw) {
            Ok(s) => s,
            Err(e) => {
                debug!(path = %self.config.path.display(), error = %e, "ignoring unreadable stop snapshot");
                return None;
            }
        };

        let age = unix_now().ok()?.saturating_sub(snapshot.written_unix);
        let usable = snapshot.feed_url == feed_url
            && age < self.config.ttl.as_secs()
            && !snapshot.stops.is_empty();

        usable.then_some(snapshot.stops)
    }

    /// Write a snapshot of `stops` taken from `feed_url`.
    ///
    /// The file is replaced by rename, so readers never see a partial write.
    pub fn save(&self, feed_url: &str, stops: &[Stop]) -> Result<(), StopImportError> {
        let snapshot = Snapshot {
            feed_url: feed_url.to_string(),
            written_unix: unix_now()?,
            stops: stops.to_vec(),
        };
        let json = serde_json::to_vec(&snapshot).map_err(cache_err("encode snapshot"))?;

        let path = &self.config.path;
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir).map_err(cache_err("create data dir"))?;
        }

        let staging = path.with_extension("partial");
        std::fs::write(&staging, json).map_err(cache_err("write snapshot"))?;
        std::fs::rename(&staging, path).map_err(cache_err("install snapshot"))?;
        Ok(())
    }
}

fn unix_now() -> Result<u64, StopImportError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(cache_err("read clock"))
}

fn cache_err<E: std::fmt::Display>(what: &'static str) -> impl Fn(E) -> StopImportError {
    move |e| StopImportError::Cache {
        message: format!("{what}: {e}"),
    }
}
