//! Loading and periodic refresh of the stop directory.

use std::time::Duration;

use chrono::{DateTime, Days, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{error, info, warn};

use super::cache::StopCache;
use super::directory::StopDirectory;
use super::error::StopImportError;
use super::import::GtfsImporter;

/// Time zone the daily refresh hour is expressed in.
pub const REFRESH_TZ: Tz = chrono_tz::Europe::Oslo;

/// Fills a [`StopDirectory`] from the disk cache or the GTFS feed.
#[derive(Clone)]
pub struct StopLoader {
    importer: GtfsImporter,
    cache: StopCache,
    directory: StopDirectory,
}

impl StopLoader {
    pub fn new(importer: GtfsImporter, cache: StopCache, directory: StopDirectory) -> Self {
        Self {
            importer,
            cache,
            directory,
        }
    }

    /// Initial load: use the disk cache if fresh, otherwise import.
    pub async fn load(&self) -> Result<usize, StopImportError> {
        if let Some(stops) = self.cache.load(self.importer.feed_url()) {
            let count = self.directory.replace(stops).await?;
            info!(count, path = %self.cache.path().display(), "loaded stops from disk cache");
            return Ok(count);
        }

        self.refresh().await
    }

    /// Import the feed and swap it in. On failure the current table is kept.
    pub async fn refresh(&self) -> Result<usize, StopImportError> {
        let stops = self.importer.fetch_stops().await?;

        if let Err(e) = self.cache.save(self.importer.feed_url(), &stops) {
            warn!(error = %e, "failed to write stop cache");
        }

        let count = self.directory.replace(stops).await?;
        info!(count, "stop directory refreshed");
        Ok(count)
    }

    /// Spawn a task that refreshes the directory every day at `hour`
    /// (local time in [`REFRESH_TZ`]).
    pub fn spawn_daily_refresh(self, hour: u32) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let wait = duration_until_next(Utc::now(), hour, REFRESH_TZ);
                info!(in_secs = wait.as_secs(), "next stop refresh scheduled");
                tokio::time::sleep(wait).await;

                match self.refresh().await {
                    Ok(count) => info!(count, "scheduled stop refresh complete"),
                    Err(e) => error!(error = %e, "scheduled stop refresh failed, keeping old table"),
                }
            }
        })
    }
}

/// Time from `now` until the next `hour:00` in `tz`.
///
/// If that wall-clock time is skipped by a DST change, the next valid
/// instant after it is used.
pub fn duration_until_next(now: DateTime<Utc>, hour: u32, tz: Tz) -> Duration {
    let local = now.with_timezone(&tz);
    let at = NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap_or_default();

    let mut day = local.date_naive();
    loop {
        let candidate = tz
            .from_local_datetime(&day.and_time(at))
            .earliest()
            .or_else(|| {
                tz.from_local_datetime(&(day.and_time(at) + chrono::Duration::hours(1)))
                    .earliest()
            });

        if let Some(candidate) = candidate {
            let candidate = candidate.with_timezone(&Utc);
            if candidate > now {
                return (candidate - now).to_std().unwrap_or(Duration::ZERO);
            }
        }

        day = match day.checked_add_days(Days::new(1)) {
            Some(d) => d,
            None => return Duration::from_secs(24 * 60 * 60),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn later_today() {
        // 10:00 Oslo (winter, +01:00) → 14:00 Oslo is 4h away
        let wait = duration_until_next(utc("2025-01-15T09:00:00Z"), 14, REFRESH_TZ);
        assert_eq!(wait, Duration::from_secs(4 * 3600));
    }

    #[test]
    fn tomorrow_when_past() {
        // 15:00 Oslo → next 14:00 is 23h away
        let wait = duration_until_next(utc("2025-01-15T14:00:00Z"), 14, REFRESH_TZ);
        assert_eq!(wait, Duration::from_secs(23 * 3600));
    }

    #[test]
    fn exactly_at_hour_waits_a_day() {
        let wait = duration_until_next(utc("2025-01-15T13:00:00Z"), 14, REFRESH_TZ);
        assert_eq!(wait, Duration::from_secs(24 * 3600));
    }

    #[test]
    fn summer_offset() {
        // 12:00Z is 14:00 Oslo in summer (+02:00); 11:00Z waits one hour
        let wait = duration_until_next(utc("2025-07-01T11:00:00Z"), 14, REFRESH_TZ);
        assert_eq!(wait, Duration::from_secs(3600));
    }

    #[test]
    fn skipped_hour_uses_next_valid_instant() {
        // 2025-03-30 02:00 Oslo does not exist; 03:00+02:00 is 01:00Z
        let wait = duration_until_next(utc("2025-03-30T00:00:00Z"), 2, REFRESH_TZ);
        assert_eq!(wait, Duration::from_secs(3600));
    }
}
