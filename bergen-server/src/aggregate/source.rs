//! Departure source abstraction.

use std::future::Future;

use crate::domain::StopId;
use crate::entur::{DepartureBoard, EnturClient, EnturError};

/// Anything that can produce a departure board for a station.
///
/// This abstraction allows the aggregator to be tested with mock data.
pub trait DepartureSource: Send + Sync {
    /// Fetch up to `max_departures` departures from `station` within the
    /// next `time_range_secs` seconds.
    fn departures(
        &self,
        station: &StopId,
        time_range_secs: u32,
        max_departures: u32,
    ) -> impl Future<Output = Result<DepartureBoard, EnturError>> + Send;
}

impl DepartureSource for EnturClient {
    async fn departures(
        &self,
        station: &StopId,
        time_range_secs: u32,
        max_departures: u32,
    ) -> Result<DepartureBoard, EnturError> {
        self.fetch(station, time_range_secs, max_departures).await
    }
}
