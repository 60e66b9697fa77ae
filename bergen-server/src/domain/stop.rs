//! Stop records from the static feed.

use serde::{Deserialize, Serialize};

use super::StopId;

/// A single station or platform record.
///
/// A stop without a `parent_station` is a station. A stop with one is a
/// platform (quay) belonging to that station. `stop_name` is not unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub stop_id: StopId,
    pub stop_name: String,
    pub stop_lat: f64,
    pub stop_lon: f64,
    pub stop_desc: Option<String>,
    /// `"1"` denotes a station.
    pub location_type: Option<String>,
    pub parent_station: Option<StopId>,
    pub wheelchair_boarding: Option<String>,
    pub vehicle_type: Option<String>,
    pub platform_code: Option<String>,
}

impl Stop {
    /// Create a stop with only the fields the resolver needs.
    pub fn new(stop_id: StopId, stop_name: impl Into<String>, parent_station: Option<StopId>) -> Self {
        Self {
            stop_id,
            stop_name: stop_name.into(),
            stop_lat: 0.0,
            stop_lon: 0.0,
            stop_desc: None,
            location_type: None,
            parent_station,
            wheelchair_boarding: None,
            vehicle_type: None,
            platform_code: None,
        }
    }

    /// Whether this record is station-level (has no parent).
    pub fn is_station(&self) -> bool {
        self.parent_station.is_none()
    }
}
