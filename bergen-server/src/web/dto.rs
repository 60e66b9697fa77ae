//! Data transfer objects for web requests and responses.
//!
//! Query parameter names follow the web client (`stopPlaceId`,
//! `numberOfDepartures`, ...).

use serde::{Deserialize, Serialize};

use crate::domain::{Stop, StopId};

/// Query for `/api/buss-data`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardByIdQuery {
    /// Station or platform id
    pub stop_place_id: Option<String>,

    /// Look-ahead window in seconds
    pub time_range: Option<u32>,

    pub number_of_departures: Option<u32>,
}

/// Query for `/api/bus-departures-by-name`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardByNameQuery {
    /// Free-text stop name
    pub query: Option<String>,

    pub time_range: Option<u32>,

    pub number_of_departures: Option<u32>,

    /// Maximum number of stations to query
    pub max_stations: Option<usize>,
}

/// Query for `/api/stops/search`.
#[derive(Debug, Default, Deserialize)]
pub struct StopSearchQuery {
    pub query: Option<String>,

    /// Maximum results (default 50, capped at 200)
    pub limit: Option<usize>,
}

/// A stop in search results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopSummary {
    pub stop_id: StopId,
    pub stop_name: String,
}

impl From<Stop> for StopSummary {
    fn from(stop: Stop) -> Self {
        Self {
            stop_id: stop.stop_id,
            stop_name: stop.stop_name,
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
