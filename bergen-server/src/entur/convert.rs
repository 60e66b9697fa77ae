//! Conversion from Entur DTOs to validated domain types.

use tracing::{debug, warn};

use crate::domain::{Departure, Line, StopId, TransportMode};

use super::error::EnturError;
use super::types::{EstimatedCall, GraphQlResponse, StopPlace};

/// Maximum number of body characters kept in error messages.
const BODY_SNIPPET_LEN: usize = 500;

/// A station's departure board after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct DepartureBoard {
    /// The station id that was queried.
    pub station_id: StopId,
    /// Station name as reported upstream (may be empty if upstream omitted it).
    pub name: String,
    /// Complete departures, in upstream order.
    pub departures: Vec<Departure>,
    /// Number of estimated calls dropped for missing required fields.
    pub dropped: usize,
}

/// Parse a raw response body into a board for `station`.
///
/// - empty or non-JSON body → [`EnturError::Malformed`]
/// - GraphQL `errors` with no stop place → [`EnturError::Malformed`]
/// - `data.stopPlace` null or absent → [`EnturError::NotFound`]
pub fn parse_board(station: &StopId, body: &str) -> Result<DepartureBoard, EnturError> {
    if body.trim().is_empty() {
        return Err(EnturError::Malformed {
            message: "empty response body".to_string(),
            body: None,
        });
    }

    let response: GraphQlResponse =
        serde_json::from_str(body).map_err(|e| EnturError::Malformed {
            message: e.to_string(),
            body: Some(body.chars().take(BODY_SNIPPET_LEN).collect()),
        })?;

    let errors: Vec<String> = response
        .errors
        .unwrap_or_default()
        .into_iter()
        .map(|e| e.message.unwrap_or_else(|| "unknown error".to_string()))
        .collect();

    match response.data.and_then(|d| d.stop_place) {
        Some(stop_place) => {
            if !errors.is_empty() {
                warn!(station = %station, errors = ?errors, "partial GraphQL errors in departure board");
            }
            Ok(convert_stop_place(station, stop_place))
        }
        None if !errors.is_empty() => Err(EnturError::Malformed {
            message: format!("GraphQL errors: {}", errors.join("; ")),
            body: None,
        }),
        None => Err(EnturError::NotFound(station.clone())),
    }
}

/// Validate every estimated call of a stop place.
pub fn convert_stop_place(station: &StopId, stop_place: StopPlace) -> DepartureBoard {
    let calls = stop_place.estimated_calls.unwrap_or_default();
    let total = calls.len();

    let departures: Vec<Departure> = calls
        .into_iter()
        .filter_map(|call| convert_call(station, call))
        .collect();

    DepartureBoard {
        station_id: station.clone(),
        name: stop_place.name.unwrap_or_default(),
        dropped: total - departures.len(),
        departures,
    }
}

/// Convert one call, or `None` if it lacks an expected time or destination.
fn convert_call(station: &StopId, call: EstimatedCall) -> Option<Departure> {
    let expected = call.expected_departure_time.unwrap_or_default();
    let destination = call
        .destination_display
        .and_then(|d| d.front_text)
        .unwrap_or_default();

    let line = call
        .service_journey
        .and_then(|sj| sj.line)
        .and_then(|l| {
            Some(Line {
                id: l.id?,
                name: l.name,
                transport_mode: l.transport_mode.as_deref().map(TransportMode::from_upstream),
            })
        });

    let departure = Departure::new(
        call.realtime.unwrap_or(false),
        call.aimed_departure_time,
        &expected,
        &destination,
        line,
    );

    if departure.is_none() {
        debug!(
            station = %station,
            expected = %expected,
            destination = %destination,
            "dropping incomplete estimated call"
        );
    }

    departure
}
