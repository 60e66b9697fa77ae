//! Validated departure records.
//!
//! A `Departure` is only constructed at the fetcher boundary, after the
//! upstream estimated call has been checked for the fields we rely on.
//! Everything downstream can trust `expected_departure` and `destination`
//! to be present and non-blank.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::StopId;

/// Transport mode of a line, as reported upstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TransportMode {
    Bus,
    Coach,
    Tram,
    Rail,
    Metro,
    Water,
    Air,
    Cableway,
    Funicular,
    Lift,
    Taxi,
    Trolleybus,
    Monorail,
    /// A mode this server does not know about. Kept verbatim.
    Unknown(String),
}

impl TransportMode {
    /// Parse an upstream mode string. Matching is case-insensitive.
    pub fn from_upstream(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "bus" => TransportMode::Bus,
            "coach" => TransportMode::Coach,
            "tram" => TransportMode::Tram,
            "rail" => TransportMode::Rail,
            "metro" => TransportMode::Metro,
            "water" => TransportMode::Water,
            "air" => TransportMode::Air,
            "cableway" => TransportMode::Cableway,
            "funicular" => TransportMode::Funicular,
            "lift" => TransportMode::Lift,
            "taxi" => TransportMode::Taxi,
            "trolleybus" => TransportMode::Trolleybus,
            "monorail" => TransportMode::Monorail,
            _ => TransportMode::Unknown(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TransportMode::Bus => "bus",
            TransportMode::Coach => "coach",
            TransportMode::Tram => "tram",
            TransportMode::Rail => "rail",
            TransportMode::Metro => "metro",
            TransportMode::Water => "water",
            TransportMode::Air => "air",
            TransportMode::Cableway => "cableway",
            TransportMode::Funicular => "funicular",
            TransportMode::Lift => "lift",
            TransportMode::Taxi => "taxi",
            TransportMode::Trolleybus => "trolleybus",
            TransportMode::Monorail => "monorail",
            TransportMode::Unknown(s) => s,
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TransportMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TransportMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(TransportMode::from_upstream(&s))
    }
}

/// Line metadata of the service journey behind a departure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub id: String,
    pub name: Option<String>,
    pub transport_mode: Option<TransportMode>,
}

/// One estimated call, validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Departure {
    pub realtime: bool,

    #[serde(rename = "aimedDepartureTime")]
    pub aimed_departure: Option<String>,

    /// Expected departure as sent upstream (ISO-8601 with offset).
    #[serde(rename = "expectedDepartureTime")]
    pub expected_departure: String,

    /// `expected_departure` parsed to an instant; `None` if unparseable.
    #[serde(skip)]
    pub expected_at: Option<DateTime<FixedOffset>>,

    /// Destination front text.
    pub destination: String,

    pub line: Option<Line>,
}

impl Departure {
    /// Build a departure, parsing the expected time.
    ///
    /// Returns `None` if `expected_departure` or `destination` is blank.
    pub fn new(
        realtime: bool,
        aimed_departure: Option<String>,
        expected_departure: &str,
        destination: &str,
        line: Option<Line>,
    ) -> Option<Self> {
        let expected_departure = expected_departure.trim();
        let destination = destination.trim();
        if expected_departure.is_empty() || destination.is_empty() {
            return None;
        }

        Some(Self {
            realtime,
            aimed_departure,
            expected_departure: expected_departure.to_string(),
            expected_at: DateTime::parse_from_rfc3339(expected_departure).ok(),
            destination: destination.to_string(),
            line,
        })
    }
}

/// A departure annotated with the stop it was fetched for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaggedDeparture {
    pub stop_id: StopId,
    pub stop_name: String,
    #[serde(flatten)]
    pub departure: Departure,
}

impl TaggedDeparture {
    /// Order by expected instant; unparseable instants sort last.
    pub fn cmp_by_expected(&self, other: &Self) -> Ordering {
        match (self.departure.expected_at, other.departure.expected_at) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}
