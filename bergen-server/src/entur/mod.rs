//! Entur journey-planner client.
//!
//! Queries the live departure board ("estimated calls") of a stop place
//! through Entur's GraphQL API.
//!
//! Key characteristics of the API:
//! - Every request must carry an `ET-Client-Name` header
//! - An unknown or inactive stop place comes back as `data.stopPlace: null`,
//!   not as an HTTP error
//! - Times are ISO-8601 with a UTC offset, e.g. `2025-11-01T10:02:00+01:00`

mod client;
mod convert;
mod error;
mod query;
mod types;

pub use client::{EnturClient, EnturConfig};
pub use convert::{DepartureBoard, convert_stop_place, parse_board};
pub use error::{EnturError, FailureKind};
pub use query::{DEPARTURES_QUERY, DeparturesRequest};
pub use types::{EstimatedCall, GraphQlResponse, StopPlace};
