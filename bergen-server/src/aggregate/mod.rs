//! Departure lookups by stop id and by free-text name.

mod aggregator;
mod config;
mod service;
mod source;


pub use aggregator::{
    AggregateResult, Aggregator, CandidateOutcome, CandidateReport, merge_departures,
};
pub use config::{AggregateConfig, MAX_CANDIDATES};
pub use service::{AggregatePayload, BoardPayload, DepartureService, ServiceError};
pub use source::DepartureSource;
