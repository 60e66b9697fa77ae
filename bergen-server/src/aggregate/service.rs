//! Request-level departure operations.
//!
//! Validates input, applies defaults and limits, takes a directory snapshot
//! and runs the lookup. The payloads echo both what was asked for and what
//! it resolved to.

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::{Departure, StopId};
use crate::entur::{EnturError, FailureKind};
use crate::stops::{ResolveError, StopDirectory, StopResolver};

use super::aggregator::{AggregateResult, Aggregator, CandidateOutcome};
use super::config::AggregateConfig;
use super::source::DepartureSource;

/// Errors surfaced by the departure operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// Missing, blank or invalid parameter. No upstream call was made.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No matching stop, or upstream reports the station absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// Upstream could not be reached or returned an error status.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Upstream answered with an unusable payload.
    #[error("malformed upstream response: {0}")]
    MalformedUpstreamResponse(String),
}

impl From<EnturError> for ServiceError {
    fn from(e: EnturError) -> Self {
        match e.kind() {
            FailureKind::NotFound => ServiceError::NotFound(e.to_string()),
            FailureKind::Unavailable => ServiceError::UpstreamUnavailable(e.to_string()),
            FailureKind::Malformed => ServiceError::MalformedUpstreamResponse(e.to_string()),
        }
    }
}

impl From<ResolveError> for ServiceError {
    fn from(e: ResolveError) -> Self {
        ServiceError::NotFound(e.to_string())
    }
}

/// Departure board for a single identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardPayload {
    pub requested_id: String,
    pub resolved_id: StopId,
    /// Station name as reported upstream.
    pub name: String,
    pub departures: Vec<Departure>,
}

/// Aggregated departures for a free-text search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatePayload {
    pub requested_term: String,
    /// Stations that were queried, best match first.
    pub resolved_station_ids: Vec<StopId>,
    #[serde(flatten)]
    pub result: AggregateResult,
}

/// Departure lookups by id and by name.
pub struct DepartureService<S> {
    source: S,
    directory: StopDirectory,
    config: AggregateConfig,
}

impl<S: DepartureSource> DepartureService<S> {
    pub fn new(source: S, directory: StopDirectory, config: AggregateConfig) -> Self {
        Self {
            source,
            directory,
            config,
        }
    }

    #[cfg(test)]
    pub(super) fn source(&self) -> &S {
        &self.source
    }

    pub fn directory(&self) -> &StopDirectory {
        &self.directory
    }

    /// Departure board for a station or platform id.
    ///
    /// Platform ids are mapped to their station before querying.
    pub async fn board_by_id(
        &self,
        id: &str,
        time_range_secs: Option<u32>,
        max_departures: Option<u32>,
    ) -> Result<BoardPayload, ServiceError> {
        if id.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "stopPlaceId must not be blank".to_string(),
            ));
        }
        let stop_id =
            StopId::parse(id).map_err(|e| ServiceError::InvalidInput(e.to_string()))?;

        let time_range = self.config.time_range(time_range_secs);
        let max = self.config.max_departures(max_departures);

        let resolver = StopResolver::new(self.directory.snapshot().await);
        let station = resolver.resolve(&stop_id);

        let board = self
            .source
            .departures(&station, time_range, max)
            .await
            .inspect_err(|e| {
                warn!(requested = %stop_id, station = %station, error = %e, "departure board fetch failed");
            })?;

        info!(
            requested = %stop_id,
            station = %station,
            departures = board.departures.len(),
            dropped = board.dropped,
            "departure board fetched"
        );

        Ok(BoardPayload {
            requested_id: id.to_string(),
            resolved_id: station,
            name: board.name,
            departures: board.departures,
        })
    }

    /// Merged departures for every station whose name matches `term`.
    ///
    /// Fails only if nothing matches or no queried station returned a
    /// board. In the latter case the error reflects the worst failure:
    /// unavailable, then malformed, then not found.
    pub async fn board_by_name(
        &self,
        term: &str,
        time_range_secs: Option<u32>,
        max_departures: Option<u32>,
        max_candidates: Option<usize>,
    ) -> Result<AggregatePayload, ServiceError> {
        if term.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "query must not be blank".to_string(),
            ));
        }

        let time_range = self.config.time_range(time_range_secs);
        let max = self.config.max_departures(max_departures);
        let candidates = self.config.max_candidates(max_candidates);

        let resolver = StopResolver::new(self.directory.snapshot().await);
        let result = Aggregator::new(&self.source, &resolver)
            .aggregate(term, time_range, max, candidates)
            .await
            .inspect_err(|_| info!(term = %term.trim(), "no stops match search term"))?;

        if result.candidates_with_data == 0 {
            return Err(no_data_error(&result));
        }

        Ok(AggregatePayload {
            requested_term: term.to_string(),
            resolved_station_ids: result
                .candidates
                .iter()
                .map(|c| c.station_id.clone())
                .collect(),
            result,
        })
    }
}

/// Error for an aggregate where no station returned a board.
fn no_data_error(result: &AggregateResult) -> ServiceError {
    let outcomes = || result.candidates.iter().map(|c| &c.outcome);

    if let Some(CandidateOutcome::Unavailable { reason }) = outcomes()
        .find(|o| matches!(o, CandidateOutcome::Unavailable { .. }))
    {
        return ServiceError::UpstreamUnavailable(reason.clone());
    }

    if let Some(CandidateOutcome::Malformed { reason }) =
        outcomes().find(|o| matches!(o, CandidateOutcome::Malformed { .. }))
    {
        return ServiceError::MalformedUpstreamResponse(reason.clone());
    }

    ServiceError::NotFound(format!(
        "no active station matches '{}'",
        result.search_term
    ))
}
