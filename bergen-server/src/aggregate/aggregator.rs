//! Departure aggregation across several candidate stations.
//!
//! A free-text name can match many stops: the station itself, each of its
//! platforms, and unrelated stations with similar names. The aggregator
//! queries the best few distinct stations concurrently, keeps going when
//! some of them fail, and merges what comes back into one time-ordered list.

use std::collections::HashSet;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::{StopId, TaggedDeparture};
use crate::entur::{EnturError, FailureKind};
use crate::stops::{Candidate, ResolveError, StopResolver};

use super::config::MAX_CANDIDATES;
use super::source::DepartureSource;

/// What happened when one candidate station was queried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum CandidateOutcome {
    /// Board fetched. `departures` may be zero for a quiet station.
    Found { departures: usize, dropped: usize },
    /// Upstream doesn't know the station or it is inactive.
    NotFound,
    /// Network failure, timeout or error status.
    Unavailable { reason: String },
    /// Upstream answered with an unusable payload.
    Malformed { reason: String },
}

impl CandidateOutcome {
    fn from_error(err: &EnturError) -> Self {
        match err.kind() {
            FailureKind::NotFound => CandidateOutcome::NotFound,
            FailureKind::Unavailable => CandidateOutcome::Unavailable {
                reason: err.to_string(),
            },
            FailureKind::Malformed => CandidateOutcome::Malformed {
                reason: err.to_string(),
            },
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, CandidateOutcome::Found { .. })
    }
}

/// Per-station line of the aggregate breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateReport {
    /// The stop that matched the search.
    pub stop_id: StopId,
    pub stop_name: String,
    /// The station that was actually queried.
    pub station_id: StopId,
    #[serde(flatten)]
    pub outcome: CandidateOutcome,
}

/// Result of aggregating departures for a search term.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    pub search_term: String,
    /// Distinct stations matching the term.
    pub candidates_found: usize,
    /// Stations actually queried (at most the candidate limit).
    pub candidates_queried: usize,
    /// Queried stations that returned a board.
    pub candidates_with_data: usize,
    pub candidates: Vec<CandidateReport>,
    /// Merged departures, earliest first.
    pub departures: Vec<TaggedDeparture>,
}

/// Aggregates departures for a name or id over one directory snapshot.
pub struct Aggregator<'a, S: DepartureSource> {
    source: &'a S,
    resolver: &'a StopResolver,
}

impl<'a, S: DepartureSource> Aggregator<'a, S> {
    pub fn new(source: &'a S, resolver: &'a StopResolver) -> Self {
        Self { source, resolver }
    }

    /// Resolve `term` to candidate stations, fetch them concurrently and
    /// merge the results.
    ///
    /// Returns `NotFound` only when nothing matches `term`. Failures of
    /// individual stations are reported in [`AggregateResult::candidates`].
    pub async fn aggregate(
        &self,
        term: &str,
        time_range_secs: u32,
        max_departures: u32,
        max_candidates: usize,
    ) -> Result<AggregateResult, ResolveError> {
        let term = term.trim();
        let candidates = self.candidates(term)?;
        let found = candidates.len();

        let selected: Vec<Candidate> = candidates
            .into_iter()
            .take(max_candidates.clamp(1, MAX_CANDIDATES))
            .collect();

        debug!(
            term = %term,
            found,
            queried = selected.len(),
            "fetching candidate stations"
        );

        // Barrier: every fetch completes before anything is merged
        let fetches = selected.iter().map(|c| async move {
            let result = self
                .source
                .departures(&c.station_id, time_range_secs, max_departures)
                .await;
            (c, result)
        });
        let results = join_all(fetches).await;

        let mut reports = Vec::with_capacity(results.len());
        let mut merged = Vec::new();

        for (candidate, result) in results {
            let outcome = match result {
                Ok(board) => {
                    if board.dropped > 0 {
                        debug!(
                            term = %term,
                            station = %candidate.station_id,
                            dropped = board.dropped,
                            "incomplete departures dropped"
                        );
                    }
                    let outcome = CandidateOutcome::Found {
                        departures: board.departures.len(),
                        dropped: board.dropped,
                    };
                    let name = if board.name.is_empty() {
                        candidate.stop.stop_name.clone()
                    } else {
                        board.name
                    };
                    merged.extend(board.departures.into_iter().map(|departure| {
                        TaggedDeparture {
                            stop_id: candidate.station_id.clone(),
                            stop_name: name.clone(),
                            departure,
                        }
                    }));
                    outcome
                }
                Err(e) => {
                    warn!(
                        term = %term,
                        station = %candidate.station_id,
                        error = %e,
                        "candidate station fetch failed"
                    );
                    CandidateOutcome::from_error(&e)
                }
            };

            reports.push(CandidateReport {
                stop_id: candidate.stop.stop_id.clone(),
                stop_name: candidate.stop.stop_name.clone(),
                station_id: candidate.station_id.clone(),
                outcome,
            });
        }

        let departures = merge_departures(merged, max_departures as usize);
        let with_data = reports.iter().filter(|r| r.outcome.is_found()).count();

        info!(
            term = %term,
            found,
            queried = reports.len(),
            with_data,
            departures = departures.len(),
            "aggregated departures"
        );

        Ok(AggregateResult {
            search_term: term.to_string(),
            candidates_found: found,
            candidates_queried: reports.len(),
            candidates_with_data: with_data,
            candidates: reports,
            departures,
        })
    }

    /// Ranked candidates with one entry per distinct station.
    ///
    /// Falls back to treating `term` as an identifier when no name matches,
    /// but only for station ids and stops the directory knows. Any other
    /// unmatched term is `NotFound` without an upstream call.
    fn candidates(&self, term: &str) -> Result<Vec<Candidate>, ResolveError> {
        let ranked = match self.resolver.resolve_by_name(term) {
            Ok(ranked) => ranked,
            Err(not_found) => match StopId::parse(term) {
                Ok(id) if id.is_station() || self.resolver.is_known(&id) => {
                    vec![self.resolver.candidate_for_id(&id)]
                }
                _ => return Err(not_found),
            },
        };

        let mut seen = HashSet::new();
        Ok(ranked
            .into_iter()
            .filter(|c| seen.insert(c.station_id.clone()))
            .collect())
    }
}

/// Sort by expected instant (unparseable last, otherwise stable) and
/// truncate to `limit`.
pub fn merge_departures(mut departures: Vec<TaggedDeparture>, limit: usize) -> Vec<TaggedDeparture> {
    departures.sort_by(TaggedDeparture::cmp_by_expected);
    departures.truncate(limit);
    departures
}
