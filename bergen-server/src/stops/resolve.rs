//! Stop resolution: identifiers and free-text names to station ids.
//!
//! Name matching is case-insensitive: both the query and the stop names are
//! trimmed and lower-cased (Unicode-aware, so "ÅSANE" matches "Åsane")
//! before a substring test. Matches are ranked by:
//!
//! 1. exact name match before partial match,
//! 2. station-level records (no parent) before platforms,
//! 3. feed order.

use std::sync::Arc;

use crate::domain::{Stop, StopId};

use super::directory::StopTable;
use super::error::ResolveError;

/// A stop matched by name, with the station id to query for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub stop: Stop,
    /// `stop.stop_id` resolved to its owning station.
    pub station_id: StopId,
    /// Whether the name matched exactly (ignoring case).
    pub exact: bool,
}

/// Resolves identifiers and names against one directory snapshot.
pub struct StopResolver {
    table: Arc<StopTable>,
}

impl StopResolver {
    pub fn new(table: Arc<StopTable>) -> Self {
        Self { table }
    }

    /// Resolve an identifier to the station id to query.
    ///
    /// - Ids in the upstream station namespace are returned unchanged.
    /// - Known platforms resolve to their parent station.
    /// - Known stations resolve to themselves.
    /// - Unknown ids are returned unchanged; upstream may still know them.
    pub fn resolve(&self, id: &StopId) -> StopId {
        if id.is_station() {
            return id.clone();
        }

        match self.table.get(id) {
            Some(stop) => stop
                .parent_station
                .clone()
                .unwrap_or_else(|| stop.stop_id.clone()),
            None => id.clone(),
        }
    }

    /// Find stops whose name contains `text`, ranked best-first.
    pub fn resolve_by_name(&self, text: &str) -> Result<Vec<Candidate>, ResolveError> {
        let needle = normalize(text);
        if needle.is_empty() {
            return Err(ResolveError::NotFound(text.to_string()));
        }

        let mut candidates: Vec<Candidate> = self
            .table
            .stops()
            .iter()
            .filter_map(|stop| {
                let name = normalize(&stop.stop_name);
                if !name.contains(&needle) {
                    return None;
                }
                Some(Candidate {
                    station_id: self.resolve(&stop.stop_id),
                    exact: name == needle,
                    stop: stop.clone(),
                })
            })
            .collect();

        if candidates.is_empty() {
            return Err(ResolveError::NotFound(text.to_string()));
        }

        // Stable: feed order is kept within equal keys
        candidates.sort_by_key(|c| (!c.exact, !c.stop.is_station()));

        Ok(candidates)
    }

    /// Whether `id` is in the directory.
    pub fn is_known(&self, id: &StopId) -> bool {
        self.table.get(id).is_some()
    }

    /// Candidate for a raw identifier. Unknown ids get a placeholder stop
    /// named after the id.
    pub fn candidate_for_id(&self, id: &StopId) -> Candidate {
        let stop = self
            .table
            .get(id)
            .cloned()
            .unwrap_or_else(|| Stop::new(id.clone(), id.as_str(), None));

        Candidate {
            station_id: self.resolve(id),
            exact: true,
            stop,
        }
    }

    /// Up to `limit` ranked name matches; empty when nothing matches.
    pub fn search(&self, text: &str, limit: usize) -> Vec<Stop> {
        self.resolve_by_name(text)
            .map(|cs| cs.into_iter().take(limit).map(|c| c.stop).collect())
            .unwrap_or_default()
    }

    /// Every stop, sorted by name.
    pub fn all_by_name(&self) -> Vec<Stop> {
        let mut stops = self.table.stops().to_vec();
        stops.sort_by(|a, b| a.stop_name.cmp(&b.stop_name));
        stops
    }
}

/// Case-fold a name for matching.
fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> StopId {
        StopId::parse(s).unwrap()
    }

    fn resolver(stops: Vec<Stop>) -> StopResolver {
        StopResolver::new(Arc::new(StopTable::new(stops)))
    }

    /// Station `A` with platforms `A1`, `A2`, all named "Bergen busstasjon".
    fn busstasjon() -> Vec<Stop> {
        vec![
            Stop::new(id("NSR:Quay:A1"), "Bergen busstasjon", Some(id("NSR:StopPlace:1"))),
            Stop::new(id("NSR:Quay:A2"), "Bergen busstasjon", Some(id("NSR:StopPlace:1"))),
            Stop::new(id("NSR:StopPlace:1"), "Bergen busstasjon", None),
        ]
    }

    #[test]
    fn platform_resolves_to_parent() {
        let r = resolver(busstasjon());
        assert_eq!(r.resolve(&id("NSR:Quay:A1")), id("NSR:StopPlace:1"));
        assert_eq!(r.resolve(&id("NSR:Quay:A2")), id("NSR:StopPlace:1"));
    }

    #[test]
    fn station_resolves_to_itself() {
        let r = resolver(busstasjon());
        assert_eq!(r.resolve(&id("NSR:StopPlace:1")), id("NSR:StopPlace:1"));
    }

    #[test]
    fn station_namespace_needs_no_lookup() {
        let r = resolver(Vec::new());
        assert_eq!(r.resolve(&id("NSR:StopPlace:62356")), id("NSR:StopPlace:62356"));
    }

    #[test]
    fn parentless_non_namespace_stop_resolves_to_itself() {
        let r = resolver(vec![Stop::new(id("LOCAL:1"), "Somewhere", None)]);
        assert_eq!(r.resolve(&id("LOCAL:1")), id("LOCAL:1"));
    }

    #[test]
    fn unknown_id_falls_back_unchanged() {
        let r = resolver(busstasjon());
        assert_eq!(r.resolve(&id("NSR:Quay:999")), id("NSR:Quay:999"));
    }

    #[test]
    fn station_ranked_before_platforms() {
        let r = resolver(busstasjon());
        let candidates = r.resolve_by_name("Bergen busstasjon").unwrap();

        let ids: Vec<&str> = candidates.iter().map(|c| c.stop.stop_id.as_str()).collect();
        assert_eq!(ids, vec!["NSR:StopPlace:1", "NSR:Quay:A1", "NSR:Quay:A2"]);
        assert!(candidates.iter().all(|c| c.station_id == id("NSR:StopPlace:1")));
        assert!(candidates.iter().all(|c| c.exact));
    }

    #[test]
    fn exact_ranked_before_partial() {
        let r = resolver(vec![
            Stop::new(id("NSR:StopPlace:2"), "Torgallmenningen", None),
            Stop::new(id("NSR:Quay:3"), "Torget", Some(id("NSR:StopPlace:3"))),
        ]);

        let candidates = r.resolve_by_name("torget").unwrap();
        assert_eq!(candidates.len(), 1);

        let candidates = r.resolve_by_name("torg").unwrap();
        assert_eq!(candidates.len(), 2);
        assert!(!candidates[0].exact);

        // Exact platform match beats partial station match
        let r = resolver(vec![
            Stop::new(id("NSR:StopPlace:2"), "Torget sør", None),
            Stop::new(id("NSR:Quay:3"), "Torget", Some(id("NSR:StopPlace:3"))),
        ]);
        let candidates = r.resolve_by_name("Torget").unwrap();
        assert_eq!(candidates[0].stop.stop_id, id("NSR:Quay:3"));
        assert_eq!(candidates[1].stop.stop_id, id("NSR:StopPlace:2"));
    }

    #[test]
    fn feed_order_breaks_remaining_ties() {
        let r = resolver(vec![
            Stop::new(id("NSR:StopPlace:20"), "Nesttun terminal", None),
            Stop::new(id("NSR:StopPlace:10"), "Nesttun sentrum", None),
        ]);
        let candidates = r.resolve_by_name("nesttun").unwrap();
        assert_eq!(candidates[0].stop.stop_id, id("NSR:StopPlace:20"));
        assert_eq!(candidates[1].stop.stop_id, id("NSR:StopPlace:10"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let r = resolver(vec![Stop::new(id("NSR:StopPlace:5"), "Åsane terminal", None)]);
        assert!(r.resolve_by_name("åsane").is_ok());
        assert!(r.resolve_by_name("ÅSANE TERMINAL").unwrap()[0].exact);
        assert!(r.resolve_by_name("  terminal ").is_ok());
    }

    #[test]
    fn no_match_is_not_found() {
        let r = resolver(busstasjon());
        assert_eq!(
            r.resolve_by_name("Oslo S"),
            Err(ResolveError::NotFound("Oslo S".to_string()))
        );
    }

    #[test]
    fn blank_query_is_not_found() {
        let r = resolver(busstasjon());
        assert!(r.resolve_by_name("").is_err());
        assert!(r.resolve_by_name("   ").is_err());
    }

    #[test]
    fn empty_table_is_not_found() {
        let r = resolver(Vec::new());
        assert!(r.resolve_by_name("Bergen").is_err());
        assert!(r.search("Bergen", 10).is_empty());
    }

    #[test]
    fn candidate_for_known_platform() {
        let r = resolver(busstasjon());
        let c = r.candidate_for_id(&id("NSR:Quay:A2"));
        assert_eq!(c.station_id, id("NSR:StopPlace:1"));
        assert_eq!(c.stop.stop_name, "Bergen busstasjon");
    }

    #[test]
    fn candidate_for_unknown_id() {
        let r = resolver(Vec::new());
        let c = r.candidate_for_id(&id("NSR:StopPlace:77"));
        assert_eq!(c.station_id, id("NSR:StopPlace:77"));
        assert_eq!(c.stop.stop_name, "NSR:StopPlace:77");
    }

    #[test]
    fn known_ids() {
        let r = resolver(busstasjon());
        assert!(r.is_known(&id("NSR:Quay:A1")));
        assert!(!r.is_known(&id("Bergen")));
    }

    #[test]
    fn search_respects_limit() {
        let r = resolver(busstasjon());
        assert_eq!(r.search("bergen", 2).len(), 2);
        assert_eq!(r.search("bergen", 10).len(), 3);
    }

    #[test]
    fn all_by_name_sorted() {
        let r = resolver(vec![
            Stop::new(id("NSR:StopPlace:2"), "Torget", None),
            Stop::new(id("NSR:StopPlace:1"), "Byparken", None),
        ]);
        let names: Vec<String> = r.all_by_name().into_iter().map(|s| s.stop_name).collect();
        assert_eq!(names, vec!["Byparken", "Torget"]);
    }
}
