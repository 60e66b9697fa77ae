//! In-memory stop directory.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::{Stop, StopId};

use super::error::StopImportError;

/// An immutable snapshot of the stop table.
///
/// Stops are kept in feed order; that order is the final tie-break when
/// ranking name matches.
#[derive(Debug, Default)]
pub struct StopTable {
    stops: Vec<Stop>,
    by_id: HashMap<StopId, usize>,
}

impl StopTable {
    /// Build a table. If an id appears more than once, the first record wins.
    pub fn new(stops: Vec<Stop>) -> Self {
        let mut kept = Vec::with_capacity(stops.len());
        let mut by_id = HashMap::with_capacity(stops.len());

        for stop in stops {
            if by_id.contains_key(&stop.stop_id) {
                continue;
            }
            by_id.insert(stop.stop_id.clone(), kept.len());
            kept.push(stop);
        }

        Self { stops: kept, by_id }
    }

    /// Exact lookup by identifier.
    pub fn get(&self, id: &StopId) -> Option<&Stop> {
        self.by_id.get(id).map(|&i| &self.stops[i])
    }

    /// All stops in feed order.
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}

/// Thread-safe stop directory.
///
/// Requests take a [`snapshot`](Self::snapshot) and work against it; the
/// refresh job swaps in a complete new table with [`replace`](Self::replace).
/// A reader therefore sees either the old or the new table, never a
/// partially loaded one.
#[derive(Clone, Default)]
pub struct StopDirectory {
    inner: Arc<RwLock<Arc<StopTable>>>,
}

impl StopDirectory {
    /// Create an empty directory. Lookups return not-found until loaded.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a directory holding the given stops.
    pub fn from_stops(stops: Vec<Stop>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(StopTable::new(stops)))),
        }
    }

    /// Take the current table.
    pub async fn snapshot(&self) -> Arc<StopTable> {
        let guard = self.inner.read().await;
        Arc::clone(&guard)
    }

    /// Replace the whole table.
    ///
    /// The new table is built before the lock is taken. An empty list is
    /// refused and the current table is kept.
    pub async fn replace(&self, stops: Vec<Stop>) -> Result<usize, StopImportError> {
        if stops.is_empty() {
            return Err(StopImportError::EmptyFeed);
        }

        let table = Arc::new(StopTable::new(stops));
        let count = table.len();

        let mut guard = self.inner.write().await;
        *guard = table;

        Ok(count)
    }

    /// Get the number of stops in the directory.
    pub async fn len(&self) -> usize {
        self.snapshot().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.snapshot().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> StopId {
        StopId::parse(s).unwrap()
    }

    fn station(s: &str, name: &str) -> Stop {
        Stop::new(id(s), name, None)
    }

    #[test]
    fn table_first_duplicate_wins() {
        let table = StopTable::new(vec![
            station("NSR:StopPlace:1", "First"),
            station("NSR:StopPlace:1", "Second"),
            station("NSR:StopPlace:2", "Other"),
        ]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&id("NSR:StopPlace:1")).unwrap().stop_name, "First");
        assert_eq!(table.stops()[1].stop_name, "Other");
    }

    #[test]
    fn table_get_missing() {
        let table = StopTable::new(vec![station("NSR:StopPlace:1", "A")]);
        assert!(table.get(&id("NSR:StopPlace:9")).is_none());
    }

    #[tokio::test]
    async fn empty_directory() {
        let dir = StopDirectory::empty();
        assert!(dir.is_empty().await);
        assert!(dir.snapshot().await.get(&id("NSR:StopPlace:1")).is_none());
    }

    #[tokio::test]
    async fn replace_swaps_table() {
        let dir = StopDirectory::from_stops(vec![station("NSR:StopPlace:1", "Old")]);
        let before = dir.snapshot().await;

        let count = dir
            .replace(vec![
                station("NSR:StopPlace:2", "New"),
                station("NSR:StopPlace:3", "Newer"),
            ])
            .await
            .unwrap();
        assert_eq!(count, 2);

        // An earlier snapshot still sees the complete old table
        assert_eq!(before.len(), 1);
        assert!(before.get(&id("NSR:StopPlace:1")).is_some());

        let after = dir.snapshot().await;
        assert_eq!(after.len(), 2);
        assert!(after.get(&id("NSR:StopPlace:1")).is_none());
    }

    #[tokio::test]
    async fn replace_with_empty_keeps_old() {
        let dir = StopDirectory::from_stops(vec![station("NSR:StopPlace:1", "Old")]);

        let result = dir.replace(Vec::new()).await;
        assert!(matches!(result, Err(StopImportError::EmptyFeed)));
        assert_eq!(dir.len().await, 1);
    }

    #[tokio::test]
    async fn concurrent_readers_never_see_empty() {
        let dir = StopDirectory::from_stops(vec![station("NSR:StopPlace:0", "S0")]);

        let writer = {
            let dir = dir.clone();
            tokio::spawn(async move {
                for round in 1..50 {
                    let stops = (0..round)
                        .map(|i| station(&format!("NSR:StopPlace:{i}"), "S"))
                        .collect();
                    dir.replace(stops).await.unwrap();
                    tokio::task::yield_now().await;
                }
            })
        };

        for _ in 0..200 {
            assert!(!dir.snapshot().await.is_empty());
            tokio::task::yield_now().await;
        }

        writer.await.unwrap();
    }
}
