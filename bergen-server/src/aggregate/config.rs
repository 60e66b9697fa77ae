//! Request defaults and limits for departure aggregation.

/// Hard ceiling on stations queried for one name search, whatever the
/// configuration says.
pub const MAX_CANDIDATES: usize = 10;

/// Defaults applied when a caller omits a parameter, and the caps applied
/// when a caller asks for too much.
#[derive(Debug, Clone)]
pub struct AggregateConfig {
    /// Look-ahead window when none is given (seconds).
    pub default_time_range_secs: u32,

    /// Number of departures returned when none is given.
    pub default_max_departures: u32,

    /// Stations queried per name search when none is given.
    pub default_max_candidates: usize,

    /// Upper bound for stations queried per name search.
    /// Never above [`MAX_CANDIDATES`].
    pub max_candidates_cap: usize,

    /// Upper bound for departures per request.
    pub max_departures_cap: u32,

    /// Upper bound for the look-ahead window (seconds).
    pub max_time_range_secs: u32,
}

impl AggregateConfig {
    /// Effective time range: default if absent, clamped to `1..=max`.
    pub fn time_range(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_time_range_secs)
            .clamp(1, self.max_time_range_secs.max(1))
    }

    /// Effective departure limit: default if absent, clamped to `1..=cap`.
    pub fn max_departures(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_max_departures)
            .clamp(1, self.max_departures_cap.max(1))
    }

    /// Effective candidate limit: default if absent, clamped to `1..=cap`.
    pub fn max_candidates(&self, requested: Option<usize>) -> usize {
        let cap = self.max_candidates_cap.clamp(1, MAX_CANDIDATES);
        requested
            .unwrap_or(self.default_max_candidates)
            .clamp(1, cap)
    }
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            default_time_range_secs: 7200, // 2 hours
            default_max_departures: 15,
            default_max_candidates: 5,
            max_candidates_cap: MAX_CANDIDATES,
            max_departures_cap: 100,
            max_time_range_secs: 24 * 60 * 60,
        }
    }
}
