//! Application state for the web layer.

use std::sync::Arc;

use crate::aggregate::{DepartureSource, DepartureService};
use crate::cache::CachedEnturClient;
use crate::proxy::{BikeClient, WeatherClient};

/// Shared application state.
///
/// Generic over the departure source so the router can be exercised
/// against a stub upstream.
pub struct AppState<S = CachedEnturClient> {
    /// Departure lookups and the stop directory behind them
    pub departures: Arc<DepartureService<S>>,

    /// Bike-share proxy
    pub bikes: Arc<BikeClient>,

    /// Weather proxy
    pub weather: Arc<WeatherClient>,
}

impl<S: DepartureSource> AppState<S> {
    /// Create a new app state.
    pub fn new(departures: DepartureService<S>, bikes: BikeClient, weather: WeatherClient) -> Self {
        Self {
            departures: Arc::new(departures),
            bikes: Arc::new(bikes),
            weather: Arc::new(weather),
        }
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            departures: Arc::clone(&self.departures),
            bikes: Arc::clone(&self.bikes),
            weather: Arc::clone(&self.weather),
        }
    }
}
