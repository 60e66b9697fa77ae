use std::process::ExitCode;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use bergen_server::aggregate::{AggregateConfig, DepartureService};
use bergen_server::cache::{CacheConfig, CachedEnturClient};
use bergen_server::config::ServerConfig;
use bergen_server::entur::EnturClient;
use bergen_server::proxy::{BikeClient, WeatherClient};
use bergen_server::stops::{GtfsImporter, StopCache, StopDirectory, StopLoader};
use bergen_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bergen_server=info,tower_http=info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "fatal");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;

    // Departure fetcher with a short-lived cache in front
    let entur = EnturClient::new(config.entur())?;
    let cached_entur = CachedEnturClient::new(entur, &CacheConfig::default());

    // Stop directory: disk cache or feed now, then once a day
    let directory = StopDirectory::empty();
    let loader = StopLoader::new(
        GtfsImporter::new(config.gtfs())?,
        StopCache::new(config.stop_cache()),
        directory.clone(),
    );
    info!("loading stop directory");
    match loader.load().await {
        Ok(count) => info!(count, "stop directory ready"),
        Err(e) => warn!(
            error = %e,
            "stop directory unavailable, name lookups will fail until the next refresh"
        ),
    }
    loader.spawn_daily_refresh(config.stop_refresh_hour);

    let departures = DepartureService::new(cached_entur, directory, AggregateConfig::default());
    let state = AppState::new(
        departures,
        BikeClient::new(config.bike())?,
        WeatherClient::new(config.weather())?,
    );

    let app = create_router(state, &config.frontend_origins, config.static_dir.as_deref());

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(addr = %config.bind, "Bergen server listening");
    info!("  GET /api/buss-data?stopPlaceId=...");
    info!("  GET /api/bus-departures-by-name?query=...");
    info!("  GET /api/stops/search?query=...");
    info!("  GET /api/stops/all");
    info!("  GET /api/bike-data");
    info!("  GET /api/bergen-temp");

    axum::serve(listener, app).await?;
    Ok(())
}
