//! HTTP route handlers.

use std::path::Path;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::get,
};
use serde_json::Value;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::aggregate::{AggregatePayload, BoardPayload, DepartureSource, ServiceError};
use crate::proxy::ProxyError;
use crate::stops::StopResolver;

use super::dto::*;
use super::state::AppState;

/// Default and maximum number of stop search results.
const DEFAULT_SEARCH_LIMIT: usize = 50;
const MAX_SEARCH_LIMIT: usize = 200;

/// Create the application router.
///
/// `origins` are the browser origins allowed by CORS. When `static_dir` is
/// given, unmatched paths are served from it.
pub fn create_router<S: DepartureSource + 'static>(
    state: AppState<S>,
    origins: &[String],
    static_dir: Option<&Path>,
) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .route("/api/buss-data", get(board_by_id::<S>))
        .route("/api/bus-departures-by-name", get(board_by_name::<S>))
        .route("/api/stops/search", get(search_stops::<S>))
        .route("/api/stops/all", get(all_stops::<S>))
        .route("/api/bike-data", get(bike_data::<S>))
        .route("/api/bergen-temp", get(bergen_temp::<S>))
        .layer(cors(origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    }
}

/// CORS policy allowing GET from `origins`. Unparseable origins are skipped.
fn cors(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| {
            HeaderValue::from_str(o)
                .inspect_err(|_| warn!(origin = %o, "ignoring invalid CORS origin"))
                .ok()
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET])
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Departure board for one stop id.
async fn board_by_id<S: DepartureSource + 'static>(
    State(state): State<AppState<S>>,
    query: Result<Query<BoardByIdQuery>, QueryRejection>,
) -> Result<Json<BoardPayload>, AppError> {
    let Query(req) = query?;
    let id = req.stop_place_id.unwrap_or_default();

    let payload = state
        .departures
        .board_by_id(&id, req.time_range, req.number_of_departures)
        .await?;

    Ok(Json(payload))
}

/// Merged departures for every station matching a name.
async fn board_by_name<S: DepartureSource + 'static>(
    State(state): State<AppState<S>>,
    query: Result<Query<BoardByNameQuery>, QueryRejection>,
) -> Result<Json<AggregatePayload>, AppError> {
    let Query(req) = query?;
    let term = req.query.unwrap_or_default();

    let payload = state
        .departures
        .board_by_name(
            &term,
            req.time_range,
            req.number_of_departures,
            req.max_stations,
        )
        .await?;

    Ok(Json(payload))
}

/// Search stops by name.
async fn search_stops<S: DepartureSource + 'static>(
    State(state): State<AppState<S>>,
    query: Result<Query<StopSearchQuery>, QueryRejection>,
) -> Result<Json<Vec<StopSummary>>, AppError> {
    let Query(req) = query?;
    let text = req.query.unwrap_or_default();
    if text.trim().is_empty() {
        return Err(AppError::BadRequest {
            message: "query must not be blank".to_string(),
        });
    }

    let limit = req
        .limit
        .unwrap_or(DEFAULT_SEARCH_LIMIT)
        .min(MAX_SEARCH_LIMIT);
    let resolver = StopResolver::new(state.departures.directory().snapshot().await);

    let stops = resolver
        .search(&text, limit)
        .into_iter()
        .map(StopSummary::from)
        .collect();

    Ok(Json(stops))
}

/// Every known stop, sorted by name.
async fn all_stops<S: DepartureSource + 'static>(
    State(state): State<AppState<S>>,
) -> Json<Vec<StopSummary>> {
    let resolver = StopResolver::new(state.departures.directory().snapshot().await);
    Json(
        resolver
            .all_by_name()
            .into_iter()
            .map(StopSummary::from)
            .collect(),
    )
}

/// Bike-share stations with live availability.
async fn bike_data<S: DepartureSource + 'static>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<Value>>, AppError> {
    let stations = state.bikes.stations().await?;
    Ok(Json(stations.as_ref().clone()))
}

/// Weather forecast for Bergen.
async fn bergen_temp<S: DepartureSource + 'static>(
    State(state): State<AppState<S>>,
) -> Result<Json<Value>, AppError> {
    let forecast = state.weather.forecast().await?;
    Ok(Json(forecast.as_ref().clone()))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Unavailable { message: String },
    Internal { message: String },
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        let message = e.to_string();
        match e {
            ServiceError::InvalidInput(_) => AppError::BadRequest { message },
            ServiceError::NotFound(_) => AppError::NotFound { message },
            ServiceError::UpstreamUnavailable(_) => AppError::Unavailable { message },
            ServiceError::MalformedUpstreamResponse(_) => AppError::Internal { message },
        }
    }
}

impl From<ProxyError> for AppError {
    fn from(e: ProxyError) -> Self {
        AppError::Unavailable {
            message: e.to_string(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(e: QueryRejection) -> Self {
        AppError::BadRequest {
            message: e.body_text(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Unavailable { message } => (StatusCode::SERVICE_UNAVAILABLE, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %message, "request failed");
        } else {
            info!(status = status.as_u16(), error = %message, "request rejected");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
