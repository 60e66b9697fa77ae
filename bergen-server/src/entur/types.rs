//! Entur journey-planner GraphQL response DTOs.
//!
//! These map directly to the JSON the API returns. Everything is `Option`
//! because the API omits or nulls fields freely; validation happens once in
//! `convert`.

use serde::Deserialize;

/// Top-level GraphQL envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse {
    pub data: Option<ResponseData>,
    pub errors: Option<Vec<GraphQlError>>,
}

/// One entry of the GraphQL `errors` array.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseData {
    /// `null` when the id is unknown or the stop place is inactive.
    pub stop_place: Option<StopPlace>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopPlace {
    pub id: Option<String>,
    pub name: Option<String>,
    pub estimated_calls: Option<Vec<EstimatedCall>>,
}

/// One departure event as reported upstream.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimatedCall {
    pub realtime: Option<bool>,
    pub aimed_departure_time: Option<String>,
    pub expected_departure_time: Option<String>,
    pub destination_display: Option<DestinationDisplay>,
    pub service_journey: Option<ServiceJourney>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationDisplay {
    pub front_text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceJourney {
    pub line: Option<LineDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineDto {
    pub id: Option<String>,
    pub name: Option<String>,
    pub transport_mode: Option<String>,
}
