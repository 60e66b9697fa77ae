//! The departure board query.
//!
//! The query text is fixed; the station id and limits travel as GraphQL
//! variables, so user input never becomes part of the query document.

use serde::Serialize;

use crate::domain::StopId;

/// Departure board for one stop place.
pub const DEPARTURES_QUERY: &str = r#"query Departures($id: String!, $timeRange: Int!, $numberOfDepartures: Int!) {
  stopPlace(id: $id) {
    id
    name
    estimatedCalls(timeRange: $timeRange, numberOfDepartures: $numberOfDepartures) {
      realtime
      aimedDepartureTime
      expectedDepartureTime
      destinationDisplay {
        frontText
      }
      serviceJourney {
        line {
          id
          name
          transportMode
        }
      }
    }
  }
}"#;

/// POST body for [`DEPARTURES_QUERY`].
#[derive(Debug, Serialize)]
pub struct DeparturesRequest<'a> {
    pub query: &'static str,
    pub variables: DeparturesVariables<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeparturesVariables<'a> {
    pub id: &'a str,
    pub time_range: u32,
    pub number_of_departures: u32,
}

impl<'a> DeparturesRequest<'a> {
    pub fn new(station: &'a StopId, time_range_secs: u32, max_departures: u32) -> Self {
        Self {
            query: DEPARTURES_QUERY,
            variables: DeparturesVariables {
                id: station.as_str(),
                time_range: time_range_secs,
                number_of_departures: max_departures,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_uses_variables() {
        let id = StopId::parse("NSR:StopPlace:62356").unwrap();
        let body = serde_json::to_value(DeparturesRequest::new(&id, 7200, 15)).unwrap();

        assert_eq!(body["variables"]["id"], "NSR:StopPlace:62356");
        assert_eq!(body["variables"]["timeRange"], 7200);
        assert_eq!(body["variables"]["numberOfDepartures"], 15);

        let query = body["query"].as_str().unwrap();
        assert!(!query.contains("62356"));
        assert!(query.contains("stopPlace(id: $id)"));
    }
}
