//! Thin pass-through proxies for the dashboard's bike and weather panels.
//!
//! Both upstreams ask for an identifying `User-Agent`, and both are cached
//! briefly so the dashboard can poll freely.

mod bike;
mod error;
mod weather;

pub use bike::{BikeClient, BikeConfig, merge_stations};
pub use error::ProxyError;
pub use weather::{WeatherClient, WeatherConfig};

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

/// Build an HTTP client that identifies itself with `user_agent`.
fn http_client(user_agent: &str, timeout: Duration) -> Result<reqwest::Client, ProxyError> {
    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(user_agent)
        .map_err(|_| ProxyError::NotConfigured("invalid User-Agent value".to_string()))?;
    headers.insert(USER_AGENT, value);

    Ok(reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()?)
}

/// GET `url` and decode the body as JSON.
async fn get_json(
    http: &reqwest::Client,
    upstream: &'static str,
    url: &str,
) -> Result<serde_json::Value, ProxyError> {
    let response = http.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ProxyError::Status {
            upstream,
            status: status.as_u16(),
        });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ProxyError::Malformed {
        upstream,
        message: e.to_string(),
    })
}
