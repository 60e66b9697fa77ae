//! MET Norway location forecast proxy.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use serde_json::Value;
use tracing::debug;

use super::error::ProxyError;
use super::{get_json, http_client};

const DEFAULT_BASE_URL: &str = "https://api.met.no/weatherapi/locationforecast/2.0/compact";

const UPSTREAM: &str = "MET";

/// Configuration for the weather proxy.
#[derive(Debug, Clone)]
pub struct WeatherConfig {
    /// MET rejects requests without an identifying User-Agent.
    pub user_agent: String,
    pub base_url: String,
    pub lat: f64,
    pub lon: f64,
    pub ttl: Duration,
    pub timeout: Duration,
}

impl WeatherConfig {
    /// Forecast for central Bergen.
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            lat: 60.3913,
            lon: 5.3221,
            ttl: Duration::from_secs(5 * 60),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Full request URL. MET asks for at most four decimals.
    pub fn url(&self) -> String {
        format!("{}?lat={:.4}&lon={:.4}", self.base_url, self.lat, self.lon)
    }
}

/// Fetches the compact forecast and passes it through unchanged.
pub struct WeatherClient {
    http: reqwest::Client,
    url: String,
    forecast: MokaCache<(), Arc<Value>>,
}

impl WeatherClient {
    pub fn new(config: WeatherConfig) -> Result<Self, ProxyError> {
        let http = http_client(&config.user_agent, config.timeout)?;
        let forecast = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(1)
            .build();

        Ok(Self {
            http,
            url: config.url(),
            forecast,
        })
    }

    /// Forecast document, from cache when fresh.
    pub async fn forecast(&self) -> Result<Arc<Value>, ProxyError> {
        if let Some(cached) = self.forecast.get(&()).await {
            return Ok(cached);
        }

        let doc = Arc::new(get_json(&self.http, UPSTREAM, &self.url).await?);
        debug!(url = %self.url, "forecast refreshed");

        self.forecast.insert((), Arc::clone(&doc)).await;
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, http::HeaderMap, http::StatusCode, routing::get};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/compact")
    }

    #[test]
    fn url_has_coordinates() {
        let config = WeatherConfig::new("test/bergen");
        assert_eq!(
            config.url(),
            "https://api.met.no/weatherapi/locationforecast/2.0/compact?lat=60.3913&lon=5.3221"
        );
    }

    #[tokio::test]
    async fn passes_document_through_with_user_agent() {
        let app = Router::new().route(
            "/compact",
            get(|headers: HeaderMap| async move {
                let ua = headers
                    .get("user-agent")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                axum::Json(serde_json::json!({"type": "Feature", "ua": ua}))
            }),
        );
        let url = serve(app).await;

        let client =
            WeatherClient::new(WeatherConfig::new("bergen-test/1.0").with_base_url(url)).unwrap();
        let doc = client.forecast().await.unwrap();

        assert_eq!(doc["type"], "Feature");
        assert_eq!(doc["ua"], "bergen-test/1.0");
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let app = Router::new().route("/compact", get(|| async { StatusCode::FORBIDDEN }));
        let url = serve(app).await;

        let client = WeatherClient::new(WeatherConfig::new("x").with_base_url(url)).unwrap();
        let err = client.forecast().await.unwrap_err();

        assert!(matches!(err, ProxyError::Status { status: 403, .. }));
    }

    #[test]
    fn invalid_user_agent_rejected() {
        let result = WeatherClient::new(WeatherConfig::new("bad\nagent"));
        assert!(matches!(result, Err(ProxyError::NotConfigured(_))));
    }
}
