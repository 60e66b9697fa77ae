//! Server configuration from environment variables.
//!
//! Every variable is optional. Unset or empty variables take the default;
//! set but unparseable numbers are an error so a typo doesn't silently fall
//! back to a default.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::entur::EnturConfig;
use crate::proxy::{BikeConfig, WeatherConfig};
use crate::stops::{GtfsImporterConfig, StopCacheConfig};

/// Origin of the Vite dev server, always allowed by CORS.
pub const DEV_FRONTEND_ORIGIN: &str = "http://localhost:5173";

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_CLIENT_NAME: &str = "student/Bergen-app";
const DEFAULT_USER_AGENT: &str = "bergen-server/0.1 github.com/bergen-collection";
const DEFAULT_REFRESH_HOUR: u32 = 14;

/// Errors loading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} is not a valid {expected}: '{value}'")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Everything `main` needs to wire the server together.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub client_name: String,
    pub entur_url: Option<String>,
    pub entur_timeout_secs: Option<u64>,
    pub gtfs_url: Option<String>,
    pub data_dir: PathBuf,
    /// Local hour (Europe/Oslo) of the daily stop refresh.
    pub stop_refresh_hour: u32,
    /// Allowed CORS origins, the dev server first.
    pub frontend_origins: Vec<String>,
    pub user_agent: String,
    /// Directory of built frontend assets to serve, if any.
    pub static_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using `lookup` to read variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port: u16 = parse(&var, "PORT", "port number")?.unwrap_or(DEFAULT_PORT);
        let ip: IpAddr = parse(&var, "BIND_ADDR", "IP address")?
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

        let stop_refresh_hour: u32 =
            parse(&var, "STOP_REFRESH_HOUR", "hour")?.unwrap_or(DEFAULT_REFRESH_HOUR);
        if stop_refresh_hour > 23 {
            return Err(ConfigError::Invalid {
                name: "STOP_REFRESH_HOUR",
                value: stop_refresh_hour.to_string(),
                expected: "hour (0-23)",
            });
        }

        let entur_timeout_secs: Option<u64> =
            parse(&var, "ENTUR_TIMEOUT_SECS", "number of seconds")?;
        if entur_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid {
                name: "ENTUR_TIMEOUT_SECS",
                value: "0".to_string(),
                expected: "timeout of at least 1 second",
            });
        }

        let mut frontend_origins = vec![DEV_FRONTEND_ORIGIN.to_string()];
        if let Some(origins) = var("FRONTEND_ORIGIN") {
            frontend_origins.extend(
                origins
                    .split(',')
                    .map(|o| o.trim().trim_end_matches('/').to_string())
                    .filter(|o| !o.is_empty() && o != DEV_FRONTEND_ORIGIN),
            );
        }

        Ok(Self {
            bind: SocketAddr::new(ip, port),
            client_name: var("ET_CLIENT_NAME").unwrap_or_else(|| DEFAULT_CLIENT_NAME.to_string()),
            entur_url: var("ENTUR_URL"),
            entur_timeout_secs,
            gtfs_url: var("GTFS_URL"),
            data_dir: var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join("bergenapp")),
            stop_refresh_hour,
            frontend_origins,
            user_agent: var("USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            static_dir: var("STATIC_DIR").map(PathBuf::from),
        })
    }

    pub fn entur(&self) -> EnturConfig {
        let mut config = EnturConfig::new(&self.client_name);
        if let Some(url) = &self.entur_url {
            config = config.with_base_url(url);
        }
        if let Some(secs) = self.entur_timeout_secs {
            config = config.with_timeout(secs);
        }
        config
    }

    pub fn gtfs(&self) -> GtfsImporterConfig {
        let config = GtfsImporterConfig::new(&self.user_agent);
        match &self.gtfs_url {
            Some(url) => config.with_feed_url(url),
            None => config,
        }
    }

    pub fn stop_cache(&self) -> StopCacheConfig {
        StopCacheConfig::new(self.data_dir.join("stops.json"))
    }

    pub fn bike(&self) -> BikeConfig {
        BikeConfig::new(&self.user_agent)
    }

    pub fn weather(&self) -> WeatherConfig {
        WeatherConfig::new(&self.user_agent)
    }
}

/// Parse an optional variable, naming it in the error.
fn parse<T, V>(var: &V, name: &'static str, expected: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    V: Fn(&str) -> Option<String>,
{
    var(name)
        .map(|value| {
            value.parse().map_err(|_| ConfigError::Invalid {
                name,
                value,
                expected,
            })
        })
        .transpose()
}
