//! Runtime configuration read from the environment.

use std::time::Duration;

use rocketshoes_observability::LogFormat;

pub const DEFAULT_API_URL: &str = "http://localhost:3333";
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Cart client configuration.
///
/// | variable                        | default                 |
/// |---------------------------------|-------------------------|
/// | `ROCKETSHOES_API_URL`           | `http://localhost:3333` |
/// | `ROCKETSHOES_AUTH_TOKEN`        | unset                   |
/// | `ROCKETSHOES_STORAGE_URL`       | OS data dir database    |
/// | `ROCKETSHOES_HTTP_TIMEOUT_SECS` | `10`                    |
/// | `ROCKETSHOES_LOG_FORMAT`        | `json`                  |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    pub api_url: String,
    pub auth_token: Option<String>,
    /// `sqlite:` URL of the local storage; `None` means the default location.
    pub storage_url: Option<String>,
    pub http_timeout: Duration,
    pub log_format: LogFormat,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            auth_token: None,
            storage_url: None,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            log_format: LogFormat::default(),
        }
    }
}

impl CartConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// Blank values count as unset. Unparseable values fall back to the
    /// default and are logged.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let http_timeout = match get("ROCKETSHOES_HTTP_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    tracing::warn!(
                        "ignoring invalid ROCKETSHOES_HTTP_TIMEOUT_SECS={raw:?}, using {}s",
                        defaults.http_timeout.as_secs()
                    );
                    defaults.http_timeout
                }
            },
            None => defaults.http_timeout,
        };

        let log_format = match get("ROCKETSHOES_LOG_FORMAT") {
            Some(raw) => raw.parse().unwrap_or_else(|err| {
                tracing::warn!("ignoring ROCKETSHOES_LOG_FORMAT: {err}");
                defaults.log_format
            }),
            None => defaults.log_format,
        };

        Self {
            api_url: get("ROCKETSHOES_API_URL").unwrap_or(defaults.api_url),
            auth_token: get("ROCKETSHOES_AUTH_TOKEN"),
            storage_url: get("ROCKETSHOES_STORAGE_URL"),
            http_timeout,
            log_format,
        }
    }
}
