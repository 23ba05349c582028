use std::{env, time::Duration};
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    pub api_base_url: String,
    pub port: u16,
    pub request_timeout: Option<Duration>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            port: DEFAULT_PORT,
            request_timeout: None,
        }
    }
}

impl PortalConfig {
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = normalize_base_url(&url.into());
        self
    }
}

pub fn resolve_config() -> Result<PortalConfig, ConfigError> {
    resolve_config_from(|name| env::var(name).ok())
}

/// Builds the config from an arbitrary variable lookup so tests never touch
/// the process environment.
pub fn resolve_config_from(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<PortalConfig, ConfigError> {
    let mut config = PortalConfig::default();

    if let Some(url) = lookup("ALUMNILINK_API_URL").filter(|v| !v.trim().is_empty()) {
        config.api_base_url = normalize_base_url(&url);
    }

    if let Some(port) = lookup("PORT") {
        config.port = port.trim().parse().map_err(|_| ConfigError::Invalid {
            name: "PORT",
            expected: "port number",
            value: port.clone(),
        })?;
    }

    if let Some(secs) = lookup("ALUMNILINK_REQUEST_TIMEOUT_SECS") {
        let parsed: u64 = secs.trim().parse().map_err(|_| ConfigError::Invalid {
            name: "ALUMNILINK_REQUEST_TIMEOUT_SECS",
            expected: "number of seconds",
            value: secs.clone(),
        })?;
        config.request_timeout = (parsed > 0).then(|| Duration::from_secs(parsed));
    }

    Ok(config)
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
