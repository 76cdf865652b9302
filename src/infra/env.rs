use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretBox;

use tc_base::{ConfigError, Endpoint};

use super::constants::*;

/// Everything read from the environment at startup.
#[derive(Debug)]
pub struct AppConfig {
    pub endpoint: Endpoint,
    pub log_dir: PathBuf,
    pub log_filter: String,
}

impl AppConfig {
    /// Read `.env` (if any) and then the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env(|key| std::env::var(key).ok())
    }

    /// Build from a variable lookup. Blank values count as unset.
    pub fn from_env<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = get(ENV_API_KEY).ok_or(ConfigError::Missing(ENV_API_KEY))?;
        let url = get(ENV_URL).ok_or(ConfigError::Missing(ENV_URL))?;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                var: ENV_URL,
                value: url,
                reason: "expected an http:// or https:// URL".to_string(),
            });
        }

        let model = get(ENV_MODEL).unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let timeout_secs = match get(ENV_REQUEST_TIMEOUT) {
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: ENV_REQUEST_TIMEOUT,
                        value: raw,
                        reason: "expected a positive number of seconds".to_string(),
                    });
                }
            },
        };

        Ok(Self {
            endpoint: Endpoint {
                url,
                api_key: SecretBox::new(Box::new(api_key)),
                model,
                timeout: Duration::from_secs(timeout_secs),
            },
            log_dir: get(ENV_LOG_DIR).map(PathBuf::from).unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR)),
            log_filter: get(ENV_LOG_FILTER).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }
}
