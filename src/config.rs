//! Application Configuration
//!
//! Read once at startup and injected into the API client. A CSR bundle has no
//! process environment at runtime, so values are baked in at build time
//! (`SMART_LIFE_API_URL=... trunk build`).

use crate::api::RetryPolicy;

pub const API_URL_KEY: &str = "SMART_LIFE_API_URL";
pub const SECRET_KEY_KEY: &str = "SMART_LIFE_SECRET_KEY";
pub const TIMEOUT_KEY: &str = "SMART_LIFE_TIMEOUT_MS";
pub const RETRIES_KEY: &str = "SMART_LIFE_RETRIES";

pub const DEFAULT_API_URL: &str = "https://smart-life-os.onrender.com";
pub const DEFAULT_TIMEOUT_MS: u32 = 15_000;
pub const DEFAULT_NOTICE_MS: u32 = 6_000;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be a positive number, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
    #[error("{key} must be an http(s) URL, got {value:?}")]
    InvalidUrl { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Origin of the remote API, without trailing slash
    pub api_base_url: String,
    /// Sent as `Authorization: Bearer <secret_key>`
    pub secret_key: String,
    pub request_timeout_ms: u32,
    pub retry: RetryPolicy,
    /// How long an error banner stays up
    pub notice_timeout_ms: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            secret_key: String::new(),
            request_timeout_ms: DEFAULT_TIMEOUT_MS,
            retry: RetryPolicy::default(),
            notice_timeout_ms: DEFAULT_NOTICE_MS,
        }
    }
}

impl AppConfig {
    /// Configuration baked in by the build environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| {
            let value = match key {
                API_URL_KEY => option_env!("SMART_LIFE_API_URL"),
                SECRET_KEY_KEY => option_env!("SMART_LIFE_SECRET_KEY"),
                TIMEOUT_KEY => option_env!("SMART_LIFE_TIMEOUT_MS"),
                RETRIES_KEY => option_env!("SMART_LIFE_RETRIES"),
                _ => None,
            };
            value.map(str::to_string)
        })
    }

    /// Build from any key/value source; unset or blank keys keep defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = AppConfig::default();

        if let Some(url) = get(API_URL_KEY) {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl { key: API_URL_KEY, value: url });
            }
            config.api_base_url = url.trim_end_matches('/').to_string();
        }

        if let Some(secret) = get(SECRET_KEY_KEY) {
            config.secret_key = secret;
        } else {
            log::warn!("[CONFIG] {} is not set; the API will reject requests", SECRET_KEY_KEY);
        }

        if let Some(raw) = get(TIMEOUT_KEY) {
            config.request_timeout_ms = parse_positive(TIMEOUT_KEY, &raw)?;
        }

        if let Some(raw) = get(RETRIES_KEY) {
            config.retry.max_attempts = parse_positive(RETRIES_KEY, &raw)?;
        }

        Ok(config)
    }
}

fn parse_positive(key: &'static str, raw: &str) -> Result<u32, ConfigError> {
    match raw.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber { key, value: raw.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).expect("defaults are valid");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.api_base_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_values_are_trimmed_and_applied() {
        let config = AppConfig::from_lookup(lookup(&[
            (API_URL_KEY, " http://localhost:5000/ "),
            (SECRET_KEY_KEY, "s3cret"),
            (TIMEOUT_KEY, "2500"),
            (RETRIES_KEY, "4"),
        ]))
        .expect("valid config");

        assert_eq!(config.api_base_url, "http://localhost:5000");
        assert_eq!(config.secret_key, "s3cret");
        assert_eq!(config.request_timeout_ms, 2500);
        assert_eq!(config.retry.max_attempts, 4);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert_eq!(
            AppConfig::from_lookup(lookup(&[(API_URL_KEY, "localhost:5000")])),
            Err(ConfigError::InvalidUrl { key: API_URL_KEY, value: "localhost:5000".to_string() })
        );
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[(TIMEOUT_KEY, "0")])),
            Err(ConfigError::InvalidNumber { key: TIMEOUT_KEY, .. })
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[(RETRIES_KEY, "many")])),
            Err(ConfigError::InvalidNumber { key: RETRIES_KEY, .. })
        ));
    }
}
