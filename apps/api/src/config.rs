use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::{DEFAULT_BASE_URL, DEFAULT_MODEL};

const DEFAULT_REQUEST_INTERVAL_MS: u64 = 4000;
const DEFAULT_LLM_MAX_RETRIES: usize = 3;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;
const DEFAULT_SESSION_TTL_SECS: u64 = 2 * 60 * 60;

/// Application configuration loaded from environment variables.
/// Fails at startup if a numeric variable cannot be parsed.
#[derive(Clone)]
pub struct Config {
    /// Server-side Gemini key. When absent, every analysis request must carry its own.
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    /// Shared passphrase gating each session. `None` leaves sessions open.
    pub access_code: Option<String>,
    /// Minimum spacing between two consecutive model requests, across all sessions.
    pub request_interval: Duration,
    /// Idle time after which a session and its results are evicted.
    pub session_ttl: Duration,
    pub llm_max_retries: usize,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_base_url: get("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            access_code: get("ACCESS_CODE"),
            request_interval: Duration::from_millis(
                parse_or(get("REQUEST_INTERVAL_MS"), DEFAULT_REQUEST_INTERVAL_MS)
                    .context("REQUEST_INTERVAL_MS must be a whole number of milliseconds")?,
            ),
            session_ttl: Duration::from_secs(
                parse_or(get("SESSION_TTL_SECS"), DEFAULT_SESSION_TTL_SECS)
                    .context("SESSION_TTL_SECS must be a whole number of seconds")?,
            ),
            llm_max_retries: parse_or(get("LLM_MAX_RETRIES"), DEFAULT_LLM_MAX_RETRIES)
                .context("LLM_MAX_RETRIES must be a non-negative integer")?,
            max_upload_bytes: parse_or(get("MAX_UPLOAD_BYTES"), DEFAULT_MAX_UPLOAD_BYTES)
                .context("MAX_UPLOAD_BYTES must be a byte count")?,
            port: parse_or(get("PORT"), 8080u16).context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<T>(value: Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => Ok(raw.trim().parse::<T>()?),
        None => Ok(default),
    }
}

// Secrets stay out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("gemini_api_key", &self.gemini_api_key.as_ref().map(|_| "<redacted>"))
            .field("gemini_model", &self.gemini_model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("access_code", &self.access_code.as_ref().map(|_| "<redacted>"))
            .field("request_interval", &self.request_interval)
            .field("session_ttl", &self.session_ttl)
            .field("llm_max_retries", &self.llm_max_retries)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("port", &self.port)
            .field("rust_log", &self.rust_log)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert!(config.gemini_api_key.is_none());
        assert!(config.access_code.is_none());
        assert_eq!(config.gemini_model, DEFAULT_MODEL);
        assert_eq!(config.gemini_base_url, DEFAULT_BASE_URL);
        assert_eq!(config.request_interval, Duration::from_millis(4000));
        assert_eq!(config.session_ttl, Duration::from_secs(7200));
        assert_eq!(config.llm_max_retries, 3);
        assert_eq!(config.max_upload_bytes, 25 * 1024 * 1024);
        assert_eq!(config.port, 8080);
        assert_eq!(config.rust_log, "info");
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = config_from(&[("ACCESS_CODE", "  "), ("GEMINI_API_KEY", "")]).unwrap();
        assert!(config.access_code.is_none());
        assert!(config.gemini_api_key.is_none());
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = config_from(&[
            ("GEMINI_API_KEY", "key-123"),
            ("ACCESS_CODE", "open-sesame"),
            ("REQUEST_INTERVAL_MS", "250"),
            ("SESSION_TTL_SECS", "90"),
            ("PORT", "9000"),
        ])
        .unwrap();
        assert_eq!(config.session_ttl, Duration::from_secs(90));
        assert_eq!(config.gemini_api_key.as_deref(), Some("key-123"));
        assert_eq!(config.access_code.as_deref(), Some("open-sesame"));
        assert_eq!(config.request_interval, Duration::from_millis(250));
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_invalid_port_fails_with_context() {
        let err = config_from(&[("PORT", "not-a-port")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = config_from(&[("GEMINI_API_KEY", "super-secret"), ("ACCESS_CODE", "hunter2")])
            .unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
