//! Environment-driven configuration
//!
//! Binaries call `dotenv::dotenv()` first, so a `.env` file works too.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::agent::ReplyPacing;
use crate::error::AssistantError;
use crate::Result;

pub const DEFAULT_USER_ID: &str = "default_user";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DELAY_MS: u64 = 500;
const DEFAULT_JITTER_MS: u64 = 300;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Which chat backend answers `process_message`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    Mock,
    Remote,
}

impl FromStr for BackendMode {
    type Err = AssistantError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mock" | "local" => Ok(BackendMode::Mock),
            "remote" | "http" => Ok(BackendMode::Remote),
            other => Err(AssistantError::ConfigError(format!(
                "Unknown CHAT_BACKEND '{}', expected 'mock' or 'remote'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub backend: BackendMode,
    pub backend_url: Option<String>,
    pub backend_timeout: Duration,
    pub reply_delay: Duration,
    pub reply_jitter: Duration,
    /// Sentinel used when a caller omits `user_id`.
    pub default_user_id: String,
    pub port: u16,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            backend: BackendMode::Mock,
            backend_url: None,
            backend_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            reply_delay: Duration::from_millis(DEFAULT_DELAY_MS),
            reply_jitter: Duration::from_millis(DEFAULT_JITTER_MS),
            default_user_id: DEFAULT_USER_ID.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl AssistantConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let backend = match lookup("CHAT_BACKEND") {
            Some(value) => value.parse()?,
            None => defaults.backend,
        };

        let backend_url = lookup("CHAT_BACKEND_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        if backend == BackendMode::Remote && backend_url.is_none() {
            return Err(AssistantError::ConfigError(
                "CHAT_BACKEND=remote requires CHAT_BACKEND_URL".to_string(),
            ));
        }

        let port = match lookup("PORT").or_else(|| lookup("API_PORT")) {
            Some(value) => parse_number::<u16>("PORT", &value)?,
            None => defaults.port,
        };

        Ok(Self {
            backend,
            backend_url,
            backend_timeout: Duration::from_secs(parse_or(
                &lookup,
                "CHAT_BACKEND_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
            reply_delay: Duration::from_millis(parse_or(&lookup, "REPLY_DELAY_MS", DEFAULT_DELAY_MS)?),
            reply_jitter: Duration::from_millis(parse_or(&lookup, "REPLY_JITTER_MS", DEFAULT_JITTER_MS)?),
            default_user_id: lookup("DEFAULT_USER_ID")
                .filter(|id| !id.trim().is_empty())
                .unwrap_or(defaults.default_user_id),
            port,
        })
    }

    pub fn pacing(&self) -> ReplyPacing {
        ReplyPacing::new(self.reply_delay, self.reply_jitter)
    }
}

fn parse_or<F>(lookup: &F, key: &str, default: u64) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => parse_number(key, &value),
        None => Ok(default),
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse::<T>().map_err(|_| {
        AssistantError::ConfigError(format!("{} must be a non-negative integer, got '{}'", key, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AssistantConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.backend, BackendMode::Mock);
        assert_eq!(config.default_user_id, "default_user");
        assert_eq!(config.reply_delay, Duration::from_millis(500));
        assert_eq!(config.reply_jitter, Duration::from_millis(300));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_remote_requires_url() {
        let err = AssistantConfig::from_lookup(lookup_from(&[("CHAT_BACKEND", "remote")]))
            .unwrap_err();
        assert!(matches!(err, AssistantError::ConfigError(_)));

        let config = AssistantConfig::from_lookup(lookup_from(&[
            ("CHAT_BACKEND", "remote"),
            ("CHAT_BACKEND_URL", "http://localhost:9000/"),
        ]))
        .unwrap();
        assert_eq!(config.backend, BackendMode::Remote);
        assert_eq!(config.backend_url.as_deref(), Some("http://localhost:9000"));
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        let err = AssistantConfig::from_lookup(lookup_from(&[("REPLY_DELAY_MS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("REPLY_DELAY_MS"));

        assert!(AssistantConfig::from_lookup(lookup_from(&[("CHAT_BACKEND", "gpt")])).is_err());
    }

    #[test]
    fn test_api_port_fallback() {
        let config = AssistantConfig::from_lookup(lookup_from(&[("API_PORT", "9191")])).unwrap();
        assert_eq!(config.port, 9191);
    }
}
