//! Process configuration read from the environment

use crate::fetch::DEFAULT_OCR_MODEL;
use crate::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::transcript::DEFAULT_MAX_HISTORY;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_COMMAND_PREFIX: &str = "!";
pub const DEFAULT_MAX_MESSAGE_CHARACTERS: usize = 2000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_PORT: u16 = 8000;

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub ocr_model: String,
    /// When set, inbound requests must carry this bearer token
    pub platform_token: Option<String>,
    pub command_prefix: String,
    pub max_history: usize,
    pub max_message_characters: usize,
    pub request_timeout: Duration,
    pub search_query_information: Option<PathBuf>,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            api_key: var("MISTRAL_API_KEY"),
            base_url: var("MISTRAL_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: var("MISTRAL_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            ocr_model: var("MISTRAL_OCR_MODEL").unwrap_or_else(|| DEFAULT_OCR_MODEL.to_string()),
            platform_token: var("PLATFORM_TOKEN"),
            command_prefix: var("COMMAND_PREFIX")
                .unwrap_or_else(|| DEFAULT_COMMAND_PREFIX.to_string()),
            max_history: parse_or("MAX_HISTORY", var("MAX_HISTORY"), DEFAULT_MAX_HISTORY),
            max_message_characters: parse_or(
                "MAX_MESSAGE_CHARACTERS",
                var("MAX_MESSAGE_CHARACTERS"),
                DEFAULT_MAX_MESSAGE_CHARACTERS,
            ),
            request_timeout: Duration::from_secs(parse_or(
                "REQUEST_TIMEOUT_SECS",
                var("REQUEST_TIMEOUT_SECS"),
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )),
            search_query_information: var("SEARCH_QUERY_INFORMATION").map(PathBuf::from),
            port: parse_or("PORT", var("PORT"), DEFAULT_PORT),
        }
    }
}

/// Parse a positive number, falling back to `default` with a warning
fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr + PartialOrd + Default + Copy + std::fmt::Display,
{
    let Some(raw) = raw else {
        return default;
    };

    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => value,
        _ => {
            tracing::warn!(key, value = %raw, default = %default, "Invalid numeric setting, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.api_key, None);
        assert_eq!(config.base_url, "https://api.mistral.ai");
        assert_eq!(config.model, "mistral-large-latest");
        assert_eq!(config.ocr_model, "mistral-ocr-latest");
        assert_eq!(config.platform_token, None);
        assert_eq!(config.command_prefix, "!");
        assert_eq!(config.max_history, 10);
        assert_eq!(config.max_message_characters, 2000);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.search_query_information, None);
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("MISTRAL_API_KEY", "secret"),
            ("MISTRAL_BASE_URL", "http://localhost:9000"),
            ("PLATFORM_TOKEN", "platform"),
            ("COMMAND_PREFIX", "?"),
            ("MAX_HISTORY", "4"),
            ("MAX_MESSAGE_CHARACTERS", "500"),
            ("REQUEST_TIMEOUT_SECS", "5"),
            ("SEARCH_QUERY_INFORMATION", "/etc/search.txt"),
            ("PORT", "9090"),
        ]);
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.platform_token.as_deref(), Some("platform"));
        assert_eq!(config.command_prefix, "?");
        assert_eq!(config.max_history, 4);
        assert_eq!(config.max_message_characters, 500);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(
            config.search_query_information,
            Some(PathBuf::from("/etc/search.txt"))
        );
        assert_eq!(config.port, 9090);
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = config_from(&[
            ("MAX_HISTORY", "lots"),
            ("MAX_MESSAGE_CHARACTERS", "0"),
            ("REQUEST_TIMEOUT_SECS", "-3"),
            ("PORT", "99999"),
        ]);
        assert_eq!(config.max_history, 10);
        assert_eq!(config.max_message_characters, 2000);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = config_from(&[("MISTRAL_API_KEY", "  "), ("PLATFORM_TOKEN", "")]);
        assert_eq!(config.api_key, None);
        assert_eq!(config.platform_token, None);
    }
}
