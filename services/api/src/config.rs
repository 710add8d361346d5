//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// The value shipped in example `.env` files; treated the same as an unset key.
const PLACEHOLDER_API_KEY: &str = "your_openai_api_key_here";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub openai_api_key: Option<String>,
    pub chat_model: String,
    pub quiz_model: String,
    pub sst_model: String,
    pub audio_sample_rate: u32,
    pub session_path: PathBuf,
    pub cors_origin: String,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 3000)),
            log_level: Level::INFO,
            openai_api_key: None,
            chat_model: "gpt-3.5-turbo".to_string(),
            quiz_model: "gpt-3.5-turbo".to_string(),
            sst_model: "whisper-1".to_string(),
            audio_sample_rate: 48_000,
            session_path: PathBuf::from("./.study-assistant/session.json"),
            cors_origin: "http://localhost:3000".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        // --- Server Settings ---
        let bind_address = match lookup("BIND_ADDRESS") {
            Some(raw) => raw.parse::<SocketAddr>().map_err(|e| {
                ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
            })?,
            None => defaults.bind_address,
        };

        let log_level = match lookup("RUST_LOG") {
            Some(raw) => raw.parse::<Level>().map_err(|_| {
                ConfigError::InvalidValue(
                    "RUST_LOG".to_string(),
                    format!("'{}' is not a valid log level", raw),
                )
            })?,
            None => defaults.log_level,
        };

        let cors_origin = lookup("CORS_ORIGIN").unwrap_or(defaults.cors_origin);
        let max_upload_bytes =
            parse_number(&lookup, "MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?;

        // --- Load API Key (as optional) ---
        let openai_api_key = lookup("OPENAI_API_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty() && key != PLACEHOLDER_API_KEY);

        // --- Load Adapter-specific Settings ---
        let chat_model = lookup("CHAT_MODEL").unwrap_or(defaults.chat_model);
        let quiz_model = lookup("QUIZ_MODEL").unwrap_or(defaults.quiz_model);
        let sst_model = lookup("SST_MODEL").unwrap_or(defaults.sst_model);
        let audio_sample_rate =
            parse_number(&lookup, "AUDIO_SAMPLE_RATE", defaults.audio_sample_rate)?;
        let session_path = lookup("SESSION_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.session_path);

        Ok(Self {
            bind_address,
            log_level,
            openai_api_key,
            chat_model,
            quiz_model,
            sst_model,
            audio_sample_rate,
            session_path,
            cors_origin,
            max_upload_bytes,
        })
    }
}

fn parse_number<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => Ok(default),
    }
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
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.bind_address.to_string(), "0.0.0.0:3000");
        assert_eq!(config.chat_model, "gpt-3.5-turbo");
        assert_eq!(config.sst_model, "whisper-1");
        assert_eq!(config.audio_sample_rate, 48_000);
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    fn placeholder_api_key_counts_as_missing() {
        let config =
            Config::from_lookup(lookup_from(&[("OPENAI_API_KEY", "your_openai_api_key_here")]))
                .unwrap();
        assert!(config.openai_api_key.is_none());

        let config = Config::from_lookup(lookup_from(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn invalid_values_are_reported_by_name() {
        let err = Config::from_lookup(lookup_from(&[("BIND_ADDRESS", "nowhere")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key, _) if key == "BIND_ADDRESS"));

        let err = Config::from_lookup(lookup_from(&[("RUST_LOG", "loud")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key, _) if key == "RUST_LOG"));

        let err =
            Config::from_lookup(lookup_from(&[("AUDIO_SAMPLE_RATE", "fast")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key, _) if key == "AUDIO_SAMPLE_RATE"));
    }

    #[test]
    fn overrides_are_respected() {
        let config = Config::from_lookup(lookup_from(&[
            ("CHAT_MODEL", "gpt-4o-mini"),
            ("SESSION_PATH", "/tmp/session.json"),
            ("MAX_UPLOAD_BYTES", "1024"),
        ]))
        .unwrap();
        assert_eq!(config.chat_model, "gpt-4o-mini");
        assert_eq!(config.session_path, PathBuf::from("/tmp/session.json"));
        assert_eq!(config.max_upload_bytes, 1024);
    }
}
