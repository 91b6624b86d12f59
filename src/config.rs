//! Configuration file parser for ~/.config/truelens/config.toml.
//!
//! The config file is optional: a missing or empty file yields
//! `Config::default()`. Unknown keys are ignored by serde, but each one is
//! logged as a warning since it is usually a typo.
//!
//! The backend base URL is resolved with the precedence
//! CLI flag > `TRUELENS_API_BASE_URL` > config file > built-in default.
use crate::api::DEFAULT_API_BASE_URL;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding the configured backend base URL.
pub const API_BASE_URL_ENV: &str = "TRUELENS_API_BASE_URL";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("HOME environment variable not set")]
    NoHome,
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// How overlapping analysis responses are applied to the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseOrder {
    /// Every response is applied when it arrives; the last to resolve wins.
    #[default]
    LastResolved,
    /// Responses older than the newest applied request are discarded.
    LatestIssued,
}

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend base URL. `None` defers to the env var or the default.
    pub api_base_url: Option<String>,

    /// Ordering policy for overlapping analysis responses.
    pub response_order: ResponseOrder,

    /// Custom keybinding overrides. Keys are action names, values are key strings.
    pub keybindings: HashMap<String, String>,
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = ["api_base_url", "response_order", "keybindings"];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            response_order = ?config.response_order,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Resolve the backend base URL from CLI, environment and file, in that order.
    ///
    /// The winner must be an absolute `http` or `https` URL.
    pub fn resolve_base_url(
        &self,
        cli: Option<&str>,
        env: Option<&str>,
    ) -> Result<String, ConfigError> {
        let candidate = non_blank(cli)
            .or_else(|| non_blank(env))
            .or_else(|| non_blank(self.api_base_url.as_deref()))
            .unwrap_or(DEFAULT_API_BASE_URL);

        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            url: candidate.to_string(),
            reason,
        };
        let parsed = url::Url::parse(candidate).map_err(|e| invalid(e.to_string()))?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => return Err(invalid(format!("unsupported scheme '{}'", other))),
        }
        if parsed.host_str().is_none() {
            return Err(invalid("missing host".to_string()));
        }

        Ok(candidate.trim_end_matches('/').to_string())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Get the config directory path (~/.config/truelens/).
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let home = std::env::var("HOME").map_err(|_| ConfigError::NoHome)?;
    Ok(PathBuf::from(home).join(".config").join("truelens"))
}

// ============================================================================
// Tests
// ============================================================================
