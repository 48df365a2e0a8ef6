//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (TITLEFIX_*)
//! 2. TOML config file (if TITLEFIX_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// How HTML parsing is routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserMode {
    /// Probe the in-process parser once at startup and fall back to the delegate.
    #[default]
    Auto,
    /// Always parse in-process.
    Local,
    /// Always parse on the delegate thread.
    Delegate,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (TITLEFIX_*)
/// 2. TOML config file (if TITLEFIX_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite title cache.
    ///
    /// Set via TITLEFIX_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via TITLEFIX_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via TITLEFIX_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via TITLEFIX_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Number of outbound fetches allowed in flight at once.
    ///
    /// Set via TITLEFIX_MAX_CONCURRENT_FETCHES environment variable.
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,

    /// Age in days after which cached titles are swept.
    ///
    /// Set via TITLEFIX_RETENTION_DAYS environment variable.
    #[serde(default = "default_retention_days")]
    pub retention_days: u64,

    /// Seconds between two cache sweeps.
    ///
    /// Set via TITLEFIX_SWEEP_INTERVAL_SECS environment variable.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Parser routing, see [`ParserMode`].
    ///
    /// Set via TITLEFIX_PARSER_MODE environment variable.
    #[serde(default)]
    pub parser_mode: ParserMode,

    /// Language passed to the embed API. Derived from `LANG` when unset.
    ///
    /// Set via TITLEFIX_LANGUAGE environment variable.
    #[serde(default)]
    pub language: Option<String>,

    /// oEmbed endpoint used for status-post lookups.
    ///
    /// Set via TITLEFIX_OEMBED_ENDPOINT environment variable.
    #[serde(default = "default_oembed_endpoint")]
    pub oembed_endpoint: String,

    /// Whether HTTP requests honor the system proxy settings.
    ///
    /// Set via TITLEFIX_USE_SYSTEM_PROXY environment variable.
    #[serde(default = "default_true")]
    pub use_system_proxy: bool,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./titlefix-cache.sqlite")
}

fn default_user_agent() -> String {
    "titlefix/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_max_concurrent_fetches() -> usize {
    3 * 3
}

fn default_retention_days() -> u64 {
    7
}

fn default_sweep_interval_secs() -> u64 {
    24 * 60 * 60
}

fn default_oembed_endpoint() -> String {
    "https://publish.twitter.com/oembed".into()
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            retention_days: default_retention_days(),
            sweep_interval_secs: default_sweep_interval_secs(),
            parser_mode: ParserMode::Auto,
            language: None,
            oembed_endpoint: default_oembed_endpoint(),
            use_system_proxy: true,
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Retention window of the title cache.
    ///
    /// Saturates for day counts past what [`Duration`] can hold; `validate`
    /// rejects those before they reach here.
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_days.saturating_mul(24 * 60 * 60))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Language tag for the embed API.
    ///
    /// Uses `language` when set, otherwise the `LANG` locale (`ja_JP.UTF-8` becomes `ja-JP`),
    /// otherwise `en`.
    pub fn language(&self) -> String {
        if let Some(lang) = self.language.as_deref().filter(|l| !l.trim().is_empty()) {
            return lang.trim().to_string();
        }
        std::env::var("LANG")
            .ok()
            .and_then(|l| locale_to_language_tag(&l))
            .unwrap_or_else(|| "en".into())
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `TITLEFIX_`
    /// 2. TOML file from `TITLEFIX_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("TITLEFIX_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("TITLEFIX_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

/// Convert a POSIX locale such as `ja_JP.UTF-8` into a language tag (`ja-JP`).
fn locale_to_language_tag(locale: &str) -> Option<String> {
    let base = locale.split(['.', '@']).next()?.trim();
    if base.is_empty() || base == "C" || base == "POSIX" {
        return None;
    }
    Some(base.replace('_', "-"))
}
