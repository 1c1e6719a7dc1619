use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// High-level session configuration; deserializable from TOML.
#[derive(Debug, Clone, Deserialize, serde::Serialize, PartialEq)]
pub struct AppConfig {
    #[serde(default = "crate::config::defaults::default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "crate::config::defaults::default_api_timeout_secs")]
    pub api_timeout_secs: u64,
    #[serde(default = "crate::config::defaults::default_example_limit")]
    pub example_limit: usize,
    #[serde(default = "crate::config::defaults::default_source_language")]
    pub source_language: String,
    #[serde(default = "crate::config::defaults::default_target_language")]
    pub target_language: String,
    #[serde(default = "crate::config::defaults::default_corpus_language")]
    pub corpus_language: String,
    #[serde(default = "crate::config::defaults::default_discard_stale_searches")]
    pub discard_stale_searches: bool,
    #[serde(default = "crate::config::defaults::default_narration_rate")]
    pub narration_rate: f32,
    #[serde(default = "crate::config::defaults::default_narration_command")]
    pub narration_command: String,
    #[serde(default = "crate::config::defaults::default_narration_locales")]
    pub narration_locales: BTreeMap<String, String>,
    #[serde(default = "crate::config::defaults::default_scroll_cooldown_ms")]
    pub scroll_cooldown_ms: u64,
    #[serde(default = "crate::config::defaults::default_log_level")]
    pub log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            api_base_url: crate::config::defaults::default_api_base_url(),
            api_timeout_secs: crate::config::defaults::default_api_timeout_secs(),
            example_limit: crate::config::defaults::default_example_limit(),
            source_language: crate::config::defaults::default_source_language(),
            target_language: crate::config::defaults::default_target_language(),
            corpus_language: crate::config::defaults::default_corpus_language(),
            discard_stale_searches: crate::config::defaults::default_discard_stale_searches(),
            narration_rate: crate::config::defaults::default_narration_rate(),
            narration_command: crate::config::defaults::default_narration_command(),
            narration_locales: crate::config::defaults::default_narration_locales(),
            scroll_cooldown_ms: crate::config::defaults::default_scroll_cooldown_ms(),
            log_level: crate::config::defaults::default_log_level(),
        }
    }
}

impl AppConfig {
    pub fn scroll_cooldown(&self) -> Duration {
        Duration::from_millis(self.scroll_cooldown_ms)
    }

    /// HTTP timeout handed to the API client; `None` leaves requests unbounded.
    pub fn api_timeout(&self) -> Option<Duration> {
        (self.api_timeout_secs > 0).then(|| Duration::from_secs(self.api_timeout_secs))
    }

    /// Speech rate clamped to the range platform engines accept.
    pub fn narration_rate_clamped(&self) -> f32 {
        if self.narration_rate.is_finite() {
            self.narration_rate.clamp(0.1, 4.0)
        } else {
            crate::config::defaults::default_narration_rate()
        }
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Debug
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
