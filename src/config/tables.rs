use super::defaults;
use super::models::{AppConfig, LogLevel};
use serde::Deserialize;
use std::collections::BTreeMap;

/// On-disk layout of `conf/config.toml`: one table per concern.
#[derive(Debug, Clone, Default, Deserialize, serde::Serialize)]
pub(super) struct ConfigTables {
    #[serde(default)]
    api: ApiConfig,
    #[serde(default)]
    languages: LanguagesConfig,
    #[serde(default)]
    search: SearchConfig,
    #[serde(default)]
    narration: NarrationConfig,
    #[serde(default)]
    reading: ReadingConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

impl From<ConfigTables> for AppConfig {
    fn from(tables: ConfigTables) -> Self {
        AppConfig {
            api_base_url: tables.api.base_url,
            api_timeout_secs: tables.api.timeout_secs,
            example_limit: tables.api.example_limit,
            source_language: tables.languages.source,
            target_language: tables.languages.target,
            corpus_language: tables.languages.corpus,
            discard_stale_searches: tables.search.discard_stale_searches,
            narration_rate: tables.narration.rate,
            narration_command: tables.narration.command,
            narration_locales: tables.narration.locales,
            scroll_cooldown_ms: tables.reading.scroll_cooldown_ms,
            log_level: tables.logging.log_level,
        }
    }
}

impl From<&AppConfig> for ConfigTables {
    fn from(config: &AppConfig) -> Self {
        ConfigTables {
            api: ApiConfig {
                base_url: config.api_base_url.clone(),
                timeout_secs: config.api_timeout_secs,
                example_limit: config.example_limit,
            },
            languages: LanguagesConfig {
                source: config.source_language.clone(),
                target: config.target_language.clone(),
                corpus: config.corpus_language.clone(),
            },
            search: SearchConfig {
                discard_stale_searches: config.discard_stale_searches,
            },
            narration: NarrationConfig {
                rate: config.narration_rate,
                command: config.narration_command.clone(),
                locales: config.narration_locales.clone(),
            },
            reading: ReadingConfig {
                scroll_cooldown_ms: config.scroll_cooldown_ms,
            },
            logging: LoggingConfig {
                log_level: config.log_level,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct ApiConfig {
    #[serde(default = "defaults::default_api_base_url")]
    base_url: String,
    #[serde(default = "defaults::default_api_timeout_secs")]
    timeout_secs: u64,
    #[serde(default = "defaults::default_example_limit")]
    example_limit: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: defaults::default_api_base_url(),
            timeout_secs: defaults::default_api_timeout_secs(),
            example_limit: defaults::default_example_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct LanguagesConfig {
    #[serde(default = "defaults::default_source_language")]
    source: String,
    #[serde(default = "defaults::default_target_language")]
    target: String,
    #[serde(default = "defaults::default_corpus_language")]
    corpus: String,
}

impl Default for LanguagesConfig {
    fn default() -> Self {
        LanguagesConfig {
            source: defaults::default_source_language(),
            target: defaults::default_target_language(),
            corpus: defaults::default_corpus_language(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct SearchConfig {
    #[serde(default = "defaults::default_discard_stale_searches")]
    discard_stale_searches: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            discard_stale_searches: defaults::default_discard_stale_searches(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct NarrationConfig {
    #[serde(default = "defaults::default_narration_rate")]
    rate: f32,
    #[serde(default = "defaults::default_narration_command")]
    command: String,
    #[serde(default = "defaults::default_narration_locales")]
    locales: BTreeMap<String, String>,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        NarrationConfig {
            rate: defaults::default_narration_rate(),
            command: defaults::default_narration_command(),
            locales: defaults::default_narration_locales(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct ReadingConfig {
    #[serde(default = "defaults::default_scroll_cooldown_ms")]
    scroll_cooldown_ms: u64,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        ReadingConfig {
            scroll_cooldown_ms: defaults::default_scroll_cooldown_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    log_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_level: defaults::default_log_level(),
        }
    }
}
