use super::models::AppConfig;
use super::tables::ConfigTables;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Load configuration from the given path, falling back to defaults on error.
pub fn load_config(path: &Path) -> AppConfig {
    let contents = match fs::read_to_string(path) {
        Ok(data) => {
            info!(path = %path.display(), "Loaded base config");
            data
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                "Falling back to default config: {err}"
            );
            return AppConfig::default();
        }
    };

    match parse_config(&contents) {
        Ok(cfg) => {
            debug!("Parsed configuration from disk");
            cfg
        }
        Err(err) => {
            warn!(path = %path.display(), "Invalid config TOML: {err:#}");
            AppConfig::default()
        }
    }
}

/// Parse the sectioned TOML layout into a flat `AppConfig`.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let tables: ConfigTables = toml::from_str(contents).context("Parsing config tables")?;
    Ok(tables.into())
}

pub fn serialize_config(config: &AppConfig) -> Result<String> {
    toml::to_string_pretty(&ConfigTables::from(config)).context("Serializing config tables")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = parse_config("").expect("empty config should parse");
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.scroll_cooldown(), Duration::from_millis(150));
        assert_eq!(cfg.example_limit, 5);
        assert_eq!(cfg.api_timeout(), None);
    }

    #[test]
    fn sections_override_individual_fields() {
        let cfg = parse_config(
            r#"
[api]
base_url = "http://backend:9000"
timeout_secs = 12

[languages]
source = "en"
target = "fr"

[search]
discard_stale_searches = true

[narration]
rate = 0.8
locales = { de = "de-AT" }

[reading]
scroll_cooldown_ms = 40

[logging]
log_level = "warn"
"#,
        )
        .expect("config should parse");

        assert_eq!(cfg.api_base_url, "http://backend:9000");
        assert_eq!(cfg.api_timeout(), Some(Duration::from_secs(12)));
        assert_eq!(cfg.source_language, "en");
        assert_eq!(cfg.target_language, "fr");
        assert_eq!(cfg.corpus_language, "de");
        assert!(cfg.discard_stale_searches);
        assert_eq!(cfg.narration_locales.get("de").map(String::as_str), Some("de-AT"));
        assert_eq!(cfg.scroll_cooldown_ms, 40);
        assert_eq!(cfg.log_level, LogLevel::Warn);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(parse_config("[api\nbase_url = 1").is_err());
    }

    #[test]
    fn serialized_config_parses_back() {
        let mut cfg = AppConfig::default();
        cfg.target_language = "es".to_string();
        cfg.narration_locales
            .insert("pt".to_string(), "pt-BR".to_string());
        let text = serialize_config(&cfg).expect("config should serialize");
        assert!(text.contains("[narration"));
        assert_eq!(parse_config(&text).expect("config should parse"), cfg);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let nonce = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be after epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!("lingua-session-missing-{nonce}.toml"));
        assert_eq!(load_config(&path), AppConfig::default());
    }

    #[test]
    fn narration_rate_is_clamped() {
        let mut cfg = AppConfig::default();
        cfg.narration_rate = 9.0;
        assert_eq!(cfg.narration_rate_clamped(), 4.0);
        cfg.narration_rate = f32::NAN;
        assert_eq!(cfg.narration_rate_clamped(), 1.0);
    }
}
