use std::collections::BTreeMap;

pub(crate) fn default_api_base_url() -> String {
    "http://localhost:8000".to_string()
}

pub(crate) fn default_api_timeout_secs() -> u64 {
    0
}

pub(crate) fn default_example_limit() -> usize {
    5
}

pub(crate) fn default_source_language() -> String {
    "de".to_string()
}

pub(crate) fn default_target_language() -> String {
    "en".to_string()
}

pub(crate) fn default_corpus_language() -> String {
    "de".to_string()
}

pub(crate) fn default_discard_stale_searches() -> bool {
    false
}

pub(crate) fn default_narration_rate() -> f32 {
    1.0
}

pub(crate) fn default_narration_command() -> String {
    "espeak-ng".to_string()
}

pub(crate) fn default_narration_locales() -> BTreeMap<String, String> {
    BTreeMap::new()
}

pub(crate) fn default_scroll_cooldown_ms() -> u64 {
    150
}

pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Debug
}
