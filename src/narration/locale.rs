use std::collections::BTreeMap;

/// Most specific locale for each learning-language code.
const DEFAULT_LOCALES: &[(&str, &str)] = &[
    ("ar", "ar-SA"),
    ("cs", "cs-CZ"),
    ("da", "da-DK"),
    ("de", "de-DE"),
    ("el", "el-GR"),
    ("en", "en-US"),
    ("es", "es-ES"),
    ("fi", "fi-FI"),
    ("fr", "fr-FR"),
    ("hi", "hi-IN"),
    ("hu", "hu-HU"),
    ("it", "it-IT"),
    ("ja", "ja-JP"),
    ("ko", "ko-KR"),
    ("nl", "nl-NL"),
    ("no", "nb-NO"),
    ("pl", "pl-PL"),
    ("pt", "pt-PT"),
    ("ru", "ru-RU"),
    ("sv", "sv-SE"),
    ("tr", "tr-TR"),
    ("uk", "uk-UA"),
    ("zh", "zh-CN"),
];

#[derive(Debug, Clone)]
pub struct LocaleTable {
    entries: BTreeMap<String, String>,
}

impl Default for LocaleTable {
    fn default() -> Self {
        Self {
            entries: DEFAULT_LOCALES
                .iter()
                .map(|(code, locale)| (code.to_string(), locale.to_string()))
                .collect(),
        }
    }
}

impl LocaleTable {
    /// Built-in table with configured entries layered on top.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let mut table = Self::default();
        for (code, locale) in overrides {
            let code = code.trim().to_ascii_lowercase();
            let locale = locale.trim();
            if code.is_empty() || locale.is_empty() {
                continue;
            }
            table.entries.insert(code, locale.to_string());
        }
        table
    }

    /// Unknown codes pass through unchanged.
    pub fn resolve(&self, language: &str) -> String {
        self.entries
            .get(&language.trim().to_ascii_lowercase())
            .cloned()
            .unwrap_or_else(|| language.to_string())
    }
}
