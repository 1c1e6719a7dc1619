//! Text cleanup shared by narration and search.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static RE_HIGHLIGHT_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</?mark\s*>").unwrap());
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static RE_LANGUAGE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]{2,3}(-[a-z]{2})?$").unwrap());

/// Remove the `<mark>` tags the corpus search wraps around matched words.
pub fn strip_highlight_tags(text: &str) -> String {
    RE_HIGHLIGHT_TAG.replace_all(text, "").into_owned()
}

/// Highlight-free, whitespace-collapsed text suitable for the speech resource.
pub fn normalize_for_speech(text: &str) -> String {
    let stripped = strip_highlight_tags(text);
    RE_WHITESPACE.replace_all(stripped.trim(), " ").into_owned()
}

/// Trimmed, NFC-composed query word. Decomposed umlauts from some input
/// methods otherwise miss the corpus index.
pub fn normalize_query(word: &str) -> String {
    word.trim().nfc().collect()
}

/// Lowercased language code, or `None` when it is not shaped like one
/// (`de`, `haw`, `zh-cn`).
pub fn normalize_language_code(code: &str) -> Option<String> {
    let code = code.trim().to_ascii_lowercase();
    RE_LANGUAGE_CODE.is_match(&code).then_some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_mark_tags_case_insensitively() {
        let text = "Das <mark>Haus</mark> ist <MARK>alt</MARK>.";
        assert_eq!(strip_highlight_tags(text), "Das Haus ist alt.");
    }

    #[test]
    fn speech_text_collapses_whitespace() {
        let text = "  Ein\n<mark>Haus</mark>\t am   See ";
        assert_eq!(normalize_for_speech(text), "Ein Haus am See");
    }

    #[test]
    fn query_is_composed_and_trimmed() {
        let decomposed = " Ha\u{0308}user ";
        assert_eq!(normalize_query(decomposed), "Häuser");
    }

    #[test]
    fn language_codes_are_validated() {
        assert_eq!(normalize_language_code(" DE "), Some("de".to_string()));
        assert_eq!(normalize_language_code("zh-CN"), Some("zh-cn".to_string()));
        assert_eq!(normalize_language_code("german"), None);
        assert_eq!(normalize_language_code(""), None);
    }
}
