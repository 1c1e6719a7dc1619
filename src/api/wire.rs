//! JSON bodies exchanged with the backend.

use crate::models::Example;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
pub(super) struct TranslateRequest<'a> {
    pub text: &'a str,
    pub src_lang: &'a str,
    pub tgt_lang: &'a str,
}

/// `POST /translate` answers 200 with either `translation` or `error`.
#[derive(Debug, Deserialize)]
pub(super) struct TranslateResponse {
    #[serde(default)]
    pub translation: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WordTranslationResponse {
    pub translated_word: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchExamplesResponse {
    #[serde(default)]
    pub examples: Vec<WireExample>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireExample {
    pub sentence: String,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub translation: Option<String>,
    #[serde(default)]
    pub translation_lang: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub sentence_id: Option<Value>,
}

impl WireExample {
    pub fn into_example(self, corpus_lang: &str) -> Example {
        let sentence_id = match self.sentence_id {
            None | Some(Value::Null) => None,
            Some(Value::String(id)) => Some(id),
            Some(other) => Some(other.to_string()),
        };
        Example {
            sentence: self.sentence,
            source_language: self
                .lang
                .filter(|lang| !lang.trim().is_empty())
                .unwrap_or_else(|| corpus_lang.to_string()),
            translation: self.translation,
            translation_language: self.translation_lang,
            title: self.title,
            sentence_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct LanguagesResponse {
    #[serde(default)]
    pub languages: BTreeMap<String, String>,
}

/// Error bodies: FastAPI's `{detail}` (string or validation list) or the
/// app's own `{error}`.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn message(&self) -> Option<String> {
        if let Some(error) = self.error.as_deref().filter(|e| !e.trim().is_empty()) {
            return Some(error.to_string());
        }
        match self.detail.as_ref()? {
            Value::String(detail) => Some(detail.clone()),
            Value::Array(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect();
                (!parts.is_empty()).then(|| parts.join("; "))
            }
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}
