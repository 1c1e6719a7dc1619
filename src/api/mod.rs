//! Client side of the translation/corpus HTTP API.
//!
//! The backend's own translation and search algorithms are opaque here; the
//! session runtime only relies on the request/response contracts behind the
//! `TranslationApi` trait.

mod http;
mod wire;

pub use http::HttpApiClient;

use crate::error::SessionResult;
use crate::models::Example;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

#[async_trait]
pub trait TranslationApi: Send + Sync {
    /// `POST /translate`: free text from `src_lang` into `tgt_lang`.
    async fn translate(&self, text: &str, src_lang: &str, tgt_lang: &str) -> SessionResult<String>;

    /// `GET /translate/word`: single-word translation with backend-side word
    /// validation.
    async fn translate_word(
        &self,
        word: &str,
        src_lang: &str,
        tgt_lang: &str,
    ) -> SessionResult<String>;

    /// `GET /search/examples`: example sentences for `word` in the corpus.
    async fn search_examples(
        &self,
        word: &str,
        corpus_lang: &str,
        limit: usize,
    ) -> SessionResult<Vec<Example>>;

    /// `GET /languages`: supported codes mapped to display names.
    async fn languages(&self) -> SessionResult<BTreeMap<String, String>>;
}

#[async_trait]
impl<T: TranslationApi + ?Sized> TranslationApi for Arc<T> {
    async fn translate(&self, text: &str, src_lang: &str, tgt_lang: &str) -> SessionResult<String> {
        (**self).translate(text, src_lang, tgt_lang).await
    }

    async fn translate_word(
        &self,
        word: &str,
        src_lang: &str,
        tgt_lang: &str,
    ) -> SessionResult<String> {
        (**self).translate_word(word, src_lang, tgt_lang).await
    }

    async fn search_examples(
        &self,
        word: &str,
        corpus_lang: &str,
        limit: usize,
    ) -> SessionResult<Vec<Example>> {
        (**self).search_examples(word, corpus_lang, limit).await
    }

    async fn languages(&self) -> SessionResult<BTreeMap<String, String>> {
        (**self).languages().await
    }
}
