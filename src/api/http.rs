use super::TranslationApi;
use super::wire::{
    ErrorBody, LanguagesResponse, SearchExamplesResponse, TranslateRequest, TranslateResponse,
    WordTranslationResponse,
};
use crate::config::AppConfig;
use crate::error::{SessionError, SessionResult};
use crate::models::Example;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

/// `TranslationApi` over the backend's HTTP JSON endpoints.
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: Client,
    base_url: String,
}

impl HttpApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> SessionResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| SessionError::upstream(format!("Building HTTP client: {err}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> SessionResult<Self> {
        Self::new(config.api_base_url.clone(), config.api_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> SessionResult<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        let message = error_message(status, &body);
        warn!(%status, "Backend returned an error: {message}");
        return Err(SessionError::upstream(message));
    }
    serde_json::from_str(&body)
        .map_err(|err| SessionError::upstream(format!("Malformed backend response: {err}")))
}

fn error_message(status: StatusCode, body: &str) -> String {
    if let Some(message) = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message())
    {
        return message;
    }
    let body = body.trim();
    if body.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {body}")
    }
}

#[async_trait]
impl TranslationApi for HttpApiClient {
    async fn translate(&self, text: &str, src_lang: &str, tgt_lang: &str) -> SessionResult<String> {
        debug!(src_lang, tgt_lang, chars = text.len(), "POST /translate");
        let response = self
            .client
            .post(self.endpoint("translate"))
            .json(&TranslateRequest {
                text,
                src_lang,
                tgt_lang,
            })
            .send()
            .await?;
        let body: TranslateResponse = read_json(response).await?;
        if let Some(error) = body.error {
            return Err(SessionError::upstream(error));
        }
        body.translation
            .ok_or_else(|| SessionError::upstream("Translation response had no translation"))
    }

    async fn translate_word(
        &self,
        word: &str,
        src_lang: &str,
        tgt_lang: &str,
    ) -> SessionResult<String> {
        debug!(word, src_lang, tgt_lang, "GET /translate/word");
        let response = self
            .client
            .get(self.endpoint("translate/word"))
            .query(&[("word", word), ("src_lang", src_lang), ("tgt_lang", tgt_lang)])
            .send()
            .await?;
        let body: WordTranslationResponse = read_json(response).await?;
        Ok(body.translated_word)
    }

    async fn search_examples(
        &self,
        word: &str,
        corpus_lang: &str,
        limit: usize,
    ) -> SessionResult<Vec<Example>> {
        debug!(word, corpus_lang, limit, "GET /search/examples");
        let limit = limit.to_string();
        let response = self
            .client
            .get(self.endpoint("search/examples"))
            .query(&[
                ("word", word),
                ("corpus_lang", corpus_lang),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;
        let body: SearchExamplesResponse = read_json(response).await?;
        if let Some(error) = body.error {
            return Err(SessionError::upstream(error));
        }
        Ok(body
            .examples
            .into_iter()
            .map(|example| example.into_example(corpus_lang))
            .collect())
    }

    async fn languages(&self) -> SessionResult<BTreeMap<String, String>> {
        let response = self.client.get(self.endpoint("languages")).send().await?;
        let body: LanguagesResponse = read_json(response).await?;
        Ok(body.languages)
    }
}
