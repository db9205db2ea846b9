//! Google Translate backend using the public web endpoint.
//! No API key is needed; the endpoint answers with nested JSON arrays.

use super::Translator;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::trace;

const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Translator that calls the Google Translate web endpoint.
pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Point the translator at another endpoint (e.g. a mock server).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl Default for GoogleTranslator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String> {
        trace!("google translate target_lang={target_lang}");
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target_lang),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;
        let value: Value = resp.error_for_status()?.json().await?;
        join_segments(&value)
    }

    /// The web endpoint occasionally wedges a connection after an error;
    /// a fresh client gets a fresh connection pool.
    fn reset(&mut self) {
        trace!("rebuilding google http client");
        self.client = Client::new();
    }

    fn name(&self) -> &'static str {
        "google"
    }
}

/// Concatenate the translated part of every segment in the response.
/// The shape is `[[["translated", "source", ...], ...], ...]`.
fn join_segments(value: &Value) -> Result<String> {
    let segments = value
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("unexpected google response: {value}"))?;
    Ok(segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::translate::{translate_with_retry, RetryPolicy};
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn joins_segments() {
        let value = json!([[["Hallo. ", "Hello. ", null], ["Wereld.", "World.", null]], null, "en"]);
        assert_eq!(join_segments(&value).unwrap(), "Hallo. Wereld.");
        assert!(join_segments(&json!({"error": "nope"})).is_err());
    }

    #[tokio::test]
    async fn translates_via_web_endpoint() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/translate_a/single")
                    .query_param("client", "gtx")
                    .query_param("tl", "nl")
                    .query_param("q", "Hello. World.");
                then.status(200).json_body(json!([
                    [["Hallo. ", "Hello. ", null, null, 10], ["Wereld.", "World.", null, null, 10]],
                    null,
                    "en"
                ]));
            })
            .await;
        let tr = GoogleTranslator::new().with_endpoint(server.url("/translate_a/single"));
        let out = tr.translate("Hello. World.", "nl").await.unwrap();
        assert_eq!(out, "Hallo. Wereld.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_errors_are_retried_until_exhausted() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/translate_a/single");
                then.status(429).body("Too Many Requests");
            })
            .await;
        let mut tr = GoogleTranslator::new().with_endpoint(server.url("/translate_a/single"));
        let policy = RetryPolicy {
            max_attempts: 3,
            delay: Duration::ZERO,
        };
        let err = translate_with_retry(&mut tr, "Hello", "nl", &policy)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TranslationExhausted { attempts: 3, .. }));
        assert_eq!(mock.hits_async().await, 3);
    }
}
