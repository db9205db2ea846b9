//! OpenAI-backed translator implementation.
//! This asks a chat completion model for a bare translation of one unit.

use super::Translator;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-5-nano";

/// Translator that delegates to the OpenAI chat completion API.
pub struct OpenAiTranslator {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl OpenAiTranslator {
    /// Create a new translator reading the API key from `OPENAI_API_KEY`.
    pub fn new() -> Result<Self> {
        let key = std::env::var("OPENAI_API_KEY")?;
        Ok(Self::with_key(key))
    }

    pub fn with_key(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Send a JSON body to the chat completions endpoint and return the JSON response.
    async fn post_chat(&self, body: Value) -> Result<Value> {
        let resp = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let resp = resp.error_for_status()?;
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl Translator for OpenAiTranslator {
    /// Translate a single subtitle unit, asking for the translation only.
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String> {
        let messages = vec![
            json!({
                "role": "system",
                "content": format!(
                    "You translate subtitle text to the language with code '{target_lang}'. \
                     Reply with the translation only, without quotes or notes."
                )
            }),
            json!({"role": "user", "content": text}),
        ];
        let body = json!({
            "model": self.model,
            "messages": messages,
        });
        let value = self.post_chat(body).await?;
        let content = value["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow!("missing content"))?;
        Ok(content.trim().to_string())
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn returns_message_content() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/chat/completions")
                    .header("Authorization", "Bearer sk-test")
                    .body_contains("\"model\":\"gpt-5-nano\"")
                    .body_contains("Where is the station?");
                then.status(200).json_body(json!({
                    "choices": [{"message": {"role": "assistant", "content": " Waar is het station?\n"}}]
                }));
            })
            .await;
        let tr = OpenAiTranslator::with_key("sk-test".into()).with_endpoint(server.url("/v1"));
        let out = tr.translate("Where is the station?", "nl").await.unwrap();
        assert_eq!(out, "Waar is het station?");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_content_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(200).json_body(json!({"choices": []}));
            })
            .await;
        let tr = OpenAiTranslator::with_key("sk-test".into())
            .with_endpoint(server.url("/v1"))
            .with_model("gpt-4o-mini");
        assert!(tr.translate("Hi", "nl").await.is_err());
    }
}
