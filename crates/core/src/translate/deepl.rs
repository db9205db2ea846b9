//! DeepL REST API backend.

use super::Translator;
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::trace;

const FREE_ENDPOINT: &str = "https://api-free.deepl.com";
const PRO_ENDPOINT: &str = "https://api.deepl.com";

/// Translator that delegates to the DeepL `/v2/translate` endpoint.
pub struct DeeplTranslator {
    client: Client,
    api_key: String,
    endpoint: String,
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    text: Vec<&'a str>,
    target_lang: String,
}

#[derive(Deserialize)]
struct TranslateResponse {
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
struct Translation {
    text: String,
}

impl DeeplTranslator {
    /// Create a new translator reading the API key from `DEEPL_API_KEY`.
    pub fn new() -> Result<Self> {
        let key = std::env::var("DEEPL_API_KEY")?;
        Ok(Self::with_key(key))
    }

    /// Free-tier keys end in `:fx` and live on their own host.
    pub fn with_key(api_key: String) -> Self {
        let endpoint = if api_key.ends_with(":fx") {
            FREE_ENDPOINT
        } else {
            PRO_ENDPOINT
        };
        Self {
            client: Client::new(),
            api_key,
            endpoint: endpoint.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl Translator for DeeplTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String> {
        trace!("deepl translate target_lang={target_lang}");
        let body = TranslateRequest {
            text: vec![text],
            target_lang: target_lang.to_uppercase(),
        };
        let resp = self
            .client
            .post(format!("{}/v2/translate", self.endpoint))
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            bail!("deepl responded with {status}: {detail}");
        }
        let data: TranslateResponse = resp.json().await?;
        data.translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .ok_or_else(|| anyhow!("deepl returned no translations"))
    }

    fn name(&self) -> &'static str {
        "deepl"
    }
}
