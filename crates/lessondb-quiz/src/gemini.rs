//! Gemini `generateContent` backend.
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error};

use lessondb_core::config::GeminiSettings;
use lessondb_core::traits::TextGenerator;
use lessondb_core::{Error, ProviderError, Result};

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GeminiGenerator {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl GeminiGenerator {
    pub fn new(settings: &GeminiSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.resolve_api_key(),
        })
    }
}

pub(crate) fn request_body(prompt: &str) -> Value {
    json!({
        "contents": [{ "role": "user", "parts": [{ "text": prompt }] }]
    })
}

/// Text parts of the first candidate, concatenated. No candidate yields "".
pub(crate) fn response_text(body: &str) -> std::result::Result<String, ProviderError> {
    let parsed: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))?;
    let text = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect::<String>())
        .unwrap_or_default();
    Ok(text)
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    fn preflight(&self) -> Result<()> {
        match self.api_key {
            Some(_) => Ok(()),
            None => Err(Error::InvalidConfig("Gemini API key not configured".into())),
        }
    }

    async fn generate(&self, model: &str, prompt: &str) -> std::result::Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::Transport("missing API key".into()))?;
        let url = format!("{}/models/{}:generateContent?key={}", self.base_url, model, api_key);

        let resp = self
            .client
            .post(&url)
            .json(&request_body(prompt))
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.without_url().to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.without_url().to_string()))?;
        if !status.is_success() {
            error!(model, status = %status, "generateContent failed");
            return Err(ProviderError::Status { status: status.as_u16(), body });
        }
        debug!(model, bytes = body.len(), "generateContent ok");
        response_text(&body)
    }
}
