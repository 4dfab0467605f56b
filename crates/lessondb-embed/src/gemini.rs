use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use lessondb_core::config::{EmbeddingSettings, GeminiSettings};
use lessondb_core::traits::Embedder;
use lessondb_core::types::Embedding;
use lessondb_core::{Error, Result};

use crate::check_embedding;

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

/// Hosted embedding backend (`models/{model}:embedContent`).
#[derive(Debug, Clone)]
pub struct GeminiEmbedder {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    dim: usize,
}

impl GeminiEmbedder {
    pub fn new(gemini: &GeminiSettings, api_key: String, embedding: &EmbeddingSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(gemini.timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: gemini.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: embedding.model.clone(),
            dim: embedding.dim,
        })
    }

    fn request_body(&self, text: &str) -> Value {
        json!({
            "model": format!("models/{}", self.model),
            "content": { "parts": [{ "text": text }] },
            "outputDimensionality": self.dim,
        })
    }
}

pub(crate) fn parse_embedding(body: &str) -> Result<Embedding> {
    let parsed: EmbedContentResponse = serde_json::from_str(body)
        .map_err(|e| Error::Embedding(format!("unexpected embedding payload: {}", e)))?;
    Ok(parsed.embedding.values)
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        let url = format!("{}/models/{}:embedContent?key={}", self.base_url, self.model, self.api_key);
        let resp = self
            .client
            .post(&url)
            .json(&self.request_body(text))
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("embedding provider unreachable: {}", e.without_url())))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| Error::Embedding(format!("failed to read embedding response: {}", e.without_url())))?;
        if !status.is_success() {
            warn!(status = %status, model = %self.model, "embedding request rejected");
            return Err(Error::Embedding(format!("embedding provider returned {}", status)));
        }

        let vector = parse_embedding(&body)?;
        check_embedding(&vector, self.dim)?;
        debug!(dim = vector.len(), "query embedded");
        Ok(vector)
    }
}
