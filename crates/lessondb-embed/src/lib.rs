//! Embedding providers.
//!
//! `HashEmbedder` is deterministic and offline; `GeminiEmbedder` calls the
//! hosted embedding endpoint. `APP_USE_FAKE_EMBEDDINGS=1` forces the hash
//! embedder regardless of configuration.
use std::sync::Arc;
use tracing::info;

use lessondb_core::config::{EmbeddingBackend, Settings};
use lessondb_core::traits::Embedder;
use lessondb_core::{Error, Result};

mod gemini;
mod hash;

pub use gemini::GeminiEmbedder;
pub use hash::HashEmbedder;

pub fn get_default_embedder(settings: &Settings) -> Result<Arc<dyn Embedder>> {
    let use_fake = std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if use_fake || settings.embedding.backend == EmbeddingBackend::Hash {
        info!(dim = settings.embedding.dim, "using hash embedder");
        return Ok(Arc::new(HashEmbedder::new(settings.embedding.dim)));
    }
    let api_key = settings.gemini.resolve_api_key().ok_or_else(|| {
        Error::InvalidConfig("embedding.backend = \"gemini\" requires gemini.api_key or GEMINI_API_KEY".into())
    })?;
    info!(model = %settings.embedding.model, "using gemini embedder");
    Ok(Arc::new(GeminiEmbedder::new(&settings.gemini, api_key, &settings.embedding)?))
}

/// Rejects vectors that cannot take part in similarity ranking.
pub fn check_embedding(vector: &[f32], expected_dim: usize) -> Result<()> {
    if vector.is_empty() {
        return Err(Error::Embedding("provider returned an empty vector".into()));
    }
    if vector.len() != expected_dim {
        return Err(Error::Embedding(format!(
            "provider returned {} dimensions, expected {}",
            vector.len(),
            expected_dim
        )));
    }
    if vector.iter().any(|x| !x.is_finite()) {
        return Err(Error::Embedding("provider returned non-finite values".into()));
    }
    Ok(())
}
