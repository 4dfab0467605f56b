use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::types::{Embedding, Material, MaterialField, MaterialFilter, Topic};

/// Maps text to a fixed-dimensionality vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    async fn embed(&self, text: &str) -> Result<Embedding>;
}

/// Read-only access to materials, chunks and topic metadata.
#[async_trait]
pub trait MaterialRepository: Send + Sync {
    /// Materials matching `filter`, in repository order.
    async fn find_materials(&self, filter: &MaterialFilter) -> Result<Vec<Material>>;
    async fn find_topic(&self, id: &str) -> Result<Option<Topic>>;
    /// Sorted, deduplicated values of `field` across materials matching `filter`.
    async fn distinct_values(&self, field: MaterialField, filter: &MaterialFilter) -> Result<Vec<String>>;
}

/// A generative model backend addressed by model id.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Checked once before a fallback chain starts. A backend that can never
    /// succeed (missing credential) reports `Error::InvalidConfig` here.
    fn preflight(&self) -> Result<()> {
        Ok(())
    }

    async fn generate(&self, model: &str, prompt: &str) -> std::result::Result<String, ProviderError>;
}
