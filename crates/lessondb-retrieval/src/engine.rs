//! Brute-force semantic retrieval over pre-embedded material chunks.
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use lessondb_core::config::RetrievalSettings;
use lessondb_core::traits::{Embedder, MaterialRepository};
use lessondb_core::types::{MaterialField, MaterialFilter, RetrievedChunk};
use lessondb_core::{Error, Result};

use crate::similarity::cosine_similarity;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub subject: Option<String>,
    pub topic: Option<String>,
    pub top_k: usize,
    pub min_similarity: f32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self { subject: None, topic: None, top_k: 5, min_similarity: 0.3 }
    }
}

impl From<&RetrievalSettings> for SearchOptions {
    fn from(settings: &RetrievalSettings) -> Self {
        Self { top_k: settings.top_k, min_similarity: settings.min_similarity, ..Self::default() }
    }
}

pub struct SemanticSearchEngine {
    repository: Arc<dyn MaterialRepository>,
    embedder: Arc<dyn Embedder>,
}

impl SemanticSearchEngine {
    pub fn new(repository: Arc<dyn MaterialRepository>, embedder: Arc<dyn Embedder>) -> Self {
        Self { repository, embedder }
    }

    /// Rank chunks of processed materials against `query`, most similar first.
    ///
    /// Chunks without an embedding, with a zero-magnitude embedding or with a
    /// dimensionality different from the query are skipped. Equal scores keep
    /// repository order (materials, then chunks in stored order).
    pub async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<RetrievedChunk>> {
        if !options.min_similarity.is_finite() || !(-1.0..=1.0).contains(&options.min_similarity) {
            return Err(Error::InvalidConfig(format!(
                "min_similarity must lie in [-1, 1], got {}",
                options.min_similarity
            )));
        }
        let start = Instant::now();
        let query_vec = self.embedder.embed(query).await?;
        if query_vec.is_empty() || query_vec.iter().any(|x| !x.is_finite()) {
            return Err(Error::Embedding("query embedding is empty or non-finite".into()));
        }

        let filter = MaterialFilter {
            processed_only: true,
            subject: options.subject.clone(),
            topic: options.topic.clone(),
        };
        let materials = self.repository.find_materials(&filter).await?;

        let mut results = Vec::new();
        let mut skipped = 0usize;
        for material in &materials {
            for chunk in &material.chunks {
                if chunk.embedding.is_empty() {
                    continue;
                }
                let Some(similarity) = cosine_similarity(&query_vec, &chunk.embedding) else {
                    skipped += 1;
                    continue;
                };
                if similarity < options.min_similarity {
                    continue;
                }
                results.push(RetrievedChunk {
                    material_id: material.id.clone(),
                    material_title: material.title.clone(),
                    subject: material.subject.clone(),
                    topic: material.topic.clone(),
                    chunk_index: chunk.chunk_index,
                    content: chunk.content.clone(),
                    similarity,
                });
            }
        }

        // Stable sort: ties stay in encounter order.
        results.sort_by(|a, b| b.similarity.partial_cmp(&a.similarity).unwrap_or(Ordering::Equal));
        results.truncate(options.top_k);

        debug!(materials = materials.len(), skipped, "candidate chunks scored");
        info!(hits = results.len(), elapsed_ms = start.elapsed().as_millis() as u64, "semantic search");
        Ok(results)
    }

    pub async fn subjects(&self) -> Result<Vec<String>> {
        self.repository
            .distinct_values(MaterialField::Subject, &MaterialFilter::processed())
            .await
    }

    pub async fn topics(&self, subject: &str) -> Result<Vec<String>> {
        self.repository
            .distinct_values(MaterialField::Topic, &MaterialFilter::processed().with_subject(subject))
            .await
    }
}
