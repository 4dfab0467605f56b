//! Domain types shared by the retrieval and quiz engines.

use serde::{Deserialize, Serialize};

pub type MaterialId = String;
pub type TopicId = String;
pub type Embedding = Vec<f32>;

/// A pre-split, pre-embedded segment of a material's text.
///
/// `chunk_index` is the position within the parent material. `embedding` may
/// be empty when ingestion has not produced a vector for this chunk yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    pub chunk_index: usize,
    pub content: String,
    #[serde(default)]
    pub embedding: Embedding,
}

/// Course material as handed over by ingestion. Read-only to this workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: MaterialId,
    pub title: String,
    pub subject: String,
    pub topic: String,
    #[serde(default)]
    pub is_processed: bool,
    /// Raw material text, used for quiz excerpts.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub chunks: Vec<Chunk>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRef {
    pub title: String,
    pub subject: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialRef {
    pub id: MaterialId,
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// A course topic with its resolved course and material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: TopicId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub course: Option<CourseRef>,
    #[serde(default)]
    pub material: Option<MaterialRef>,
}

/// Material selection used by repository reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialFilter {
    pub processed_only: bool,
    pub subject: Option<String>,
    pub topic: Option<String>,
}

impl MaterialFilter {
    pub fn processed() -> Self {
        Self { processed_only: true, ..Self::default() }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Exact-match test against a material.
    pub fn matches(&self, material: &Material) -> bool {
        if self.processed_only && !material.is_processed {
            return false;
        }
        if let Some(subject) = &self.subject {
            if &material.subject != subject {
                return false;
            }
        }
        if let Some(topic) = &self.topic {
            if &material.topic != topic {
                return false;
            }
        }
        true
    }
}

/// Material fields supporting distinct-value lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialField {
    Subject,
    Topic,
}

impl MaterialField {
    pub fn read<'a>(&self, material: &'a Material) -> &'a str {
        match self {
            MaterialField::Subject => &material.subject,
            MaterialField::Topic => &material.topic,
        }
    }
}

/// One ranked search result. Created per request, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievedChunk {
    pub material_id: MaterialId,
    pub material_title: String,
    pub subject: String,
    pub topic: String,
    pub chunk_index: usize,
    pub content: String,
    pub similarity: f32,
}

/// A validated multiple-choice question.
///
/// Exactly four options; `answer_index` is always in `0..4`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: String,
    pub question: String,
    pub options: [String; 4],
    pub answer_index: usize,
    pub explanation: String,
}
