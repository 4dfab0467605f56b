use serde::{Deserialize, Serialize};

use lessondb_core::config::QuizSettings;
use lessondb_core::types::{QuizQuestion, TopicId};

pub const DEFAULT_DIFFICULTY: &str = "moderate";

/// Caller input for one quiz. Count and difficulty are optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizRequest {
    pub topic_id: TopicId,
    #[serde(default)]
    pub question_count: Option<i64>,
    #[serde(default)]
    pub difficulty: Option<String>,
}

impl QuizRequest {
    pub fn new(topic_id: impl Into<TopicId>) -> Self {
        Self { topic_id: topic_id.into(), question_count: None, difficulty: None }
    }

    pub fn with_count(mut self, count: i64) -> Self {
        self.question_count = Some(count);
        self
    }

    pub fn with_difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = Some(difficulty.into());
        self
    }

    /// Requested count clamped to `[1, max_question_count]`. Absent or zero
    /// counts fall back to the configured default.
    pub fn resolved_count(&self, settings: &QuizSettings) -> usize {
        let max = settings.max_question_count.max(1);
        match self.question_count {
            None | Some(0) => settings.default_question_count.clamp(1, max),
            Some(n) if n < 0 => 1,
            Some(n) => usize::try_from(n).unwrap_or(max).clamp(1, max),
        }
    }

    pub fn resolved_difficulty(&self) -> &str {
        self.difficulty
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_DIFFICULTY)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResponse {
    pub topic_id: TopicId,
    pub questions: Vec<QuizQuestion>,
    pub model_used: String,
}
