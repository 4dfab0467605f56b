use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use lessondb_core::config::QuizSettings;
use lessondb_core::traits::{MaterialRepository, TextGenerator};
use lessondb_core::types::QuizQuestion;
use lessondb_core::{Error, ProviderError, Result};

use crate::chain::{AttemptError, ChainState, ModelChain};
use crate::extract::extract_json;
use crate::normalize::normalize_questions;
use crate::prompt::build_prompt;
use crate::request::{QuizRequest, QuizResponse};

pub struct QuizEngine {
    repository: Arc<dyn MaterialRepository>,
    generator: Arc<dyn TextGenerator>,
    chain: ModelChain,
    settings: QuizSettings,
}

impl QuizEngine {
    pub fn new(
        repository: Arc<dyn MaterialRepository>,
        generator: Arc<dyn TextGenerator>,
        chain: ModelChain,
        settings: QuizSettings,
    ) -> Self {
        Self { repository, generator, chain, settings }
    }

    pub fn chain(&self) -> &ModelChain {
        &self.chain
    }

    /// Generate exactly the requested number of questions or fail.
    ///
    /// Models are tried one at a time in chain order; the first one whose
    /// output survives validation wins. Per-model failures are logged and
    /// folded into a single `Error::GenerationFailed`.
    pub async fn generate(&self, request: &QuizRequest) -> Result<QuizResponse> {
        let state = self.run(request).await?;
        match state {
            ChainState::Succeeded { model, questions, failures } => {
                info!(model = %model, questions = questions.len(), skipped = failures.len(), "quiz generated");
                Ok(QuizResponse { topic_id: request.topic_id.clone(), questions, model_used: model })
            }
            ChainState::Exhausted(failures) => {
                for failure in &failures {
                    warn!(model = %failure.model, error = %failure.error, "model attempt failed");
                }
                Err(Error::GenerationFailed { attempts: failures.len() })
            }
            ChainState::Trying { failures, .. } => Err(Error::GenerationFailed { attempts: failures.len() }),
        }
    }

    /// Drive the fallback chain to a terminal state.
    ///
    /// Returns `Err` only for failures that stop the chain before it starts:
    /// unknown topic or an unusable generator.
    pub async fn run(&self, request: &QuizRequest) -> Result<ChainState> {
        let count = request.resolved_count(&self.settings);
        let difficulty = request.resolved_difficulty();

        let topic = self
            .repository
            .find_topic(&request.topic_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("topic {}", request.topic_id)))?;

        self.generator.preflight()?;

        let prompt = build_prompt(&topic, count, difficulty, self.settings.excerpt_chars);
        debug!(topic = %topic.id, count, difficulty, prompt_chars = prompt.len(), "quiz prompt built");

        let mut state = ChainState::start(&self.chain);
        while let Some(model) = state.current_model(&self.chain) {
            let outcome = self.attempt(model, &prompt, &topic.id, count).await;
            state = state.record(&self.chain, outcome);
        }
        Ok(state)
    }

    async fn attempt(
        &self,
        model: &str,
        prompt: &str,
        topic_id: &str,
        count: usize,
    ) -> std::result::Result<Vec<QuizQuestion>, AttemptError> {
        let start = Instant::now();
        let call = self.generator.generate(model, prompt);
        let text = match self.settings.attempt_timeout_secs {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), call)
                .await
                .map_err(|_| ProviderError::Timeout(secs))??,
            None => call.await?,
        };
        debug!(model, elapsed_ms = start.elapsed().as_millis() as u64, response_chars = text.len(), "model responded");

        if text.trim().is_empty() {
            return Err(AttemptError::EmptyResponse);
        }
        let parsed = extract_json(&text)?;
        let raw = parsed.get("questions").unwrap_or(&serde_json::Value::Null);
        let questions = normalize_questions(raw, topic_id, count);
        if questions.len() < count {
            return Err(AttemptError::Incomplete { wanted: count, got: questions.len() });
        }
        Ok(questions)
    }
}
