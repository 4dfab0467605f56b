//! The model fallback chain as an explicit state machine.
//!
//! `Trying { index, .. }` advances one model per recorded outcome until a
//! model succeeds (`Succeeded`) or the list runs out (`Exhausted`). Failures
//! accumulate as data so they can be inspected after the loop.
use thiserror::Error;

use lessondb_core::config::QuizSettings;
use lessondb_core::types::QuizQuestion;
use lessondb_core::{Error, ProviderError, Result};

/// Why a single model attempt was rejected. Never leaves the quiz engine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AttemptError {
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("empty response")]
    EmptyResponse,

    #[error("unparseable response: {0}")]
    Parse(String),

    #[error("incomplete quiz: wanted {wanted} valid questions, got {got}")]
    Incomplete { wanted: usize, got: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    pub model: String,
    pub error: AttemptError,
}

/// Ordered, non-empty list of model ids. Deployment configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelChain {
    models: Vec<String>,
}

impl ModelChain {
    pub fn new<I, S>(models: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let models: Vec<String> = models.into_iter().map(Into::into).collect();
        if models.is_empty() {
            return Err(Error::InvalidConfig("model chain is empty".into()));
        }
        Ok(Self { models })
    }

    pub fn from_settings(settings: &QuizSettings) -> Result<Self> {
        Self::new(settings.models.iter().cloned())
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainState {
    Trying { index: usize, failures: Vec<AttemptFailure> },
    Succeeded { model: String, questions: Vec<QuizQuestion>, failures: Vec<AttemptFailure> },
    Exhausted(Vec<AttemptFailure>),
}

impl ChainState {
    pub fn start(chain: &ModelChain) -> Self {
        if chain.is_empty() {
            ChainState::Exhausted(Vec::new())
        } else {
            ChainState::Trying { index: 0, failures: Vec::new() }
        }
    }

    /// Model the next attempt must call, if the chain is still running.
    pub fn current_model<'a>(&self, chain: &'a ModelChain) -> Option<&'a str> {
        match self {
            ChainState::Trying { index, .. } => chain.models().get(*index).map(String::as_str),
            _ => None,
        }
    }

    /// Apply the outcome of the attempt on `current_model`. Terminal states
    /// are returned unchanged.
    pub fn record(self, chain: &ModelChain, outcome: std::result::Result<Vec<QuizQuestion>, AttemptError>) -> Self {
        let (index, mut failures) = match self {
            ChainState::Trying { index, failures } => (index, failures),
            terminal => return terminal,
        };
        let Some(model) = chain.models().get(index) else {
            return ChainState::Exhausted(failures);
        };
        match outcome {
            Ok(questions) => ChainState::Succeeded { model: model.clone(), questions, failures },
            Err(error) => {
                failures.push(AttemptFailure { model: model.clone(), error });
                let next = index + 1;
                if next >= chain.len() {
                    ChainState::Exhausted(failures)
                } else {
                    ChainState::Trying { index: next, failures }
                }
            }
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ChainState::Trying { .. })
    }

    pub fn failures(&self) -> &[AttemptFailure] {
        match self {
            ChainState::Trying { failures, .. }
            | ChainState::Succeeded { failures, .. }
            | ChainState::Exhausted(failures) => failures,
        }
    }
}
