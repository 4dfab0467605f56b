use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Repository error: {0}")]
    Repository(String),

    /// Every model in the chain failed. Per-model diagnostics stay in the logs.
    #[error("Quiz generation failed after {attempts} model attempt(s)")]
    GenerationFailed { attempts: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure reported by a generative model backend for a single call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed backend payload: {0}")]
    Malformed(String),

    #[error("attempt timed out after {0}s")]
    Timeout(u64),
}
