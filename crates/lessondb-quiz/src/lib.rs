//! Quiz generation: prompt construction, a sequential model fallback chain
//! and strict validation of untrusted model output.

pub mod chain;
pub mod engine;
pub mod extract;
pub mod gemini;
pub mod normalize;
pub mod prompt;
pub mod request;

pub use chain::{AttemptError, AttemptFailure, ChainState, ModelChain};
pub use engine::QuizEngine;
pub use gemini::GeminiGenerator;
pub use request::{QuizRequest, QuizResponse};
