pub mod context;
pub mod engine;
pub mod similarity;

pub use context::{format_context, NO_MATERIAL_FOUND};
pub use engine::{SearchOptions, SemanticSearchEngine};
pub use similarity::cosine_similarity;
