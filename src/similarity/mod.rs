//! Similarity scoring between trial feature vectors

pub mod engine;
pub mod metrics;

pub use engine::{Decision, SimilarityEngine, SimilarityMode};
pub use metrics::{cosine_similarity, mean_squared_error, mse_similarity};
