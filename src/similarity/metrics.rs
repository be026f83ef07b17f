//! Similarity Metrics
//!
//! Pure comparisons between equal-length feature vectors. Both metrics treat
//! the inputs as opaque numeric tuples; which sub-vector goes in is the
//! engine's decision.

/// Mean squared error between two equal-length vectors.
pub fn mean_squared_error(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    if a.is_empty() {
        return 0.0;
    }
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        / a.len() as f64
}

/// MSE converted to a percent-like score: `max(0, 100 - mse / scale)`.
///
/// Symmetric, bounded above by 100, clamped at 0.
pub fn mse_similarity(a: &[f64], b: &[f64], scale: f64) -> f64 {
    (100.0 - mean_squared_error(a, b) / scale).max(0.0)
}

/// Cosine similarity scaled to 100.
///
/// Each vector is taken at unit norm; a zero-norm vector is left unchanged,
/// which makes the degenerate score 0. The result is not clamped, so opposed
/// vectors score down to -100.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let dot = a.iter().zip(b).map(|(x, y)| x * y).sum::<f64>();
    100.0 * dot / (norm_a * norm_b)
}
