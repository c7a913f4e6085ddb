//! Cosine similarity scoring.

/// Added to the denominator so all-zero vectors score 0.0 instead of NaN.
const EPSILON: f64 = 1e-9;

/// Compute cosine similarity between two vectors.
///
/// Returns `dot(a, b) / (|a| * |b| + 1e-9)`, accumulated in f64. The result
/// is not clamped: ordering only depends on relative magnitude.
///
/// Returns 0.0 if either vector is empty or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt() + EPSILON)
}
