/// Cosine similarity of two vectors.
///
/// `None` when the similarity is undefined: empty input, mismatched
/// dimensionality or a zero-magnitude vector on either side. Callers must
/// exclude such pairs instead of scoring them as zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.is_empty() || a.len() != b.len() {
        return None;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }

    let sim = dot / (norm_a.sqrt() * norm_b.sqrt());
    if !sim.is_finite() {
        return None;
    }
    // Rounding can push identical vectors a hair past 1.0.
    Some(sim.clamp(-1.0, 1.0) as f32)
}
