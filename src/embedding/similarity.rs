//! Pure vector math over fixed-length embedding vectors.

/// Cosine similarity in [-1.0, 1.0].
///
/// Returns 0.0 on dimension mismatch, empty input, or a zero-norm vector;
/// never divides by zero. Callers that need a [0, 1] factor clamp the
/// result themselves.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a.len() != b.len() {
        tracing::warn!(
            a_len = a.len(),
            b_len = b.len(),
            "embedding dimension mismatch; returning zero similarity"
        );
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x * y) as f64).sum();
    let norm_a: f64 = a.iter().map(|x| (x * x) as f64).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (x * x) as f64).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// L2-normalized copy of `v`; an unchanged copy when the norm is zero.
pub fn normalize(v: &[f32]) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 {
        return v.to_vec();
    }
    v.iter().map(|x| x / norm).collect()
}
