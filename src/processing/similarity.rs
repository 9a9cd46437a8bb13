//! Cosine similarity between texts.

use crate::processing::embedding::{EmbeddingResult, TextEmbedder};

/// Cosine similarity of two vectors in [-1, 1].
///
/// Mismatched lengths and zero vectors score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Embeds both texts and returns their cosine similarity.
pub fn score<E>(embedder: &E, text_a: &str, text_b: &str) -> EmbeddingResult<f32>
where
    E: TextEmbedder + ?Sized,
{
    let a = embedder.embed(text_a)?;
    let b = embedder.embed(text_b)?;
    Ok(cosine_similarity(&a, &b))
}
