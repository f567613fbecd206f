use candle_core::{Device, Tensor};

use crate::error::SyncError;
use crate::pipeline::traits::{Embedder, SimilarityProvider};

/// Cosine similarity between sentence embeddings produced by an [`Embedder`].
///
/// The reference and all candidates are embedded in one batch, so every score
/// in a round comes from the same model call. Scores lie in `[-1, 1]`.
///
/// This crate ships no embedding model: the embedder is supplied by the
/// embedding application, typically wrapping a sentence-embedding model or a
/// remote inference endpoint. Without one, engines fall back to
/// [`LexicalSimilarity`](crate::similarity::LexicalSimilarity).
pub struct EmbeddingSimilarity<E> {
    embedder: E,
    device: Device,
    label: String,
}

impl<E: Embedder> EmbeddingSimilarity<E> {
    pub fn new(embedder: E, label: impl Into<String>) -> Self {
        Self {
            embedder,
            device: Device::Cpu,
            label: label.into(),
        }
    }

    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }
}

impl<E: Embedder> SimilarityProvider for EmbeddingSimilarity<E> {
    fn score(&self, reference: &str, candidates: &[String]) -> Result<Vec<f32>, SyncError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let mut batch = Vec::with_capacity(candidates.len() + 1);
        batch.push(reference.to_string());
        batch.extend(candidates.iter().cloned());
        let embeddings = self.embedder.embed(&batch)?;
        if embeddings.len() != batch.len() {
            return Err(SyncError::scoring_unavailable(format!(
                "embedder returned {} vectors for {} texts",
                embeddings.len(),
                batch.len()
            )));
        }

        let dim = embeddings[0].len();
        if dim == 0 || embeddings.iter().any(|e| e.len() != dim) {
            return Err(SyncError::scoring_unavailable(
                "embedder returned vectors of inconsistent dimension",
            ));
        }

        cosine_scores(&embeddings, dim, &self.device).map_err(SyncError::scoring_unavailable)
    }

    fn label(&self) -> String {
        self.label.clone()
    }
}

/// Row 0 is the reference; returns its cosine against rows 1..
fn cosine_scores(
    embeddings: &[Vec<f32>],
    dim: usize,
    device: &Device,
) -> candle_core::Result<Vec<f32>> {
    let flat: Vec<f32> = embeddings.iter().flatten().copied().collect();
    let matrix = Tensor::from_vec(flat, (embeddings.len(), dim), device)?;
    let norms = matrix.sqr()?.sum_keepdim(1)?.sqrt()?.affine(1.0, 1e-12)?;
    let unit = matrix.broadcast_div(&norms)?;

    let reference = unit.narrow(0, 0, 1)?;
    let candidates = unit.narrow(0, 1, embeddings.len() - 1)?;
    candidates
        .matmul(&reference.t()?.contiguous()?)?
        .squeeze(1)?
        .to_vec1::<f32>()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Embeds text as letter counts for `a`, `b`, `c`.
    struct LetterCounts;

    impl Embedder for LetterCounts {
        fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, SyncError> {
            Ok(texts
                .iter()
                .map(|t| {
                    ['a', 'b', 'c']
                        .iter()
                        .map(|&l| t.chars().filter(|&c| c == l).count() as f32)
                        .collect()
                })
                .collect())
        }
    }

    struct Ragged;

    impl Embedder for Ragged {
        fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, SyncError> {
            Ok(texts
                .iter()
                .enumerate()
                .map(|(i, _)| vec![1.0; i + 1])
                .collect())
        }
    }

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn cosine_of_embeddings() {
        let provider = EmbeddingSimilarity::new(LetterCounts, "letters");
        let scores = provider
            .score("aa", &texts(&["a", "b", "ab", "aaaa"]))
            .unwrap();
        assert_eq!(scores.len(), 4);
        assert!((scores[0] - 1.0).abs() < 1e-5);
        assert!(scores[1].abs() < 1e-5);
        assert!((scores[2] - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-5);
        assert!((scores[3] - 1.0).abs() < 1e-5);
        assert_eq!(provider.label(), "letters");
    }

    #[test]
    fn zero_vectors_do_not_produce_nan() {
        let provider = EmbeddingSimilarity::new(LetterCounts, "letters");
        let scores = provider.score("zzz", &texts(&["abc"])).unwrap();
        assert!(scores[0].is_finite());
        assert!(scores[0].abs() < 1e-5);
    }

    #[test]
    fn inconsistent_dimensions_are_a_scoring_failure() {
        let provider = EmbeddingSimilarity::new(Ragged, "ragged");
        let err = provider.score("x", &texts(&["y", "z"])).unwrap_err();
        assert!(matches!(err, SyncError::ScoringUnavailable { .. }));
    }

    #[test]
    fn no_candidates_skip_the_embedder() {
        let provider = EmbeddingSimilarity::new(Ragged, "ragged");
        assert!(provider.score("x", &[]).unwrap().is_empty());
    }
}
