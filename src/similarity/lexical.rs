use std::collections::HashMap;

use crate::error::SyncError;
use crate::pipeline::traits::SimilarityProvider;
use crate::script::normalized_words;

/// Bag-of-words cosine similarity over normalized words.
///
/// Deterministic and dependency free, in `[0, 1]`. Good enough for scripted
/// speech where the speaker mostly reads verbatim; use an embedding backend for
/// paraphrase tolerance.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexicalSimilarity;

impl SimilarityProvider for LexicalSimilarity {
    fn score(&self, reference: &str, candidates: &[String]) -> Result<Vec<f32>, SyncError> {
        let reference = term_counts(reference);
        Ok(candidates
            .iter()
            .map(|candidate| cosine(&reference, &term_counts(candidate)))
            .collect())
    }

    fn label(&self) -> String {
        "lexical-cosine".to_string()
    }
}

fn term_counts(text: &str) -> HashMap<String, f32> {
    let mut counts = HashMap::new();
    for word in normalized_words(text) {
        *counts.entry(word).or_insert(0.0) += 1.0;
    }
    counts
}

fn cosine(a: &HashMap<String, f32>, b: &HashMap<String, f32>) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let dot: f32 = a
        .iter()
        .filter_map(|(word, &count)| b.get(word).map(|&other| count * other))
        .sum();
    let norm = |m: &HashMap<String, f32>| m.values().map(|v| v * v).sum::<f32>().sqrt();
    (dot / (norm(a) * norm(b))).clamp(0.0, 1.0)
}
