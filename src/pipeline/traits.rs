use crate::error::SyncError;
use crate::types::AdvanceEvent;

/// Scores one reference text against an ordered batch of candidate texts.
///
/// Implementations must return exactly one score per candidate, in order.
/// Scores are only comparable within a single backend/model version.
pub trait SimilarityProvider: Send + Sync {
    fn score(&self, reference: &str, candidates: &[String]) -> Result<Vec<f32>, SyncError>;

    fn label(&self) -> String;
}

/// Maps texts to fixed-size embedding vectors.
pub trait Embedder: Send + Sync {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, SyncError>;
}

/// Receives position advances for the presentation-control transport.
/// Delivery is fire-and-forget.
pub trait AdvanceSink: Send + Sync {
    fn publish(&self, event: AdvanceEvent);
}
