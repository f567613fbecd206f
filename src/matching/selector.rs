use crate::config::SelectionPolicy;
use crate::error::SyncError;
use crate::pipeline::traits::SimilarityProvider;
use crate::types::{Candidate, MatchResult};

pub fn validate_threshold(threshold: f32) -> Result<(), SyncError> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(SyncError::InvalidThreshold { threshold })
    }
}

/// Scores every candidate in one provider call and picks the winner.
pub fn select_match(
    provider: &dyn SimilarityProvider,
    heard_text: &str,
    candidates: &[Candidate],
    threshold: f32,
    policy: SelectionPolicy,
) -> Result<MatchResult, SyncError> {
    validate_threshold(threshold)?;
    if candidates.is_empty() {
        return Err(SyncError::NoCandidates);
    }
    let texts = candidate_texts(candidates);
    let scores = provider.score(heard_text, &texts)?;
    pick_winner(candidates, &scores, threshold, policy)
}

pub(crate) fn candidate_texts(candidates: &[Candidate]) -> Vec<String> {
    candidates.iter().map(|c| c.text.clone()).collect()
}

/// Applies the selection policy to already computed scores.
///
/// Candidates are visited by ascending `end_index`. Under
/// [`SelectionPolicy::FirstAboveThreshold`] the first one reaching
/// `threshold` wins outright; otherwise the maximum score wins, ties going to
/// the smallest `end_index`. NaN scores never win against a real score.
pub fn pick_winner(
    candidates: &[Candidate],
    scores: &[f32],
    threshold: f32,
    policy: SelectionPolicy,
) -> Result<MatchResult, SyncError> {
    validate_threshold(threshold)?;
    if candidates.is_empty() {
        return Err(SyncError::NoCandidates);
    }
    if scores.len() != candidates.len() {
        return Err(SyncError::scoring_unavailable(format!(
            "provider returned {} scores for {} candidates",
            scores.len(),
            candidates.len()
        )));
    }

    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by_key(|&i| candidates[i].end_index);

    if policy == SelectionPolicy::FirstAboveThreshold {
        if let Some(&idx) = order.iter().find(|&&i| scores[i] >= threshold) {
            return Ok(to_result(&candidates[idx], scores[idx]));
        }
    }

    let mut best = order[0];
    for &idx in &order[1..] {
        if rank(scores[idx]) > rank(scores[best]) {
            best = idx;
        }
    }
    Ok(to_result(&candidates[best], scores[best]))
}

fn rank(score: f32) -> f32 {
    if score.is_nan() {
        f32::NEG_INFINITY
    } else {
        score
    }
}

fn to_result(candidate: &Candidate, score: f32) -> MatchResult {
    MatchResult {
        winning_index: candidate.end_index,
        score,
        matched_text: candidate.text.clone(),
    }
}
