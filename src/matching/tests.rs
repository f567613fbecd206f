use std::sync::atomic::{AtomicUsize, Ordering};

use super::{generate_windows, pick_winner, select_match};
use crate::config::{SelectionPolicy, WindowForm};
use crate::error::SyncError;
use crate::pipeline::traits::SimilarityProvider;
use crate::script::segment;
use crate::types::Candidate;

/// Returns fixed scores and counts how often it was asked.
struct FixedScores {
    scores: Vec<f32>,
    calls: AtomicUsize,
}

impl FixedScores {
    fn new(scores: &[f32]) -> Self {
        Self {
            scores: scores.to_vec(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl SimilarityProvider for FixedScores {
    fn score(&self, _reference: &str, candidates: &[String]) -> Result<Vec<f32>, SyncError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.scores.iter().copied().take(candidates.len()).collect())
    }

    fn label(&self) -> String {
        "fixed".to_string()
    }
}

struct Offline;

impl SimilarityProvider for Offline {
    fn score(&self, _reference: &str, _candidates: &[String]) -> Result<Vec<f32>, SyncError> {
        Err(SyncError::scoring_unavailable("model not loaded"))
    }

    fn label(&self) -> String {
        "offline".to_string()
    }
}

fn make_candidates(n: usize) -> Vec<Candidate> {
    let script = segment("t", "w0 w1 w2 w3 w4 w5 w6 w7").unwrap();
    generate_windows(&script, 0, n, WindowForm::Display).unwrap()
}

#[test]
fn early_exit_prefers_first_candidate_over_threshold() {
    let candidates = make_candidates(3);
    let provider = FixedScores::new(&[0.2, 0.9, 0.95]);
    let result = select_match(
        &provider,
        "w0 w1",
        &candidates,
        0.5,
        SelectionPolicy::FirstAboveThreshold,
    )
    .unwrap();
    assert_eq!(result.winning_index, 2);
    assert_eq!(result.score, 0.9);
    assert_eq!(result.matched_text, "w0 w1");
}

#[test]
fn scores_are_requested_in_a_single_batch() {
    let candidates = make_candidates(5);
    let provider = FixedScores::new(&[0.1, 0.2, 0.3, 0.4, 0.5]);
    select_match(
        &provider,
        "anything",
        &candidates,
        0.9,
        SelectionPolicy::FirstAboveThreshold,
    )
    .unwrap();
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn fallback_ties_go_to_the_shortest_window() {
    let candidates = make_candidates(3);
    let result = pick_winner(
        &candidates,
        &[0.3, 0.3, 0.1],
        0.8,
        SelectionPolicy::FirstAboveThreshold,
    )
    .unwrap();
    assert_eq!(result.winning_index, 1);
    assert_eq!(result.score, 0.3);
}

#[test]
fn fallback_picks_maximum_when_nothing_reaches_threshold() {
    let candidates = make_candidates(4);
    let result = pick_winner(
        &candidates,
        &[0.1, 0.4, 0.6, 0.2],
        0.8,
        SelectionPolicy::FirstAboveThreshold,
    )
    .unwrap();
    assert_eq!(result.winning_index, 3);
}

#[test]
fn best_score_policy_ignores_early_exit() {
    let candidates = make_candidates(3);
    let result =
        pick_winner(&candidates, &[0.2, 0.9, 0.95], 0.5, SelectionPolicy::BestScore).unwrap();
    assert_eq!(result.winning_index, 3);
    assert_eq!(result.score, 0.95);
}

#[test]
fn selection_follows_end_index_not_input_order() {
    let mut candidates = make_candidates(3);
    candidates.reverse();
    // Scores line up with the reversed order: end 3, end 2, end 1.
    let result = pick_winner(
        &candidates,
        &[0.95, 0.9, 0.2],
        0.5,
        SelectionPolicy::FirstAboveThreshold,
    )
    .unwrap();
    assert_eq!(result.winning_index, 2);
}

#[test]
fn nan_scores_never_win() {
    let candidates = make_candidates(3);
    let result = pick_winner(
        &candidates,
        &[f32::NAN, 0.05, f32::NAN],
        0.5,
        SelectionPolicy::FirstAboveThreshold,
    )
    .unwrap();
    assert_eq!(result.winning_index, 2);
}

#[test]
fn empty_candidates_fail_with_no_candidates() {
    let provider = FixedScores::new(&[]);
    let result = select_match(
        &provider,
        "hello",
        &[],
        0.5,
        SelectionPolicy::FirstAboveThreshold,
    );
    assert!(matches!(result, Err(SyncError::NoCandidates)));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn exhausted_script_leads_to_no_candidates() {
    let script = segment("t", "only three words").unwrap();
    let windows =
        generate_windows(&script, script.token_count(), 10, WindowForm::Display).unwrap();
    assert!(windows.is_empty());
    let result = select_match(
        &FixedScores::new(&[]),
        "words",
        &windows,
        0.5,
        SelectionPolicy::FirstAboveThreshold,
    );
    assert!(matches!(result, Err(SyncError::NoCandidates)));
}

#[test]
fn thresholds_outside_unit_range_are_rejected() {
    let candidates = make_candidates(2);
    for threshold in [-0.1f32, 1.01, f32::NAN] {
        let result = pick_winner(
            &candidates,
            &[0.5, 0.5],
            threshold,
            SelectionPolicy::FirstAboveThreshold,
        );
        assert!(matches!(result, Err(SyncError::InvalidThreshold { .. })));
    }
    assert!(pick_winner(&candidates, &[0.5, 0.5], 0.0, SelectionPolicy::BestScore).is_ok());
    assert!(pick_winner(&candidates, &[0.5, 0.5], 1.0, SelectionPolicy::BestScore).is_ok());
}

#[test]
fn short_score_vector_is_a_scoring_failure() {
    let candidates = make_candidates(3);
    let provider = FixedScores::new(&[0.4]);
    let result = select_match(
        &provider,
        "w0",
        &candidates,
        0.5,
        SelectionPolicy::FirstAboveThreshold,
    );
    assert!(matches!(result, Err(SyncError::ScoringUnavailable { .. })));
}

#[test]
fn provider_failure_surfaces_as_scoring_unavailable() {
    let candidates = make_candidates(2);
    let result = select_match(
        &Offline,
        "w0",
        &candidates,
        0.5,
        SelectionPolicy::FirstAboveThreshold,
    );
    let err = result.unwrap_err();
    assert!(err.is_retryable());
}
