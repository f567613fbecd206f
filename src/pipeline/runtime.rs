use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::matching::{
    candidate_texts, generate_windows, pick_winner, preview_position, validate_threshold,
};
use crate::pipeline::traits::{AdvanceSink, SimilarityProvider};
use crate::script::normalized_words;
use crate::session::Session;
use crate::types::{MatchRequest, MatchResult, RoundOutcome, Script};

/// Runs matching rounds. Holds no per-session state, so one engine can be
/// shared by every session; rounds of a single session must still be
/// serialized by the caller (see [`crate::session::SessionRegistry`]).
pub struct SyncEngine {
    provider: Arc<dyn SimilarityProvider>,
    sink: Arc<dyn AdvanceSink>,
    config: SyncConfig,
    scoring_permits: Arc<Semaphore>,
}

pub(crate) struct SyncEngineParts {
    pub provider: Arc<dyn SimilarityProvider>,
    pub sink: Arc<dyn AdvanceSink>,
    pub config: SyncConfig,
}

impl SyncEngine {
    pub(crate) fn from_parts(parts: SyncEngineParts) -> Self {
        Self {
            provider: parts.provider,
            sink: parts.sink,
            scoring_permits: Arc::new(Semaphore::new(parts.config.max_concurrent_scoring)),
            config: parts.config,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn provider_label(&self) -> String {
        self.provider.label()
    }

    /// Generates windows at `request.start_index`, scores them against the
    /// heard text in one bounded provider call and selects the winner.
    pub async fn match_round(
        &self,
        script: &Script,
        request: &MatchRequest,
    ) -> Result<MatchResult, SyncError> {
        self.run_round(script, request, None).await
    }

    async fn run_round(
        &self,
        script: &Script,
        request: &MatchRequest,
        in_flight: Option<&Arc<Semaphore>>,
    ) -> Result<MatchResult, SyncError> {
        validate_threshold(request.threshold)?;
        let windows = generate_windows(
            script,
            request.start_index,
            request.max_length,
            self.config.window_form,
        )?;
        if windows.is_empty() {
            tracing::debug!(
                script_id = %script.id,
                start_index = request.start_index,
                token_count = script.token_count(),
                "script exhausted, nothing to match"
            );
            return Err(SyncError::NoCandidates);
        }

        let scores = self
            .score_with_timeout(
                request.heard_text.clone(),
                candidate_texts(&windows),
                in_flight,
            )
            .await?;
        let result = pick_winner(&windows, &scores, request.threshold, self.config.selection)?;
        tracing::debug!(
            script_id = %script.id,
            start_index = request.start_index,
            windows = windows.len(),
            winning_index = result.winning_index,
            score = format!("{:.3}", result.score),
            "matching: selected window"
        );
        Ok(result)
    }

    /// One full round for a finalized speech segment. On error the session is
    /// left untouched.
    pub async fn process_utterance(
        &self,
        session: &mut Session,
        heard_text: &str,
    ) -> Result<RoundOutcome, SyncError> {
        let heard_words = normalized_words(heard_text).len();
        if heard_words < self.config.min_heard_words {
            tracing::debug!(
                session_id = %session.id(),
                heard_words,
                min_heard_words = self.config.min_heard_words,
                "utterance too short, skipping"
            );
            return Ok(RoundOutcome::Skipped {
                position: session.position(),
                heard_words,
            });
        }
        if session.is_exhausted() {
            return Ok(RoundOutcome::Exhausted {
                position: session.position(),
            });
        }

        let request = MatchRequest::for_utterance(heard_text, session.position(), &self.config);
        let matched = match self
            .run_round(session.script(), &request, Some(session.scoring_guard()))
            .await
        {
            Ok(matched) => matched,
            Err(err) => {
                tracing::warn!(
                    session_id = %session.id(),
                    position = session.position(),
                    retryable = err.is_retryable(),
                    error = %err,
                    "matching round failed, position unchanged"
                );
                return Err(err);
            }
        };

        let previous = session.position();
        let position = session.advance(&matched, self.sink.as_ref());
        tracing::info!(
            session_id = %session.id(),
            previous,
            position,
            "session advanced"
        );
        Ok(RoundOutcome::Advanced {
            previous,
            position,
            matched,
        })
    }

    /// Provisional position for a partial recognition result. Read-only.
    pub fn preview(&self, session: &Session, partial_text: &str) -> Option<usize> {
        preview_position(
            session.script(),
            session.position(),
            partial_text,
            self.config.preview_lookahead,
        )
    }

    pub fn reset(&self, session: &mut Session) {
        session.reset(self.sink.as_ref());
    }

    /// Runs the provider on the blocking pool under the scoring timeout.
    ///
    /// The engine and session permits move into the blocking call, so a call
    /// that outlives its timeout still counts against both limits until the
    /// provider returns. A session whose previous call is still running fails
    /// fast instead of occupying another blocking thread.
    async fn score_with_timeout(
        &self,
        heard_text: String,
        candidates: Vec<String>,
        in_flight: Option<&Arc<Semaphore>>,
    ) -> Result<Vec<f32>, SyncError> {
        let session_permit = match in_flight {
            Some(guard) => Some(Arc::clone(guard).try_acquire_owned().map_err(|_| {
                SyncError::scoring_unavailable("previous scoring call is still running")
            })?),
            None => None,
        };
        let provider = Arc::clone(&self.provider);
        let permits = Arc::clone(&self.scoring_permits);
        let call = async move {
            let engine_permit = permits
                .acquire_owned()
                .await
                .map_err(SyncError::scoring_unavailable)?;
            tokio::task::spawn_blocking(move || {
                let _permits = (engine_permit, session_permit);
                provider.score(&heard_text, &candidates)
            })
            .await
            .map_err(SyncError::scoring_unavailable)?
        };
        match tokio::time::timeout(self.config.scoring_timeout(), call).await {
            Ok(result) => result,
            Err(_) => Err(SyncError::ScoringTimeout {
                timeout_ms: self.config.scoring_timeout_ms,
            }),
        }
    }
}
