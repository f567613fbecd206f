use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Semaphore;

use crate::pipeline::traits::AdvanceSink;
use crate::types::{AdvanceEvent, MatchResult, Script};

mod registry;

pub use registry::{SessionHandle, SessionRegistry};

/// One live synchronization run over a script.
///
/// The read position starts at 0 and only moves forward, except through an
/// explicit [`Session::reset`].
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    script: Arc<Script>,
    position: usize,
    /// One permit, held by the provider call for as long as it runs, even
    /// after its round has timed out.
    scoring: Arc<Semaphore>,
}

impl Session {
    pub fn new(id: impl Into<String>, script: Arc<Script>) -> Self {
        Self {
            id: id.into(),
            script,
            position: 0,
            scoring: Arc::new(Semaphore::new(1)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn scoring_guard(&self) -> &Arc<Semaphore> {
        &self.scoring
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.script.token_count()
    }

    /// Moves the position to `max(position, result.winning_index)` and
    /// publishes the change. Returns the new position.
    pub fn advance(&mut self, result: &MatchResult, sink: &dyn AdvanceSink) -> usize {
        let previous = self.position;
        if result.winning_index < previous {
            tracing::warn!(
                session_id = %self.id,
                position = previous,
                winning_index = result.winning_index,
                "ignoring backward match"
            );
        }
        self.position = previous.max(result.winning_index);
        if self.position != previous {
            sink.publish(self.event(previous, Some(result.score)));
        }
        self.position
    }

    pub fn reset(&mut self, sink: &dyn AdvanceSink) {
        let previous = self.position;
        self.position = 0;
        tracing::info!(session_id = %self.id, previous, "session position reset");
        if previous != 0 {
            sink.publish(self.event(previous, None));
        }
    }

    fn event(&self, previous: usize, score: Option<f32>) -> AdvanceEvent {
        let last_consumed = self.position.checked_sub(1);
        let phrase = last_consumed.and_then(|idx| {
            self.script
                .phrase_index_of(idx)
                .map(|phrase_idx| (phrase_idx, self.script.phrases[phrase_idx].end_index == idx))
        });
        AdvanceEvent {
            session_id: self.id.clone(),
            script_id: self.script.id.clone(),
            previous,
            position: self.position,
            phrase_index: phrase.map(|(idx, _)| idx),
            phrase_completed: phrase.is_some_and(|(_, completed)| completed),
            score,
            emitted_at: Utc::now(),
        }
    }
}
