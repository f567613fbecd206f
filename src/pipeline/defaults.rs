use crate::pipeline::traits::AdvanceSink;
use crate::types::AdvanceEvent;

/// Drops every advance. Used when no transport is attached.
pub struct NoopSink;

impl AdvanceSink for NoopSink {
    fn publish(&self, event: AdvanceEvent) {
        tracing::trace!(
            session_id = %event.session_id,
            position = event.position,
            "no transport attached, dropping advance"
        );
    }
}

/// Logs every advance at info level.
pub struct LoggingSink;

impl AdvanceSink for LoggingSink {
    fn publish(&self, event: AdvanceEvent) {
        tracing::info!(
            session_id = %event.session_id,
            script_id = %event.script_id,
            previous = event.previous,
            position = event.position,
            phrase_index = ?event.phrase_index,
            phrase_completed = event.phrase_completed,
            "position advanced"
        );
    }
}
