use tokio::sync::broadcast;

use crate::config::SyncConfig;
use crate::pipeline::traits::AdvanceSink;
use crate::types::AdvanceEvent;

/// Fans advance events out to every subscribed transport connection.
///
/// Each subscriber buffers at most `capacity` events. A subscriber that falls
/// further behind skips the oldest ones and sees `RecvError::Lagged`; dropped
/// subscribers simply stop counting.
pub struct AdvancePublisher {
    sender: broadcast::Sender<AdvanceEvent>,
}

impl AdvancePublisher {
    pub fn new() -> Self {
        Self::with_capacity(SyncConfig::DEFAULT_EVENT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::with_capacity(config.event_capacity)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AdvanceEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for AdvancePublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl AdvanceSink for AdvancePublisher {
    fn publish(&self, event: AdvanceEvent) {
        let position = event.position;
        match self.sender.send(event) {
            Ok(delivered) => tracing::debug!(position, delivered, "advance published"),
            Err(broadcast::error::SendError(event)) => tracing::trace!(
                session_id = %event.session_id,
                position,
                "advance dropped, no subscribers"
            ),
        }
    }
}
