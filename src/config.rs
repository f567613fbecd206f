use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::SyncError;

/// Which token form is joined into candidate window text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowForm {
    Display,
    Comparison,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Shortest window reaching the threshold wins; max score otherwise.
    FirstAboveThreshold,
    /// Always the max score, ties to the shortest window.
    BestScore,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub threshold: f32,
    pub max_window_len: usize,
    pub window_slack: usize,
    pub min_heard_words: usize,
    pub scoring_timeout_ms: u64,
    pub window_form: WindowForm,
    pub selection: SelectionPolicy,
    pub preview_lookahead: usize,
    pub session_queue_capacity: usize,
    /// Provider calls one engine may have running at once, across sessions.
    pub max_concurrent_scoring: usize,
    /// Advance events buffered per subscriber before the oldest are dropped.
    pub event_capacity: usize,
}

impl SyncConfig {
    pub const DEFAULT_THRESHOLD: f32 = 0.9;
    pub const DEFAULT_MAX_WINDOW_LEN: usize = 32;
    pub const DEFAULT_SCORING_TIMEOUT_MS: u64 = 2_000;
    pub const DEFAULT_EVENT_CAPACITY: usize = 256;

    pub fn load(path: &Path) -> Result<Self, SyncError> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SyncError::not_found("sync config", path.display().to_string())
            } else {
                SyncError::io("read sync config", path, e)
            }
        })?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|e| SyncError::invalid_format("parse sync config", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SyncError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(SyncError::InvalidThreshold {
                threshold: self.threshold,
            });
        }
        if self.max_window_len == 0 {
            return Err(SyncError::invalid_config("max_window_len must be >= 1"));
        }
        if self.scoring_timeout_ms == 0 {
            return Err(SyncError::invalid_config("scoring_timeout_ms must be >= 1"));
        }
        if self.session_queue_capacity == 0 {
            return Err(SyncError::invalid_config(
                "session_queue_capacity must be >= 1",
            ));
        }
        if self.max_concurrent_scoring == 0 {
            return Err(SyncError::invalid_config(
                "max_concurrent_scoring must be >= 1",
            ));
        }
        if self.event_capacity == 0 {
            return Err(SyncError::invalid_config("event_capacity must be >= 1"));
        }
        Ok(())
    }

    pub fn scoring_timeout(&self) -> Duration {
        Duration::from_millis(self.scoring_timeout_ms)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
            max_window_len: Self::DEFAULT_MAX_WINDOW_LEN,
            window_slack: 2,
            min_heard_words: 3,
            scoring_timeout_ms: Self::DEFAULT_SCORING_TIMEOUT_MS,
            window_form: WindowForm::Display,
            selection: SelectionPolicy::FirstAboveThreshold,
            preview_lookahead: 8,
            session_queue_capacity: 32,
            max_concurrent_scoring: 8,
            event_capacity: Self::DEFAULT_EVENT_CAPACITY,
        }
    }
}
