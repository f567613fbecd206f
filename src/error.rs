use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("malformed script: {message}")]
    MalformedScript { message: String },
    #[error("{context} not found: {target}")]
    NotFound {
        context: &'static str,
        target: String,
    },
    #[error("invalid format while {context}: {source}")]
    InvalidFormat {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("I/O error while {context} ({}): {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no candidate windows to score")]
    NoCandidates,
    #[error("threshold {threshold} is outside [0, 1]")]
    InvalidThreshold { threshold: f32 },
    #[error("window length must be at least 1")]
    InvalidWindowLength,
    #[error("similarity provider unavailable: {message}")]
    ScoringUnavailable { message: String },
    #[error("similarity provider did not answer within {timeout_ms} ms")]
    ScoringTimeout { timeout_ms: u64 },
    #[error("invalid config: {message}")]
    InvalidConfig { message: String },
    #[error("session '{id}' does not exist")]
    SessionNotFound { id: String },
    #[error("session '{id}' is already open")]
    SessionExists { id: String },
    #[error("session '{id}' was closed")]
    SessionClosed { id: String },
    #[error("no Tokio runtime to run session '{id}' on")]
    RuntimeUnavailable { id: String },
}

impl SyncError {
    pub(crate) fn malformed_script(message: impl Into<String>) -> Self {
        Self::MalformedScript {
            message: message.into(),
        }
    }

    pub(crate) fn not_found(context: &'static str, target: impl Into<String>) -> Self {
        Self::NotFound {
            context,
            target: target.into(),
        }
    }

    pub(crate) fn invalid_format(context: &'static str, source: serde_json::Error) -> Self {
        Self::InvalidFormat { context, source }
    }

    pub(crate) fn io(context: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            context,
            path: path.into(),
            source,
        }
    }

    pub fn scoring_unavailable(err: impl std::fmt::Display) -> Self {
        Self::ScoringUnavailable {
            message: err.to_string(),
        }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Only scoring failures are transient; everything else points at a
    /// broken script or a misuse and should not be re-submitted as is.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ScoringUnavailable { .. } | Self::ScoringTimeout { .. }
        )
    }
}
