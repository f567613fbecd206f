use std::sync::Arc;

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::pipeline::defaults::NoopSink;
use crate::pipeline::runtime::{SyncEngine, SyncEngineParts};
use crate::pipeline::traits::{AdvanceSink, SimilarityProvider};
use crate::similarity::LexicalSimilarity;

pub struct SyncEngineBuilder {
    config: SyncConfig,
    provider: Option<Arc<dyn SimilarityProvider>>,
    sink: Option<Arc<dyn AdvanceSink>>,
}

impl SyncEngineBuilder {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            provider: None,
            sink: None,
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn SimilarityProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn AdvanceSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn build(self) -> Result<SyncEngine, SyncError> {
        self.config.validate()?;
        let provider = self
            .provider
            .unwrap_or_else(|| Arc::new(LexicalSimilarity));
        tracing::debug!(
            provider = %provider.label(),
            threshold = self.config.threshold,
            scoring_timeout_ms = self.config.scoring_timeout_ms,
            "building sync engine"
        );
        Ok(SyncEngine::from_parts(SyncEngineParts {
            provider,
            sink: self.sink.unwrap_or_else(|| Arc::new(NoopSink)),
            config: self.config,
        }))
    }
}
