pub mod config;
pub mod error;
pub mod matching;
pub mod pipeline;
pub mod publish;
pub mod script;
pub mod session;
pub mod similarity;
pub mod types;

pub use config::{SelectionPolicy, SyncConfig, WindowForm};
pub use error::SyncError;
pub use pipeline::builder::SyncEngineBuilder;
pub use pipeline::runtime::SyncEngine;
pub use pipeline::traits::{AdvanceSink, Embedder, SimilarityProvider};
pub use publish::AdvancePublisher;
pub use session::{Session, SessionHandle, SessionRegistry};
pub use types::{
    AdvanceEvent, Candidate, MatchRequest, MatchResult, Phrase, RoundOutcome, Script,
    ScriptDocument, SegmentedScript, Token,
};
