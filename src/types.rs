use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::SyncConfig;
use crate::script::normalized_words;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Word exactly as written in the script, punctuation included.
    pub raw: String,
    /// Lowercased, punctuation-stripped form. Comparison only, never displayed.
    pub normalized: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phrase {
    /// Inclusive token interval `[start_index, end_index]`.
    pub start_index: usize,
    /// Inclusive token interval `[start_index, end_index]`.
    pub end_index: usize,
    pub text: String,
}

impl Phrase {
    pub fn contains(&self, token_index: usize) -> bool {
        self.start_index <= token_index && token_index <= self.end_index
    }

    pub fn token_count(&self) -> usize {
        self.end_index - self.start_index + 1
    }
}

/// Segmented script. Immutable; a changed source is segmented again from scratch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub id: String,
    pub tokens: Vec<Token>,
    pub phrases: Vec<Phrase>,
    /// `token_phrase[i]` is the index into `phrases` of the phrase owning token `i`.
    pub(crate) token_phrase: Vec<usize>,
}

impl Script {
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn phrase_index_of(&self, token_index: usize) -> Option<usize> {
        self.token_phrase.get(token_index).copied()
    }

    pub fn phrase_of(&self, token_index: usize) -> Option<&Phrase> {
        self.phrase_index_of(token_index)
            .and_then(|idx| self.phrases.get(idx))
    }

    /// Inclusive `[start, end]` token ranges, one per phrase.
    pub fn phrase_ranges(&self) -> Vec<[usize; 2]> {
        self.phrases
            .iter()
            .map(|p| [p.start_index, p.end_index])
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScriptDocument {
    #[serde(deserialize_with = "deserialize_document_id")]
    pub id: String,
    pub content: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDocumentId {
    Number(u64),
    Text(String),
}

fn deserialize_document_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawDocumentId::deserialize(deserializer)? {
        RawDocumentId::Number(n) => n.to_string(),
        RawDocumentId::Text(s) => s,
    })
}

/// Wire shape served to the front end for one script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentedScript {
    pub id: String,
    pub visual: Vec<String>,
    pub compare: Vec<String>,
    pub phrase: Vec<String>,
    #[serde(rename = "phraseIndex")]
    pub phrase_index: Vec<[usize; 2]>,
}

impl From<&Script> for SegmentedScript {
    fn from(script: &Script) -> Self {
        Self {
            id: script.id.clone(),
            visual: script
                .tokens
                .iter()
                .map(|t| format!("{} ", t.raw))
                .collect(),
            compare: script.tokens.iter().map(|t| t.normalized.clone()).collect(),
            phrase: script.phrases.iter().map(|p| p.text.clone()).collect(),
            phrase_index: script.phrase_ranges(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub text: String,
    /// Window is `[start_index, end_index)`.
    pub start_index: usize,
    /// Exclusive.
    pub end_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    /// Exclusive end of the winning window, i.e. the new read position.
    pub winning_index: usize,
    pub score: f32,
    pub matched_text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchRequest {
    pub heard_text: String,
    pub start_index: usize,
    pub max_length: usize,
    pub threshold: f32,
}

impl MatchRequest {
    /// Request for a finalized utterance read from `position`. The window cap
    /// follows the heard word count plus the configured slack.
    pub fn for_utterance(heard_text: &str, position: usize, config: &SyncConfig) -> Self {
        let heard_words = normalized_words(heard_text).len();
        let max_length = heard_words
            .saturating_add(config.window_slack)
            .min(config.max_window_len)
            .max(1);
        Self {
            heard_text: heard_text.to_string(),
            start_index: position,
            max_length,
            threshold: config.threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RoundOutcome {
    Advanced {
        previous: usize,
        position: usize,
        #[serde(rename = "match")]
        matched: MatchResult,
    },
    /// Utterance too short to match reliably; nothing was scored.
    Skipped { position: usize, heard_words: usize },
    /// Position already sits at the end of the script.
    Exhausted { position: usize },
}

impl RoundOutcome {
    pub fn position(&self) -> usize {
        match self {
            Self::Advanced { position, .. }
            | Self::Skipped { position, .. }
            | Self::Exhausted { position } => *position,
        }
    }
}

/// One position advance, as handed to the presentation-control transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvanceEvent {
    pub session_id: String,
    pub script_id: String,
    pub previous: usize,
    pub position: usize,
    /// Phrase owning the last consumed token, if any token was consumed.
    pub phrase_index: Option<usize>,
    /// The last consumed token closes its phrase.
    pub phrase_completed: bool,
    pub score: Option<f32>,
    pub emitted_at: DateTime<Utc>,
}
