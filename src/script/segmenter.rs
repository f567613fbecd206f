use crate::error::SyncError;
use crate::types::{Phrase, Script, Token};

/// Characters that close a phrase when they appear anywhere in a token.
pub const PHRASE_DELIMITERS: [char; 6] = ['.', ',', '!', '?', ':', ';'];

const TYPOGRAPHIC_PUNCTUATION: [char; 9] = ['‘', '’', '“', '”', '–', '—', '…', '«', '»'];

pub fn normalize_word(word: &str) -> String {
    word.chars()
        .filter(|c| !c.is_ascii_punctuation() && !TYPOGRAPHIC_PUNCTUATION.contains(c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Normalized, non-empty words of free text (heard speech, candidate text).
pub fn normalized_words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(normalize_word)
        .filter(|w| !w.is_empty())
        .collect()
}

fn closes_phrase(word: &str) -> bool {
    word.chars().any(|c| PHRASE_DELIMITERS.contains(&c))
}

pub fn segment(id: impl Into<String>, raw_script: &str) -> Result<Script, SyncError> {
    let id = id.into();
    let trimmed = raw_script.trim();
    if trimmed.is_empty() {
        return Err(SyncError::malformed_script(format!(
            "script '{id}' is empty"
        )));
    }

    let mut tokens = Vec::new();
    let mut phrases = Vec::new();
    let mut token_phrase = Vec::new();
    let mut phrase_text = String::new();
    let mut phrase_start = 0usize;

    for (index, word) in trimmed.split_whitespace().enumerate() {
        tokens.push(Token {
            raw: word.to_string(),
            normalized: normalize_word(word),
        });
        token_phrase.push(phrases.len());
        phrase_text.push_str(word);
        phrase_text.push(' ');

        if closes_phrase(word) {
            phrases.push(Phrase {
                start_index: phrase_start,
                end_index: index,
                text: std::mem::take(&mut phrase_text),
            });
            phrase_start = index + 1;
        }
    }

    // Trailing words without terminal punctuation still form a phrase.
    if phrase_start < tokens.len() {
        phrases.push(Phrase {
            start_index: phrase_start,
            end_index: tokens.len() - 1,
            text: phrase_text,
        });
    }

    debug_assert!(
        phrases_partition(&phrases, tokens.len()),
        "phrase ranges must partition the token sequence"
    );

    Ok(Script {
        id,
        tokens,
        phrases,
        token_phrase,
    })
}

pub(crate) fn phrases_partition(phrases: &[Phrase], token_count: usize) -> bool {
    let mut next = 0usize;
    for phrase in phrases {
        if phrase.start_index != next || phrase.end_index < phrase.start_index {
            return false;
        }
        next = phrase.end_index + 1;
    }
    next == token_count
}
