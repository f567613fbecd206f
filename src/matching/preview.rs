use crate::script::normalized_words;
use crate::types::Script;

/// Locates the token a partial (not yet final) recognition result has most
/// likely reached, for provisional highlighting. Never moves the position.
///
/// Looks for the last heard word among the `lookahead` tokens starting at
/// `start_index` and returns the first exact match on normalized form.
pub fn preview_position(
    script: &Script,
    start_index: usize,
    partial_text: &str,
    lookahead: usize,
) -> Option<usize> {
    let words = normalized_words(partial_text);
    let last_word = words.last()?;
    let end = start_index
        .saturating_add(lookahead)
        .min(script.token_count());
    (start_index..end).find(|&idx| script.tokens[idx].normalized == *last_word)
}
