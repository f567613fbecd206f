mod loader;
mod segmenter;

pub use loader::{
    find_script, load_documents, segment_document, segment_documents, segmented_view,
};
pub use segmenter::{normalize_word, normalized_words, segment, PHRASE_DELIMITERS};
