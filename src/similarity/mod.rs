mod embedding;
mod lexical;

pub use embedding::EmbeddingSimilarity;
pub use lexical::LexicalSimilarity;
