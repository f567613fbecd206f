mod preview;
mod selector;
mod windows;
#[cfg(test)]
mod tests;

pub(crate) use selector::candidate_texts;
pub use preview::preview_position;
pub use selector::{pick_winner, select_match, validate_threshold};
pub use windows::generate_windows;
