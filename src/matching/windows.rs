use crate::config::WindowForm;
use crate::error::SyncError;
use crate::types::{Candidate, Script};

/// All prefix windows of the unread script starting at `start_index`, shortest
/// first, up to `max_length` tokens.
///
/// An empty result means the script is exhausted, not that the call failed.
pub fn generate_windows(
    script: &Script,
    start_index: usize,
    max_length: usize,
    form: WindowForm,
) -> Result<Vec<Candidate>, SyncError> {
    if max_length == 0 {
        return Err(SyncError::InvalidWindowLength);
    }
    let token_count = script.token_count();
    if start_index >= token_count {
        return Ok(Vec::new());
    }

    let last = start_index.saturating_add(max_length).min(token_count);
    let mut windows = Vec::with_capacity(last - start_index);
    let mut text = String::new();
    for (offset, token) in script.tokens[start_index..last].iter().enumerate() {
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(match form {
            WindowForm::Display => &token.raw,
            WindowForm::Comparison => &token.normalized,
        });
        windows.push(Candidate {
            text: text.clone(),
            start_index,
            end_index: start_index + offset + 1,
        });
    }
    Ok(windows)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::script::segment;

    fn script() -> Script {
        segment("0", "Hello there. How are you?").unwrap()
    }

    #[test]
    fn windows_grow_one_token_at_a_time() {
        let windows = generate_windows(&script(), 1, 3, WindowForm::Display).unwrap();
        let texts: Vec<_> = windows.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["there.", "there. How", "there. How are"]);
        assert!(windows.iter().all(|c| c.start_index == 1));
        let ends: Vec<_> = windows.iter().map(|c| c.end_index).collect();
        assert_eq!(ends, [2, 3, 4]);
    }

    #[test]
    fn comparison_form_uses_normalized_tokens() {
        let windows = generate_windows(&script(), 0, 2, WindowForm::Comparison).unwrap();
        assert_eq!(windows[1].text, "hello there");
    }

    #[test]
    fn windows_are_clamped_at_script_end() {
        let windows = generate_windows(&script(), 3, 10, WindowForm::Display).unwrap();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows.last().unwrap().end_index, 5);
    }

    #[test]
    fn exhausted_script_yields_no_windows() {
        let script = script();
        let n = script.token_count();
        assert!(generate_windows(&script, n, 10, WindowForm::Display)
            .unwrap()
            .is_empty());
        assert!(generate_windows(&script, n + 3, 10, WindowForm::Display)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn zero_length_is_rejected() {
        assert!(matches!(
            generate_windows(&script(), 0, 0, WindowForm::Display),
            Err(SyncError::InvalidWindowLength)
        ));
    }

    #[test]
    fn window_count_matches_bounds_for_random_requests() {
        let words = "a b. c d, e f g! h i j? k l; m n o p: q r s t";
        let script = segment("r", words).unwrap();
        let n = script.token_count();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let start = rng.gen_range(0..=n + 2);
            let max_len = rng.gen_range(1..30);
            let windows = generate_windows(&script, start, max_len, WindowForm::Display).unwrap();
            let expected = if start >= n { 0 } else { max_len.min(n - start) };
            assert_eq!(windows.len(), expected);
            for pair in windows.windows(2) {
                assert!(pair[0].end_index < pair[1].end_index);
            }
            assert!(windows.iter().all(|c| c.start_index == start));
        }
    }
}
