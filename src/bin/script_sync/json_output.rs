use std::fs;
use std::path::Path;

use serde::Serialize;

/// Printed in place of a round outcome when the round fails.
#[derive(Debug, Serialize)]
pub struct RoundFailure<'a> {
    pub heard: &'a str,
    pub error: String,
    pub retryable: bool,
}

/// Writes the segmented view as pretty JSON, creating missing directories.
pub fn write_pretty<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    let mut json = pretty(value)?;
    json.push('\n');
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .map_err(|err| format!("cannot create '{}': {err}", dir.display()))?;
    }
    fs::write(path, json).map_err(|err| format!("cannot write '{}': {err}", path.display()))
}

pub fn print_pretty<T: Serialize>(value: &T) -> Result<(), String> {
    println!("{}", pretty(value)?);
    Ok(())
}

/// One JSON document per line, for streaming replay output.
pub fn print_line<T: Serialize>(value: &T) -> Result<(), String> {
    let line = serde_json::to_string(value).map_err(|err| format!("cannot encode JSON: {err}"))?;
    println!("{line}");
    Ok(())
}

fn pretty<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|err| format!("cannot encode JSON: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_pretty_creates_parent_dirs_and_ends_with_newline() {
        let dir = std::env::temp_dir().join("script_sync_json_output_test");
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("nested").join("view.json");

        let failure = RoundFailure {
            heard: "hello there",
            error: "similarity provider did not answer within 100 ms".to_string(),
            retryable: true,
        };
        write_pretty(&path, &failure).expect("write json");

        let written = fs::read_to_string(&path).expect("read back");
        assert!(written.ends_with("}\n"));
        let parsed: serde_json::Value = serde_json::from_str(&written).expect("valid json");
        assert_eq!(parsed["heard"], "hello there");
        assert_eq!(parsed["retryable"], true);
        let _ = fs::remove_dir_all(&dir);
    }
}
