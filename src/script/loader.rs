use std::path::Path;

use crate::error::SyncError;
use crate::script::segmenter::segment;
use crate::types::{Script, ScriptDocument, SegmentedScript};

/// Reads a JSON array of `{id, content}` script documents.
pub fn load_documents(path: &Path) -> Result<Vec<ScriptDocument>, SyncError> {
    let data = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SyncError::not_found("script documents", path.display().to_string())
        } else {
            SyncError::io("read script documents", path, e)
        }
    })?;
    let documents: Vec<ScriptDocument> = serde_json::from_str(&data)
        .map_err(|e| SyncError::invalid_format("parse script documents", e))?;
    tracing::debug!(
        path = %path.display(),
        documents = documents.len(),
        "loaded script documents"
    );
    Ok(documents)
}

pub fn segment_document(document: &ScriptDocument) -> Result<Script, SyncError> {
    segment(document.id.clone(), &document.content)
}

/// Segments every document, failing on the first malformed one.
pub fn segment_documents(documents: &[ScriptDocument]) -> Result<Vec<Script>, SyncError> {
    documents.iter().map(segment_document).collect()
}

pub fn segmented_view(scripts: &[Script]) -> Vec<SegmentedScript> {
    scripts.iter().map(SegmentedScript::from).collect()
}

pub fn find_script<'a>(scripts: &'a [Script], id: &str) -> Result<&'a Script, SyncError> {
    scripts
        .iter()
        .find(|s| s.id == id)
        .ok_or_else(|| SyncError::not_found("script", id))
}
