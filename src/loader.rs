//! Reading the raw JSON documents.
//!
//! Secondary documents are read leniently: a missing, unreadable or unparsable
//! file logs a warning and reads as `null`, which every typed constructor turns
//! into empty data. Only the compatibility document has a strict reader.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use crate::category::CategoryResolver;
use crate::error::{LoadError, LoadResult};
use crate::index::CompatibilityIndex;
use crate::metadata::TagMetadataTable;
use crate::paths::DataLayout;

/// Why a document could not be read. Carries no document kind; callers name it.
#[derive(Debug, thiserror::Error)]
enum ReadFailure {
    #[error("document not found")]
    Missing,
    #[error("failed to read document: {0}")]
    Io(#[source] std::io::Error),
    #[error("document is not valid JSON: {0}")]
    Parse(String),
}

/// Read a JSON document, degrading to `Value::Null` on any failure.
pub fn read_document(path: &Path) -> Value {
    match read_json(path) {
        Ok(value) => value,
        Err(ReadFailure::Missing) => {
            tracing::warn!(path = %path.display(), "document not found; using empty data");
            Value::Null
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "document unusable; using empty data");
            Value::Null
        }
    }
}

/// Read the compatibility document, failing loudly if it is missing or broken.
pub fn read_compatibility(path: &Path) -> LoadResult<Value> {
    let path_str = || path.display().to_string();
    read_json(path).map_err(|failure| match failure {
        ReadFailure::Missing => LoadError::CompatibilityMissing { path: path_str() },
        ReadFailure::Io(source) => LoadError::CompatibilityIo {
            path: path_str(),
            source,
        },
        ReadFailure::Parse(message) => LoadError::CompatibilityParse {
            path: path_str(),
            message,
        },
    })
}

fn read_json(path: &Path) -> Result<Value, ReadFailure> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ReadFailure::Missing,
        _ => ReadFailure::Io(e),
    })?;
    // Some exports carry a UTF-8 byte order mark.
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
    serde_json::from_str(content).map_err(|e| ReadFailure::Parse(e.to_string()))
}

/// Tag metadata from the layout's tag data document.
pub fn load_metadata(layout: &DataLayout) -> TagMetadataTable {
    TagMetadataTable::from_json(&read_document(&layout.tag_data))
}

/// Build the browsing index from the layout.
///
/// The compatibility document must exist and parse. Categories come from the
/// layered resolver over the tag data document.
pub fn build_index(layout: &DataLayout) -> LoadResult<CompatibilityIndex> {
    let raw = read_compatibility(&layout.compatibility)?;
    let metadata = Arc::new(load_metadata(layout));
    Ok(CompatibilityIndex::build_with(
        &raw,
        CategoryResolver::layered(metadata),
    ))
}
