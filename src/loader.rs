//! Reading the static data file. The read is the only asynchronous step in
//! the program: it is awaited once at startup and everything after it is
//! synchronous.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{json_kind, LoadError};
use crate::models::RecordInput;

/// Read the data file at `path` as a JSON document. Its shape is checked
/// when the document is handed to [`Catalog::load_json`].
///
/// [`Catalog::load_json`]: crate::catalog::Catalog::load_json
pub async fn read_document(path: &Path) -> Result<Value, LoadError> {
    debug!(path = %path.display(), "reading catalog data");
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let document = serde_json::from_str(&text)?;
    info!(path = %path.display(), bytes = text.len(), "read catalog data");
    Ok(document)
}

/// Check that `value` is an array of objects and convert each one. Field-level
/// problems are coerced by `RecordInput`; only the overall shape can fail.
pub fn records_from_value(value: Value) -> Result<Vec<RecordInput>, LoadError> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(LoadError::NotAnArray {
                found: json_kind(&other),
            })
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(LoadError::NotARecord {
                    index,
                    found: json_kind(&item),
                });
            }
            serde_json::from_value(item).map_err(|source| LoadError::InvalidRecord { index, source })
        })
        .collect()
}
