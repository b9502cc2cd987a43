//! Error types for loading catalog data.
//!
//! Once records are loaded nothing in the query pipeline can fail, so this is
//! the only typed error the library exposes.

use std::io;
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

/// Reasons the catalog data could not be turned into records.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The data file could not be read.
    #[error("failed to read catalog data from {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The data is not JSON at all.
    #[error("catalog data is not valid JSON")]
    Json(#[from] serde_json::Error),

    /// The top-level JSON value is not a sequence.
    #[error("catalog data must be an array of records, found {found}")]
    NotAnArray { found: &'static str },

    /// An element of the sequence is not an object.
    #[error("entry {index} is not a record object, found {found}")]
    NotARecord { index: usize, found: &'static str },

    /// An object that could not be read as a record.
    #[error("entry {index} could not be read as a record")]
    InvalidRecord {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Human name for a JSON value's type, used in error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
