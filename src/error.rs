//! Error types for snapshot loading and record parsing.

use std::path::PathBuf;

/// Failure to build a [`ProcessCollection`](crate::ProcessCollection) from a source.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Failed to read snapshot {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A row matched the column pattern but one of its fields could not be coerced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("Invalid value '{value}' for field {field}")]
    InvalidField { field: &'static str, value: String },
}

impl RecordError {
    pub(crate) fn invalid(field: &'static str, value: &str) -> Self {
        RecordError::InvalidField {
            field,
            value: value.to_string(),
        }
    }
}
