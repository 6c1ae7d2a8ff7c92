use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors surfaced by catalogue building, persistence and ID matching.
///
/// Every variant carries enough context (path, line, expected/found values)
/// to be reported without the caller re-deriving it.
#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `line` is zero-based, matching the fixed offsets of the stats layout.
    #[error("{}: line {line}: {reason}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("schema mismatch in {what}: expected {expected}, found {found}")]
    SchemaMismatch {
        what: String,
        expected: String,
        found: String,
    },

    #[error("{sequence} ID sequence is not sorted at position {position}")]
    MatchPrecondition {
        sequence: &'static str,
        position: usize,
    },

    #[error("object '{id}': non-finite value in {field}")]
    NonFinite { id: String, field: String },

    #[error("object ID '{id}' is not an integer")]
    InvalidId { id: String },

    #[error("cannot encode or decode catalogue blob {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV error on {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

pub type Result<T> = std::result::Result<T, CatalogueError>;

impl CatalogueError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        CatalogueError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn parse(path: &Path, line: usize, reason: impl Into<String>) -> Self {
        CatalogueError::Parse {
            path: path.to_path_buf(),
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn schema(
        what: impl Into<String>,
        expected: impl ToString,
        found: impl ToString,
    ) -> Self {
        CatalogueError::SchemaMismatch {
            what: what.into(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}
