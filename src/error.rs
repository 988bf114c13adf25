// Error types shared by the token codec, validation and the flat-file store.
use std::path::PathBuf;
use thiserror::Error;

/// A malformed `YYMMDD_HHMM` token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("invalid date/time format: {raw:?} (expected YYMMDD_HHMM)")]
    Shape { raw: String },
    #[error("invalid date/time format: {raw:?} carries both '~' decorations")]
    DoubleDecoration { raw: String },
    #[error("invalid date/time format: {raw:?} contains non-digit characters")]
    NonDigit { raw: String },
    #[error("invalid date/time: {raw:?} is not a real calendar date/time")]
    OutOfRange { raw: String },
}

/// Aggregated field-level messages produced by validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .0.join("; "))]
pub struct ValidationError(pub Vec<String>);

impl ValidationError {
    pub fn messages(&self) -> &[String] {
        &self.0
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("schedule file '{}' is corrupt: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },
    #[error("failed to encode schedules: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StorageError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn corrupt(path: &std::path::Path, reason: impl ToString) -> Self {
        Self::Corrupt {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }
}

/// No record in the collection carries the requested id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no schedule with id '{id}'")]
pub struct NotFoundError {
    pub id: String,
}
