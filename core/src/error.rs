//! Error taxonomy for the data store.
//!
//! `PathError` is a wiring bug and is returned to the caller as-is.
//! `StorageError`, `ImportError` and `SchemaError` are expected at runtime
//! and are folded into an [`Outcome`] at the store boundary.
//! `ValidationError` belongs to field editing and never reaches a banner.

use std::io;
use std::path::PathBuf;

use thiserror::Error;


// ---------------------------------------------------------------------------
// Path errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("empty path")]
    Empty,
    #[error("empty segment in path '{0}'")]
    EmptySegment(String),
    /// An intermediate segment holds a scalar, so nothing can live below it.
    #[error("'{at}' holds a {kind}, not a record or sequence")]
    NotAContainer { at: String, kind: &'static str },
    #[error("'{at}' is a sequence; '{segment}' is not an index")]
    NotAnIndex { at: String, segment: String },
    #[error("index {index} out of range at '{at}' (length {len})")]
    IndexOutOfRange { at: String, index: usize, len: usize },
}


// ---------------------------------------------------------------------------
// Storage errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(#[from] io::Error),
    #[error("storage quota exceeded ({needed} bytes needed, {quota} allowed)")]
    QuotaExceeded { needed: usize, quota: usize },
    #[error("snapshot '{key}' is corrupt: {reason}")]
    Corrupt { key: String, reason: String },
    #[error("failed to serialize snapshot: {0}")]
    Serialize(String),
}


// ---------------------------------------------------------------------------
// Import errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("not a JSON file: {}", .0.display())]
    NotJson(PathBuf),
    #[error("cannot read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("{message}")]
    Parse { message: String, line: usize, column: usize },
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("import worker stopped before reporting a result")]
    WorkerLost,
}

impl From<serde_json::Error> for ImportError {
    fn from(e: serde_json::Error) -> Self {
        ImportError::Parse {
            message: e.to_string(),
            line: e.line(),
            column: e.column(),
        }
    }
}


// ---------------------------------------------------------------------------
// Schema errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("expected a record at the top level, found {0}")]
    NotARecord(&'static str),
    #[error("missing required sections: {}", .0.join(", "))]
    MissingSections(Vec<String>),
}


// ---------------------------------------------------------------------------
// Validation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("value rejected by validator")]
    Rejected,
    #[error("store is busy importing")]
    StoreBusy,
}


// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid settings in {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
}


// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

/// Errors a caller of the store can observe directly.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error("an import is in flight; edits are rejected until it finishes")]
    ImportInFlight,
}


// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// User-facing result of a management operation (save, export, import, reset).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
}

impl Outcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Outcome { success: true, message: message.into() }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Outcome { success: false, message: message.into() }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_lists_every_key() {
        let e = SchemaError::MissingSections(vec!["page2".into(), "page3".into()]);
        assert_eq!(e.to_string(), "missing required sections: page2, page3");
    }

    #[test]
    fn parse_error_carries_position() {
        let err = serde_json::from_str::<serde_json::Value>("{\n  \"a\": }").unwrap_err();
        match ImportError::from(err) {
            ImportError::Parse { line, column, .. } => {
                assert_eq!(line, 2);
                assert!(column > 0);
            }
            other => panic!("expected Parse, got {:?}", other),
        }
    }

    #[test]
    fn path_error_wraps_into_store_error() {
        let e: StoreError = PathError::Empty.into();
        assert!(matches!(e, StoreError::Path(PathError::Empty)));
        assert_eq!(e.to_string(), "empty path");
    }

    #[test]
    fn outcome_constructors() {
        assert!(Outcome::ok("done").success);
        let f = Outcome::failed("nope");
        assert!(!f.success);
        assert_eq!(f.message, "nope");
    }
}
