//! Error types for the aggregation engine.
//!
//! Individual malformed records are never errors (they are skipped with a
//! warning); everything here is surfaced to the caller.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while discovering or reading a directory of result records.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("input directory not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by the Store Manager.
///
/// `Corrupt` and `SchemaMismatch` are fatal for a merge: rows are never
/// appended into a store whose layout cannot be trusted.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("store {} is unreadable: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("relation {relation} has columns [{}], expected [{}]", found.join(", "), expected.join(", "))]
    SchemaMismatch {
        relation: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the existing store cannot be trusted for appends.
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::Corrupt { .. } | Self::SchemaMismatch { .. })
    }
}

/// Errors raised by pack/unpack.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("archive I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid archive path: {0}")]
    InvalidPath(String),
}

impl ArchiveError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors raised by the Batch Orchestrator. Wraps the component errors so a
/// caller can distinguish a missing input from a corrupted store.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("benchmarks root {} is not usable: {source}", path.display())]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
