//! Error taxonomy for store access.
//!
//! Bulk operations (listing sessions, building trees) absorb recoverable failures and log them;
//! targeted operations surface one of these variants to the caller.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HistoryError>;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: ResourceKind, id: String },

    #[error("Malformed record on line {line} of {}: {source}", path.display())]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid tool-input pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Invalid explored-file glob: {0}")]
    InvalidGlob(#[from] glob::PatternError),

    #[error("Invalid time bound {0:?}: expected RFC 3339 or YYYY-MM-DD")]
    InvalidTimeBound(String),

    #[error("Ambiguous {kind} prefix {prefix:?} matches {}: {}", candidates.len(), candidates.join(", "))]
    AmbiguousPrefix { kind: ResourceKind, prefix: String, candidates: Vec<String> },

    #[error("Could not determine home directory")]
    HomeDirUnavailable,
}

/// Which kind of store resource a lookup was aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Project,
    Session,
    Agent,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResourceKind::Project => "Project",
            ResourceKind::Session => "Session",
            ResourceKind::Agent => "Agent",
        };
        f.write_str(name)
    }
}

impl HistoryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        HistoryError::Io { path: path.into(), source }
    }

    pub(crate) fn not_found(kind: ResourceKind, id: impl Into<String>) -> Self {
        HistoryError::NotFound { kind, id: id.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, HistoryError::NotFound { .. })
    }
}
