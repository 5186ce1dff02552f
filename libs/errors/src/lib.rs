//! Unified error handling for the users table loader
//!
//! Every failure the loader can hit falls into one of two kinds: the input
//! document could not be obtained or understood, or the store rejected us.

use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// ErrorKind - coarse classification
// ============================================================================

/// Coarse failure classification reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Source document missing, unreadable or structurally invalid
    Input,
    /// Store unreachable, locked, or a write/commit rejected by the engine
    Storage,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input => f.write_str("InputError"),
            Self::Storage => f.write_str("StorageError"),
        }
    }
}

// ============================================================================
// LoaderError - Main error type
// ============================================================================

/// Main error type for the loader
#[derive(Debug, Error)]
pub enum LoaderError {
    // ======================================
    // Input Errors
    // ======================================
    #[error("Failed to read {}: {source}", path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {file}: {error}")]
    ParseError { file: String, error: String },

    #[error("Invalid mapping: {0}")]
    InvalidMapping(String),

    // ======================================
    // Storage Errors
    // ======================================
    #[error("SQLite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    #[error("Store not found at {}", .0.display())]
    StoreNotFound(PathBuf),

    #[error("Failed to prepare store location {}: {source}", path.display())]
    StoreLocation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt projects value for {username}: {error}")]
    CorruptProjects { username: String, error: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias using LoaderError
pub type LoaderResult<T> = Result<T, LoaderError>;

impl LoaderError {
    /// Create a read error for an input document
    pub fn read_input(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::ReadInput {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a parse error tagged with the document it came from
    pub fn parse(file: impl Into<String>, error: impl ToString) -> Self {
        Self::ParseError {
            file: file.into(),
            error: error.to_string(),
        }
    }

    /// Create an invalid mapping error
    pub fn invalid_mapping(msg: impl Into<String>) -> Self {
        Self::InvalidMapping(msg.into())
    }

    /// Which of the two failure kinds this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ReadInput { .. } | Self::ParseError { .. } | Self::InvalidMapping(_) => {
                ErrorKind::Input
            },
            Self::Sqlite(_)
            | Self::StoreNotFound(_)
            | Self::StoreLocation { .. }
            | Self::CorruptProjects { .. }
            | Self::Serialization(_) => ErrorKind::Storage,
        }
    }

    /// Check if this is an input error
    pub fn is_input(&self) -> bool {
        self.kind() == ErrorKind::Input
    }

    /// Check if this is a storage error
    pub fn is_storage(&self) -> bool {
        self.kind() == ErrorKind::Storage
    }

    /// Check if the store reported it was locked by another writer
    pub fn is_busy(&self) -> bool {
        match self {
            // SQLITE_BUSY / SQLITE_LOCKED, including their extended codes
            Self::Sqlite(sqlx::Error::Database(db)) => db
                .code()
                .and_then(|code| code.parse::<i32>().ok())
                .is_some_and(|code| matches!(code & 0xff, 5 | 6)),
            _ => false,
        }
    }
}

// Conversion traits for common error types
impl From<serde_json::Error> for LoaderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
