//! Storage error handling
//!
//! Typed errors for store operations. Errors fall into three families:
//! validation (raised before touching the database), not-found (an id or
//! word entry that does not exist) and storage failures.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A record failed validation before any storage interaction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or blank
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    /// Path has empty segments
    #[error("Malformed path '{0}': segments must be non-empty and separated by '/'")]
    MalformedPath(String),

    /// Session created without words
    #[error("A dictation session needs at least one word")]
    EmptySession,

    /// Unknown word or session status name
    #[error("Unknown status '{0}'")]
    UnknownStatus(String),
}

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Record rejected before reaching the database
    #[error("Invalid record: {0}")]
    Validation(#[from] ValidationError),

    /// No word with this id
    #[error("Word {id} not found")]
    WordNotFound { id: i64 },

    /// No session with this id
    #[error("Dictation session {id} not found")]
    SessionNotFound { id: i64 },

    /// Session exists but does not contain the word
    #[error("Word {word_id} is not part of dictation session {session_id}")]
    SessionWordNotFound { session_id: i64, word_id: i64 },

    /// Failed to create data directory
    #[error("Failed to create data directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Permission denied accessing path
    #[error("Permission denied: cannot access '{path}'. Check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Disk is full or quota exceeded
    #[error("Disk full or quota exceeded while writing the database. Free up disk space and try again.")]
    DiskFull(#[source] rusqlite::Error),

    /// Database was written by a newer version of the schema
    #[error("Database schema version {found} is newer than the supported version {supported}")]
    UnsupportedVersion { found: i32, supported: i32 },

    /// Embedded session words could not be encoded or decoded
    #[error("Failed to encode session words: {0}")]
    Serialization(#[from] serde_json::Error),

    /// SQLite database error
    #[error("Database error: {0}")]
    Database(rusqlite::Error),

    /// Blocking task was cancelled or panicked
    #[error("Storage task aborted: {0}")]
    TaskAborted(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(error: rusqlite::Error) -> Self {
        if is_disk_full_error(&error) {
            StorageError::DiskFull(error)
        } else {
            StorageError::Database(error)
        }
    }
}

impl StorageError {
    /// Create an error from an I/O error with path context
    pub fn from_io(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => StorageError::PermissionDenied {
                path,
                source: error,
            },
            _ => StorageError::CreateDirectory {
                path,
                source: error,
            },
        }
    }

    /// Check if the addressed record does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::WordNotFound { .. }
                | StorageError::SessionNotFound { .. }
                | StorageError::SessionWordNotFound { .. }
        )
    }

    /// Check if the record was rejected by validation
    pub fn is_validation(&self) -> bool {
        matches!(self, StorageError::Validation(_))
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StorageError::DiskFull(_) | StorageError::PermissionDenied { .. }
        )
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StorageError::DiskFull(_) => Some("Free up disk space and try again."),
            StorageError::PermissionDenied { .. } => {
                Some("Check file and directory permissions of the data directory.")
            }
            StorageError::CreateDirectory { .. } => {
                Some("Check that the parent directory exists and you have write permissions.")
            }
            StorageError::UnsupportedVersion { .. } => {
                Some("Upgrade to a newer release; downgrading a database is not supported.")
            }
            _ => None,
        }
    }
}

/// Check if a SQLite error indicates disk full condition
fn is_disk_full_error(error: &rusqlite::Error) -> bool {
    matches!(
        error.sqlite_error_code(),
        Some(rusqlite::ErrorCode::DiskFull)
    )
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
