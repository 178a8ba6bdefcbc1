//! Error types for the Frames core library.

use thiserror::Error;

/// All errors that can occur within the Frames core library.
#[derive(Debug, Error)]
pub enum FramesError {
    /// A SQLite operation failed.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// An entry ID was requested that does not exist in the database.
    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    /// The input for a new entry was rejected.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The opened file is not a valid Frames database.
    #[error("Invalid store: {0}")]
    InvalidStore(String),

    /// Another caller panicked while holding the store lock.
    #[error("Store lock poisoned")]
    LockPoisoned,

    /// An I/O operation on the filesystem failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings or exported data could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias that pins the error type to [`FramesError`].
pub type Result<T> = std::result::Result<T, FramesError>;

impl FramesError {
    /// Returns `true` for failures of the underlying persistence layer.
    ///
    /// These are not recoverable locally; callers decide whether to log,
    /// retry, or surface them.
    #[must_use]
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::InvalidStore(_) | Self::LockPoisoned | Self::Io(_) | Self::Json(_)
        )
    }

    /// Returns a short, human-readable message suitable for display to the end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Database(e) => format!("Failed to save: {e}"),
            Self::EntryNotFound(_) => "Frame no longer exists".to_string(),
            Self::Validation(msg) => msg.clone(),
            Self::InvalidStore(_) => "Could not open journal file".to_string(),
            Self::LockPoisoned => "Journal is unavailable, please restart".to_string(),
            Self::Io(e) => format!("File error: {e}"),
            Self::Json(e) => format!("Data format error: {e}"),
        }
    }
}
