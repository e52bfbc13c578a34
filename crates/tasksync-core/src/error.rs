//! Error types for tasksync-core

use std::path::PathBuf;

/// Result type for tasksync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can abort a sync cycle or a store operation
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The remote document could not be read or written; nothing was changed
    #[error("Remote {operation} failed: {message}")]
    TransientIo { operation: String, message: String },

    /// The remote write started and failed; the remote state is unknown
    #[error("Remote write failed part-way, document state unknown: {message}")]
    PartialWrite { message: String },

    /// Sync state could not be read or written
    #[error("Sync state error at {path}: {message}")]
    State { path: PathBuf, message: String },

    /// The task store could not be read
    #[error("Task store error: {message}")]
    Store { message: String },

    /// Configuration file not found at expected path
    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    // Transparent wrappers for underlying crate errors
    /// Text processing error from tasksync-content
    #[error(transparent)]
    Content(#[from] tasksync_content::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}

impl Error {
    pub fn transient(operation: impl Into<String>, message: impl ToString) -> Self {
        Self::TransientIo {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    pub fn partial_write(message: impl ToString) -> Self {
        Self::PartialWrite {
            message: message.to_string(),
        }
    }

    pub fn state(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::State {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn store(message: impl ToString) -> Self {
        Self::Store {
            message: message.to_string(),
        }
    }

    /// Whether retrying the same cycle may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientIo { .. })
    }
}
