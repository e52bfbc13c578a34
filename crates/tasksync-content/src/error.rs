//! Error types for tasksync-content

/// Result type for tasksync-content operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding task decorations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Invalid timestamp '{value}': {message}")]
    InvalidTimestamp { value: String, message: String },

    #[error("Unknown priority: {0}")]
    InvalidPriority(String),

    #[error("Header level {0} is outside 1..=6")]
    InvalidHeaderLevel(u8),
}

impl Error {
    pub fn timestamp(value: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTimestamp {
            value: value.into(),
            message: message.into(),
        }
    }
}
