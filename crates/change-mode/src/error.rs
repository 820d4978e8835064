use thiserror::Error;

/// Result type for change-mode operations
pub type Result<T> = std::result::Result<T, ChangeModeError>;

/// Errors that can occur while chunking or caching edits
#[derive(Error, Debug)]
pub enum ChangeModeError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error occurred while touching the chunk store
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// A chunk group could not be serialized for the file store
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Refused to cache a group with nothing to page through
    #[error("Chunk group has {0} chunk(s); only multi-chunk groups are cached")]
    NotPageable(usize),
}

impl ChangeModeError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
