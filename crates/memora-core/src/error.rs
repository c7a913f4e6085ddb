use thiserror::Error;

/// Top-level error type for the Memora system.
///
/// `InvalidInput` is raised synchronously before any external call is made.
/// `EmbeddingFailed` and `Cancelled` come from the embedding boundary and
/// propagate unmodified through search.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MemoraError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Embedding failed: {0}")]
    EmbeddingFailed(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl MemoraError {
    /// Shorthand for an `InvalidInput` error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        MemoraError::InvalidInput(msg.into())
    }

    /// True if this error came from a cancelled operation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, MemoraError::Cancelled)
    }
}

impl From<toml::de::Error> for MemoraError {
    fn from(err: toml::de::Error) -> Self {
        MemoraError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for MemoraError {
    fn from(err: toml::ser::Error) -> Self {
        MemoraError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for MemoraError {
    fn from(err: serde_json::Error) -> Self {
        MemoraError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Memora operations.
pub type Result<T> = std::result::Result<T, MemoraError>;
