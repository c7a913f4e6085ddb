//! Error types for skill lookup and execution.

use memora_core::error::MemoraError;

/// Errors from skill lookup and execution.
#[derive(Debug, thiserror::Error)]
pub enum SkillError {
    #[error("Skill not registered: {0}")]
    NotFound(String),
    #[error("Invalid skill input: {0}")]
    InvalidInput(String),
    #[error("Memory error: {0}")]
    Memory(#[from] MemoraError),
}
