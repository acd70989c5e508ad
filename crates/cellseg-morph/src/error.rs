//! Error types for cellseg-morph

use thiserror::Error;

/// Errors that can occur during tree construction and filtering
#[derive(Debug, Error)]
pub enum MorphError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] cellseg_core::Error),

    /// Unsupported pixel depth for this operation
    #[error("unsupported depth: expected {expected}, got {actual}")]
    UnsupportedDepth { expected: &'static str, actual: u32 },

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Node handle that does not belong to the tree
    #[error("unknown tree node: level {level}, index {index}")]
    UnknownNode { level: u32, index: u32 },
}

/// Result type for tree operations
pub type MorphResult<T> = Result<T, MorphError>;
