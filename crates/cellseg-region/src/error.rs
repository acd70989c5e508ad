//! Error types for cellseg-region

use thiserror::Error;

/// Errors that can occur during flooding and region growing
#[derive(Debug, Error)]
pub enum RegionError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] cellseg_core::Error),

    /// Unsupported pixel depth for this operation
    #[error("unsupported depth: expected {expected}, got {actual}")]
    UnsupportedDepth { expected: &'static str, actual: u32 },

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// More regions than the output label depth can represent
    #[error("label type too small: {count} labels do not fit in {depth} bpp (max {max})")]
    LabelOverflow { count: u64, depth: u32, max: u32 },
}

/// Result type for region operations
pub type RegionResult<T> = Result<T, RegionError>;
