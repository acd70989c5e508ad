//! Error types for the test framework

use thiserror::Error;

/// Errors that can occur while preparing regression test inputs
#[derive(Debug, Error)]
pub enum TestError {
    /// A synthetic raster could not be built
    #[error("failed to build raster '{name}': {source}")]
    Build {
        name: &'static str,
        #[source]
        source: cellseg_core::Error,
    },

    /// Rows of a literal raster have different lengths
    #[error("ragged rows: row {row} has {len} values, expected {expected}")]
    RaggedRows {
        row: usize,
        len: usize,
        expected: usize,
    },
}

/// Result type for test operations
pub type TestResult<T> = Result<T, TestError>;
