use thiserror::Error;

/// Main error type for vreval
#[derive(Error, Debug)]
pub enum VrevalError {
    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors not tied to a named input
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed input file (wrong shape, bad number, duplicate id)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Inputs that violate the evaluation contract
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Feature vectors of unequal length
    #[error("Dimension mismatch: expected {expected}, got {actual} (row {row})")]
    DimensionMismatch {
        expected: usize,
        actual: usize,
        row: usize,
    },

    /// Every query was skipped, so mAP is undefined
    #[error("No evaluable queries: all {skipped} queries were skipped")]
    NoEvaluableQueries { skipped: usize },
}

/// Convenient Result type using VrevalError
pub type Result<T> = std::result::Result<T, VrevalError>;
