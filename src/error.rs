use thiserror::Error;

/// Error types for the lmcurve library.
///
/// Only problems with the inputs of a fit are errors. A fit that runs into
/// a NaN chi-squared finishes with
/// [`ConvergenceStatus::NumericalError`](crate::lm::ConvergenceStatus::NumericalError)
/// instead.
#[derive(Error, Debug)]
pub enum FitError {
    /// Two sequences that must have the same length do not.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Invalid input data.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid parameter index or value.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error indicating a singular matrix was encountered.
    #[error("Singular matrix encountered")]
    SingularMatrix,

    /// I/O error wrapper.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for lmcurve operations.
pub type Result<T> = std::result::Result<T, FitError>;
