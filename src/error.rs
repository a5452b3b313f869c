use thiserror::Error;

/// Error types for the psopt-rs library.
///
/// Only configuration problems surface to callers: invalid coefficients,
/// malformed bounds, or dimension mismatches detected before any objective
/// evaluation. Objective failures during a run are absorbed by the
/// comparison policy (a failed evaluation can never become a best point)
/// and never abort the optimization.
#[derive(Error, Debug)]
pub enum PsOptError {
    /// Error for invalid algorithm parameter values.
    #[error("Invalid parameter value: {0}")]
    InvalidParameter(String),

    /// Error indicating a mismatch in vector dimensions.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Error for malformed search-space bounds.
    #[error("Bounds error: {0}")]
    BoundsError(String),

    /// Error during objective function evaluation.
    #[error("Function evaluation error: {0}")]
    FunctionEvaluation(String),

    /// I/O error wrapper.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic error for cases that don't fit the other categories.
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for psopt-rs operations.
pub type Result<T> = std::result::Result<T, PsOptError>;

/// Extensions for converting from other error types.
impl From<String> for PsOptError {
    fn from(s: String) -> Self {
        PsOptError::Other(s)
    }
}

impl From<&str> for PsOptError {
    fn from(s: &str) -> Self {
        PsOptError::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PsOptError::InvalidParameter("beta must be in (0, 1), got 1.5".to_string());
        assert!(format!("{}", err).contains("beta must be in (0, 1)"));

        let err = PsOptError::BoundsError("lower 3 >= upper 1".to_string());
        assert!(format!("{}", err).contains("lower 3 >= upper 1"));
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PsOptError = io_err.into();

        match err {
            PsOptError::IoError(_) => (),
            _ => panic!("Expected IoError variant"),
        }

        let str_err: PsOptError = "test error".into();
        match str_err {
            PsOptError::Other(s) => assert_eq!(s, "test error"),
            _ => panic!("Expected Other variant"),
        }
    }
}
