use std::fmt;

/// Result type for Ascent operations
pub type Result<T> = std::result::Result<T, AscentError>;

/// Main error type for the Ascent library
#[derive(Debug, Clone)]
pub enum AscentError {
    /// Invalid dimensions for operations
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Invalid parameter value
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// Numerical computation errors (NaN/Inf losses, degenerate distributions)
    NumericalError(String),

    /// Empty sample set or container
    EmptySamples(String),
}

impl fmt::Display for AscentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AscentError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {}, got {}", expected, actual)
            }
            AscentError::InvalidParameter { name, reason } => {
                write!(f, "Invalid parameter '{}': {}", name, reason)
            }
            AscentError::NumericalError(msg) => write!(f, "Numerical error: {}", msg),
            AscentError::EmptySamples(msg) => write!(f, "Empty samples: {}", msg),
        }
    }
}

impl std::error::Error for AscentError {}

// Helper functions for common error patterns
impl AscentError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        AscentError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        AscentError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
