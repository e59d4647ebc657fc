//! Error types for mathematical operations.

use thiserror::Error;

/// A specialized Result type for mathematical operations.
pub type MathResult<T> = Result<T, MathError>;

/// Error types for mathematical operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    /// Algorithm failed to converge within the evaluation budget.
    #[error("Convergence failed: exceeded maximum of {evaluations} function evaluations (residual: {residual:.2e})")]
    ConvergenceFailed {
        /// Number of function evaluations spent.
        evaluations: u32,
        /// Final residual value.
        residual: f64,
    },

    /// Root is not bracketed by the supplied interval.
    #[error("Invalid bracket: f({a}) = {fa:.6e} and f({b}) = {fb:.6e} have the same sign")]
    InvalidBracket {
        /// Lower bound.
        a: f64,
        /// Upper bound.
        b: f64,
        /// Function value at lower bound.
        fa: f64,
        /// Function value at upper bound.
        fb: f64,
    },

    /// An interval or guess is outside its allowed range.
    #[error("Invalid range: {reason}")]
    InvalidRange {
        /// Description of the range violation.
        reason: String,
    },

    /// Matrix is singular (non-invertible).
    #[error("Matrix is singular")]
    SingularMatrix,

    /// Matrix/vector dimensions don't match for the operation.
    #[error("Dimension mismatch: {reason}")]
    DimensionMismatch {
        /// Description of the mismatch.
        reason: String,
    },

    /// Extrapolation attempted when not allowed.
    #[error("Extrapolation not allowed: x = {x} outside [{min}, {max}]")]
    ExtrapolationNotAllowed {
        /// The requested x value.
        x: f64,
        /// Minimum of the data range.
        min: f64,
        /// Maximum of the data range.
        max: f64,
    },

    /// Not enough data points for the operation.
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData {
        /// Minimum required points.
        required: usize,
        /// Actual points provided.
        actual: usize,
    },

    /// Invalid input parameters.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of the invalid input.
        reason: String,
    },
}

impl MathError {
    /// Creates a convergence failure error.
    #[must_use]
    pub fn convergence_failed(evaluations: u32, residual: f64) -> Self {
        Self::ConvergenceFailed {
            evaluations,
            residual,
        }
    }

    /// Creates an invalid range error.
    #[must_use]
    pub fn invalid_range(reason: impl Into<String>) -> Self {
        Self::InvalidRange {
            reason: reason.into(),
        }
    }

    /// Creates a dimension mismatch error.
    #[must_use]
    pub fn dimension_mismatch(reason: impl Into<String>) -> Self {
        Self::DimensionMismatch {
            reason: reason.into(),
        }
    }

    /// Creates an insufficient data error.
    #[must_use]
    pub fn insufficient_data(required: usize, actual: usize) -> Self {
        Self::InsufficientData { required, actual }
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convergence_failed_display() {
        let err = MathError::convergence_failed(100, 1e-3);
        let msg = format!("{}", err);
        assert!(msg.contains("100"));
        assert!(msg.contains("maximum"));
    }

    #[test]
    fn test_invalid_bracket_display() {
        let err = MathError::InvalidBracket {
            a: 0.0,
            b: 1.0,
            fa: 2.0,
            fb: 3.0,
        };
        assert!(format!("{}", err).contains("same sign"));
    }
}
