//! Error types for core operations.

use thiserror::Error;

/// A specialized Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Error types for core operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A tenor label could not be parsed.
    #[error("Invalid tenor label '{label}': {reason}")]
    InvalidTenor {
        /// The offending label as supplied.
        label: String,
        /// Description of what is wrong with it.
        reason: String,
    },

    /// A date pair is invalid for the requested operation.
    #[error("Invalid date range: {reason}")]
    InvalidDateRange {
        /// Description of the problem.
        reason: String,
    },
}

impl CoreError {
    /// Creates an invalid tenor error.
    #[must_use]
    pub fn invalid_tenor(label: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTenor {
            label: label.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid date range error.
    #[must_use]
    pub fn invalid_date_range(reason: impl Into<String>) -> Self {
        Self::InvalidDateRange {
            reason: reason.into(),
        }
    }
}
