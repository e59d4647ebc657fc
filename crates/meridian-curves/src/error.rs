//! Error types for curve operations.

use chrono::NaiveDate;
use meridian_math::MathError;
use thiserror::Error;

/// A specialized Result type for curve operations.
pub type CurveResult<T> = Result<T, CurveError>;

/// Error types for curve operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    /// Dates are not strictly increasing.
    #[error("Non-monotonic dates at index {index}: {prev} >= {current}")]
    NonMonotonicDates {
        /// Index where the violation occurred.
        index: usize,
        /// Previous date.
        prev: NaiveDate,
        /// Offending date.
        current: NaiveDate,
    },

    /// An instrument matures on or before the curve base date.
    #[error("Instrument '{id}' matures {maturity}, on or before base date {base}")]
    MaturityNotAfterBase {
        /// Instrument identifier.
        id: String,
        /// Instrument maturity.
        maturity: NaiveDate,
        /// Curve base date.
        base: NaiveDate,
    },

    /// A bootstrap step failed to solve for a curve point.
    #[error("Bootstrap failed on instrument '{instrument}': {message}")]
    BootstrapFailure {
        /// Instrument being solved when the failure occurred.
        instrument: String,
        /// Description of the failure.
        message: String,
    },

    /// Invalid calibration instrument.
    #[error("Invalid instrument: {reason}")]
    InvalidInstrument {
        /// Description of what's wrong with the instrument.
        reason: String,
    },

    /// Not enough data points for the operation.
    #[error("Insufficient points: need at least {required}, got {got}")]
    InsufficientPoints {
        /// Minimum required points.
        required: usize,
        /// Actual number of points provided.
        got: usize,
    },

    /// Invalid value (NaN, non-positive discount factor, ...).
    #[error("Invalid value: {reason}")]
    InvalidValue {
        /// Description of why the value is invalid.
        reason: String,
    },

    /// Underlying mathematical error.
    #[error("Math error: {0}")]
    Math(#[from] MathError),
}

impl CurveError {
    /// Creates a non-monotonic dates error.
    #[must_use]
    pub fn non_monotonic_dates(index: usize, prev: NaiveDate, current: NaiveDate) -> Self {
        Self::NonMonotonicDates {
            index,
            prev,
            current,
        }
    }

    /// Creates a bootstrap failure error.
    #[must_use]
    pub fn bootstrap_failed(instrument: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BootstrapFailure {
            instrument: instrument.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid instrument error.
    #[must_use]
    pub fn invalid_instrument(reason: impl Into<String>) -> Self {
        Self::InvalidInstrument {
            reason: reason.into(),
        }
    }

    /// Creates an insufficient points error.
    #[must_use]
    pub fn insufficient_points(required: usize, got: usize) -> Self {
        Self::InsufficientPoints { required, got }
    }

    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid_value(reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            reason: reason.into(),
        }
    }
}
