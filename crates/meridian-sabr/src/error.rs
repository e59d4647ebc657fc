//! Error types for SABR calibration and volatility queries.

use thiserror::Error;

use meridian_core::CoreError;
use meridian_math::MathError;

/// Convenience alias for SABR operations.
pub type SabrResult<T> = Result<T, SabrError>;

/// Errors raised by SABR calibration, the session registry and volatility
/// queries.
#[derive(Debug, Error)]
pub enum SabrError {
    /// No engine collection or settings stored under the handle.
    #[error("no entry stored under handle '{handle}'")]
    UnknownHandle {
        /// The handle that was looked up.
        handle: String,
    },

    /// The (expiry, tenor) key is not present in an engine collection.
    #[error("no calibration engine for key ({expiry}, {tenor})")]
    EngineNotFound {
        /// Expiry part of the key.
        expiry: String,
        /// Tenor part of the key.
        tenor: String,
    },

    /// Volatility was queried on an engine whose calibration failed or
    /// never ran.
    #[error("engine for key ({expiry}, {tenor}) is not calibrated")]
    NotCalibrated {
        /// Expiry part of the key.
        expiry: String,
        /// Tenor part of the key.
        tenor: String,
    },

    /// A calibration input grid is malformed.
    #[error("invalid grid: {reason}")]
    InvalidGrid {
        /// What is wrong with the grid.
        reason: String,
    },

    /// A model parameter or query input is out of range.
    #[error("invalid parameter: {reason}")]
    InvalidParameter {
        /// What is wrong with the parameter.
        reason: String,
    },

    /// The strike ladder has no interior ATM point.
    #[error("invalid strikes: ATM strike missing")]
    AtmStrikeMissing,

    /// Calibration could not produce a usable parameter set.
    #[error("calibration failed: {reason}")]
    CalibrationFailed {
        /// Why the calibration failed.
        reason: String,
    },

    /// Error from the numerical layer.
    #[error(transparent)]
    Math(#[from] MathError),

    /// Error from tenor-label parsing.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl SabrError {
    /// Creates an [`SabrError::UnknownHandle`].
    #[must_use]
    pub fn unknown_handle(handle: impl Into<String>) -> Self {
        Self::UnknownHandle {
            handle: handle.into(),
        }
    }

    /// Creates an [`SabrError::EngineNotFound`].
    #[must_use]
    pub fn engine_not_found(expiry: impl Into<String>, tenor: impl Into<String>) -> Self {
        Self::EngineNotFound {
            expiry: expiry.into(),
            tenor: tenor.into(),
        }
    }

    /// Creates an [`SabrError::NotCalibrated`].
    #[must_use]
    pub fn not_calibrated(expiry: impl Into<String>, tenor: impl Into<String>) -> Self {
        Self::NotCalibrated {
            expiry: expiry.into(),
            tenor: tenor.into(),
        }
    }

    /// Creates an [`SabrError::InvalidGrid`].
    #[must_use]
    pub fn invalid_grid(reason: impl Into<String>) -> Self {
        Self::InvalidGrid {
            reason: reason.into(),
        }
    }

    /// Creates an [`SabrError::InvalidParameter`].
    #[must_use]
    pub fn invalid_parameter(reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            reason: reason.into(),
        }
    }

    /// Creates an [`SabrError::CalibrationFailed`].
    #[must_use]
    pub fn calibration_failed(reason: impl Into<String>) -> Self {
        Self::CalibrationFailed {
            reason: reason.into(),
        }
    }
}
