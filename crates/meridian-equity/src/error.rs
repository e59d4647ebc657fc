//! Error types for equity pricing.

use thiserror::Error;

use meridian_math::MathError;

/// Convenience alias for equity pricing operations.
pub type EquityResult<T> = Result<T, EquityError>;

/// Errors raised by curve construction, the lattice and PDE pricers, and
/// the implied-volatility search.
#[derive(Debug, Error)]
pub enum EquityError {
    /// A pricing input is out of range or inconsistent.
    #[error("invalid parameter: {reason}")]
    InvalidParameter {
        /// What is wrong with the input.
        reason: String,
    },

    /// The spatial or time discretization is too coarse to price on.
    #[error("grid too coarse: {reason}")]
    GridTooCoarse {
        /// Why the grid cannot be used.
        reason: String,
    },

    /// The implied-volatility search exhausted its iteration budget.
    #[error("implied volatility did not converge after {iterations} iterations (last residual {residual})")]
    ImpliedVolFailed {
        /// Number of Newton iterations performed.
        iterations: u32,
        /// Price residual at the final volatility.
        residual: f64,
    },

    /// Error from the numerical layer.
    #[error(transparent)]
    Math(#[from] MathError),
}

impl EquityError {
    /// Creates an [`EquityError::InvalidParameter`].
    #[must_use]
    pub fn invalid_parameter(reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            reason: reason.into(),
        }
    }

    /// Creates an [`EquityError::GridTooCoarse`].
    #[must_use]
    pub fn grid_too_coarse(reason: impl Into<String>) -> Self {
        Self::GridTooCoarse {
            reason: reason.into(),
        }
    }

    /// Creates an [`EquityError::ImpliedVolFailed`].
    #[must_use]
    pub fn implied_vol_failed(iterations: u32, residual: f64) -> Self {
        Self::ImpliedVolFailed {
            iterations,
            residual,
        }
    }
}
