//! Implied volatility from the finite-difference pricer.

use log::debug;

use crate::error::{EquityError, EquityResult};
use crate::pde::CrankNicolsonPricer;

/// Newton iteration cap.
const MAX_ITERATIONS: u32 = 25;

/// Convergence tolerance on the price residual.
const PRICE_TOLERANCE: f64 = 1e-5;

/// Volatility bump used for the numerical slope, and the volatility floor.
const VOL_BUMP: f64 = 0.001;

/// Solves for the volatility at which the pricer reproduces `target`.
///
/// Newton's method with a bumped-reprice slope: each iteration runs the
/// finite-difference solve twice, at the current volatility and at the
/// volatility plus [`VOL_BUMP`]. The pricer's own volatility is the
/// starting guess.
pub fn implied_volatility(pricer: &CrankNicolsonPricer, target: f64) -> EquityResult<f64> {
    if target <= 0.0 {
        return Err(EquityError::invalid_parameter(format!(
            "target price {target} must be positive"
        )));
    }

    let mut volatility = pricer.volatility();
    let mut residual = f64::MAX;

    for iteration in 0..MAX_ITERATIONS {
        let price = pricer.clone().with_volatility(volatility).solve()?.price;
        residual = price - target;
        if residual.abs() < PRICE_TOLERANCE {
            debug!(
                "implied volatility converged to {volatility:.6} after {iteration} iterations"
            );
            return Ok(volatility);
        }

        let bumped = pricer
            .clone()
            .with_volatility(volatility + VOL_BUMP)
            .solve()?
            .price;
        let slope = (bumped - price) / VOL_BUMP;
        if slope.abs() < f64::EPSILON {
            return Err(EquityError::invalid_parameter(format!(
                "price is insensitive to volatility at {volatility}"
            )));
        }

        volatility = (volatility - residual / slope).max(VOL_BUMP);
    }

    Err(EquityError::implied_vol_failed(MAX_ITERATIONS, residual))
}
