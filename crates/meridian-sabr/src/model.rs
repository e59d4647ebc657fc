//! SABR model parameters and the Hagan implied-volatility formula.

use serde::{Deserialize, Serialize};

use crate::error::{SabrError, SabrResult};

/// The four SABR model parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SabrParameters {
    /// Overall volatility level. Must be positive.
    pub alpha: f64,
    /// CEV exponent in `[0, 1]`.
    pub beta: f64,
    /// Volatility of volatility. Must be non-negative.
    pub nu: f64,
    /// Spot/volatility correlation in `(-1, 1)`.
    pub rho: f64,
}

impl SabrParameters {
    /// Creates a parameter set without validation.
    #[must_use]
    pub fn new(alpha: f64, beta: f64, nu: f64, rho: f64) -> Self {
        Self {
            alpha,
            beta,
            nu,
            rho,
        }
    }

    /// Checks every parameter against its admissible range.
    pub fn validate(&self) -> SabrResult<()> {
        if self.alpha <= 0.0 {
            return Err(SabrError::invalid_parameter(format!(
                "alpha must be positive, got {}",
                self.alpha
            )));
        }
        if !(0.0..=1.0).contains(&self.beta) {
            return Err(SabrError::invalid_parameter(format!(
                "beta must lie in [0, 1], got {}",
                self.beta
            )));
        }
        if self.nu < 0.0 {
            return Err(SabrError::invalid_parameter(format!(
                "nu must be non-negative, got {}",
                self.nu
            )));
        }
        if self.rho.abs() >= 1.0 {
            return Err(SabrError::invalid_parameter(format!(
                "rho must lie in (-1, 1), got {}",
                self.rho
            )));
        }
        Ok(())
    }
}

/// Evaluates the Hagan SABR implied-volatility formula.
///
/// `asset_price` is the forward level, `exercise_time` the time to option
/// expiry in years. All three query inputs must be positive; the parameters
/// are validated before evaluation.
pub fn implied_volatility(
    params: &SabrParameters,
    asset_price: f64,
    exercise_time: f64,
    strike: f64,
) -> SabrResult<f64> {
    params.validate()?;
    if asset_price <= 0.0 || exercise_time <= 0.0 || strike <= 0.0 {
        return Err(SabrError::invalid_parameter(format!(
            "implied vol query needs positive inputs (forward {asset_price}, \
             expiry {exercise_time}, strike {strike})"
        )));
    }

    let z = compute_z(params, asset_price, strike);
    let x = compute_x(params, z);
    Ok(compute_sigma(params, asset_price, exercise_time, strike, x, z))
}

/// The SABR variable `z`.
fn compute_z(params: &SabrParameters, asset_price: f64, strike: f64) -> f64 {
    let one_minus_beta = 1.0 - params.beta;
    let lambda = params.nu / params.alpha * (asset_price * strike).powf(one_minus_beta / 2.0);
    lambda * (asset_price / strike).ln()
}

/// The SABR variable `x(z)`.
fn compute_x(params: &SabrParameters, z: f64) -> f64 {
    let numerator = z - params.rho + (1.0 - 2.0 * params.rho * z + z * z).sqrt();
    (numerator / (1.0 - params.rho)).ln()
}

fn compute_sigma(
    params: &SabrParameters,
    asset_price: f64,
    exercise_time: f64,
    strike: f64,
    x: f64,
    z: f64,
) -> f64 {
    // z/x degenerates to 1 at the ATM point where both vanish
    let multiplier = if x.abs() > f64::EPSILON { z / x } else { 1.0 };

    let one_minus_beta = 1.0 - params.beta;
    let mu = (asset_price / strike).ln();
    let lambda = (asset_price * strike).powf(one_minus_beta / 2.0);

    let denominator = lambda
        * (1.0
            + one_minus_beta.powi(2) * mu.powi(2) / 24.0
            + one_minus_beta.powi(4) * mu.powi(4) / 1920.0);
    let leading_term = params.alpha / denominator * multiplier;

    let c = one_minus_beta.powi(2) * params.alpha.powi(2) / (24.0 * lambda * lambda);
    let d = params.rho * params.beta * params.nu * params.alpha / (4.0 * lambda);
    let e = params.nu.powi(2) * (2.0 - 3.0 * params.rho.powi(2)) / 24.0;
    let second_order_term = (c + d + e) * exercise_time;

    leading_term * (1.0 + second_order_term)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params() -> SabrParameters {
        SabrParameters::new(0.20, 0.85, 0.40, -0.30)
    }

    #[test]
    fn test_atm_vol_matches_expansion() {
        // At the money the formula collapses to the ATM expansion
        let p = params();
        let f = 0.05_f64;
        let t = 2.0;
        let lambda = f.powf(1.0 - p.beta);
        let c = (1.0 - p.beta).powi(2) * p.alpha.powi(2) / (24.0 * lambda * lambda);
        let d = p.rho * p.beta * p.nu * p.alpha / (4.0 * lambda);
        let e = p.nu.powi(2) * (2.0 - 3.0 * p.rho.powi(2)) / 24.0;
        let expected = p.alpha / lambda * (1.0 + (c + d + e) * t);

        let vol = implied_volatility(&p, f, t, f).unwrap();
        assert_relative_eq!(vol, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_smile_shape_with_negative_rho() {
        // Negative correlation tilts the smile: low strikes richer than high
        let p = params();
        let f = 0.05;
        let t = 1.0;
        let low = implied_volatility(&p, f, t, 0.8 * f).unwrap();
        let atm = implied_volatility(&p, f, t, f).unwrap();
        let high = implied_volatility(&p, f, t, 1.2 * f).unwrap();

        assert!(low > atm);
        assert!(low > high);
    }

    #[test]
    fn test_lognormal_limit() {
        // beta = 1, nu -> 0 reduces to a flat lognormal vol of alpha
        let p = SabrParameters::new(0.25, 1.0, 0.0, 0.0);
        for strike in [0.03, 0.05, 0.08] {
            let vol = implied_volatility(&p, 0.05, 1.5, strike).unwrap();
            assert_relative_eq!(vol, 0.25, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_parameter_validation() {
        assert!(SabrParameters::new(-0.1, 0.5, 0.3, 0.0).validate().is_err());
        assert!(SabrParameters::new(0.2, 1.5, 0.3, 0.0).validate().is_err());
        assert!(SabrParameters::new(0.2, 0.5, -0.3, 0.0).validate().is_err());
        assert!(SabrParameters::new(0.2, 0.5, 0.3, 1.0).validate().is_err());
        assert!(SabrParameters::new(0.2, 0.5, 0.3, -0.4).validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_query_inputs() {
        let p = params();
        assert!(implied_volatility(&p, 0.0, 1.0, 0.05).is_err());
        assert!(implied_volatility(&p, 0.05, -1.0, 0.05).is_err());
        assert!(implied_volatility(&p, 0.05, 1.0, 0.0).is_err());
    }
}
