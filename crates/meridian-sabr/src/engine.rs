//! SABR calibration engine.
//!
//! Three calibration modes share one engine type:
//!
//! - **Full**: alpha, nu and rho fitted to a strike ladder of market
//!   volatilities. Nelder-Mead runs over transformed coordinates
//!   `(theta, mu)` with `rho = cos(theta)` and `nu = mu^2`, which keeps the
//!   simplex inside the admissible region without constraints. Alpha is
//!   never a free variable: at every step it is recovered from the ATM
//!   volatility by solving a cubic, so the fit stays pinned to the ATM
//!   point.
//! - **ATM**: nu and rho supplied by the caller, only alpha solved from
//!   the ATM volatility.
//! - **Interpolated**: nu and rho read off a surface assembled from
//!   neighboring calibrated engines, then alpha solved as in ATM mode.

use log::debug;
use serde::{Deserialize, Serialize};

use meridian_math::optimization::{nelder_mead, HaltonSequence, SimplexConfig};
use meridian_math::solvers::{find_root_expand, SolverConfig};

use crate::error::{SabrError, SabrResult};
use crate::model::{implied_volatility, SabrParameters};
use crate::surface::NuRhoSurface;

/// Upper bound for the alpha search, as a multiple of the closed-form
/// ATM approximation.
const ALPHA_MULTIPLIER: f64 = 2.0;

/// Floor for the alpha search bracket.
const MINIMUM_ALPHA: f64 = 0.00001;

/// Magnitude of the initial rho guess; the ATM smile slope picks the sign.
const MID_RHO: f64 = 0.5;

/// Perturbation applied when the optimizer lands exactly on |rho| = 1.
const RHO_PERTURBATION: f64 = 0.01;

/// Number of quasi-random seeds retried when the first fit fails.
const NUM_BEST_CANDIDATES: usize = 5;

/// Length of the Halton sequence scanned for candidate seeds.
const SEQUENCE_LENGTH: u32 = 1500;

/// Immutable settings shared by the engines built from one settings handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSettings {
    /// Instrument family the calibration applies to (e.g. "Swaption").
    pub instrument: String,
    /// Currency code.
    pub currency: String,
    /// The SABR beta, fixed for the whole calibration.
    pub beta: f64,
}

impl CalibrationSettings {
    /// Creates a settings tuple.
    #[must_use]
    pub fn new(instrument: impl Into<String>, currency: impl Into<String>, beta: f64) -> Self {
        Self {
            instrument: instrument.into(),
            currency: currency.into(),
            beta,
        }
    }
}

/// Per-mode calibration input.
#[derive(Debug, Clone)]
enum CalibrationInput {
    Full {
        strikes: Vec<f64>,
        volatilities: Vec<f64>,
    },
    Atm,
    Interpolated {
        surface: NuRhoSurface,
        tenor: f64,
    },
}

/// A SABR engine for one (expiry, tenor) cell.
#[derive(Debug, Clone)]
pub struct SabrEngine {
    settings: CalibrationSettings,
    input: CalibrationInput,
    asset_price: f64,
    exercise_time: f64,
    atm_volatility: f64,
    params: SabrParameters,
    calibrated: bool,
    calibration_error: f64,
}

impl SabrEngine {
    /// Creates an engine for a full smile calibration.
    ///
    /// `strikes` must be in ascending order with the ATM strike in the
    /// interior; `volatilities` pairs with it one to one.
    pub fn full(
        settings: CalibrationSettings,
        strikes: Vec<f64>,
        volatilities: Vec<f64>,
        asset_price: f64,
        exercise_time: f64,
    ) -> SabrResult<Self> {
        if strikes.len() != volatilities.len() {
            return Err(SabrError::invalid_grid(format!(
                "{} strikes but {} volatilities",
                strikes.len(),
                volatilities.len()
            )));
        }
        if strikes.len() < 3 {
            return Err(SabrError::invalid_grid(
                "full calibration needs at least 3 strikes",
            ));
        }
        if asset_price <= 0.0 || exercise_time <= 0.0 {
            return Err(SabrError::invalid_parameter(format!(
                "asset price {asset_price} and exercise time {exercise_time} must be positive"
            )));
        }
        Ok(Self {
            params: SabrParameters::new(0.0, settings.beta, 0.0, 0.0),
            settings,
            input: CalibrationInput::Full {
                strikes,
                volatilities,
            },
            asset_price,
            exercise_time,
            atm_volatility: 0.0,
            calibrated: false,
            calibration_error: 0.0,
        })
    }

    /// Creates an engine for an ATM calibration: nu and rho are given,
    /// only alpha is solved.
    pub fn atm(
        settings: CalibrationSettings,
        nu: f64,
        rho: f64,
        atm_volatility: f64,
        asset_price: f64,
        exercise_time: f64,
    ) -> SabrResult<Self> {
        let params = SabrParameters::new(1.0, settings.beta, nu, rho);
        params.validate()?;
        Ok(Self {
            params: SabrParameters::new(0.0, settings.beta, nu, rho),
            settings,
            input: CalibrationInput::Atm,
            asset_price,
            exercise_time,
            atm_volatility,
            calibrated: false,
            calibration_error: 0.0,
        })
    }

    /// Creates an engine whose nu and rho are interpolated off a surface
    /// built from neighboring calibrated engines.
    pub fn interpolated(
        settings: CalibrationSettings,
        surface: NuRhoSurface,
        atm_volatility: f64,
        asset_price: f64,
        exercise_time: f64,
        tenor: f64,
    ) -> SabrResult<Self> {
        if surface.entries() == 0 {
            return Err(SabrError::calibration_failed(
                "no valid engines available for interpolated calibration",
            ));
        }
        Ok(Self {
            params: SabrParameters::new(0.0, settings.beta, 0.0, 0.0),
            settings,
            input: CalibrationInput::Interpolated { surface, tenor },
            asset_price,
            exercise_time,
            atm_volatility,
            calibrated: false,
            calibration_error: 0.0,
        })
    }

    /// Runs the calibration for this engine's mode.
    pub fn calibrate(&mut self) -> SabrResult<()> {
        match &self.input {
            CalibrationInput::Full { .. } => self.calibrate_full(),
            CalibrationInput::Atm => {
                let (alpha, converged) = self.solve_alpha(self.params.nu, self.params.rho);
                self.params.alpha = alpha;
                self.calibrated = converged;
                Ok(())
            }
            CalibrationInput::Interpolated { surface, tenor } => {
                let (nu, rho) = surface.interpolate(*tenor, self.exercise_time);
                self.params.nu = nu;
                self.params.rho = rho;
                let (alpha, converged) = self.solve_alpha(nu, rho);
                self.params.alpha = alpha;
                self.calibrated = converged;
                Ok(())
            }
        }
    }

    /// The calibrated (or in-progress) parameter set.
    #[must_use]
    pub fn parameters(&self) -> &SabrParameters {
        &self.params
    }

    /// The settings the engine was built with.
    #[must_use]
    pub fn settings(&self) -> &CalibrationSettings {
        &self.settings
    }

    /// Whether the last calibration succeeded.
    #[must_use]
    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    /// Objective value at the fitted parameters (zero for ATM mode).
    #[must_use]
    pub fn calibration_error(&self) -> f64 {
        self.calibration_error
    }

    /// Forward level the engine was calibrated against.
    #[must_use]
    pub fn asset_price(&self) -> f64 {
        self.asset_price
    }

    /// Time to option exercise in years.
    #[must_use]
    pub fn exercise_time(&self) -> f64 {
        self.exercise_time
    }

    /// Whether this engine was built by surface interpolation rather than
    /// fitted to data. Interpolated engines never contribute back to a
    /// nu/rho surface.
    #[must_use]
    pub fn is_interpolated(&self) -> bool {
        matches!(self.input, CalibrationInput::Interpolated { .. })
    }

    fn calibrate_full(&mut self) -> SabrResult<()> {
        let (theta_guess, mu_guess) = self.heuristic_seeds()?;

        let result = self.run_simplex(theta_guess, mu_guess);
        self.apply_fit(&result);
        if self.calibrated {
            return Ok(());
        }

        // First fit failed; retry from the most promising quasi-random seeds
        debug!(
            "simplex did not converge from heuristic seed, scanning {} Halton points",
            SEQUENCE_LENGTH
        );
        for (nu, rho) in self.best_candidates() {
            let result = self.run_simplex(rho.acos(), nu.sqrt());
            self.apply_fit(&result);
            if self.calibrated {
                break;
            }
        }
        Ok(())
    }

    /// Seeds rho from the sign of the ATM smile slope and nu from the
    /// slope-plus-convexity magnitude.
    fn heuristic_seeds(&mut self) -> SabrResult<(f64, f64)> {
        let (atm_volatility, atm_slope) = {
            let CalibrationInput::Full {
                strikes,
                volatilities,
            } = &self.input
            else {
                unreachable!("heuristic seeds are only computed for full calibration")
            };

            let log_moneyness: Vec<f64> =
                strikes.iter().map(|k| (k / self.asset_price).ln()).collect();
            let atm_index = log_moneyness
                .iter()
                .enumerate()
                .min_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
                .map_or(0, |(i, _)| i);
            if atm_index == 0 || atm_index == log_moneyness.len() - 1 {
                return Err(SabrError::AtmStrikeMissing);
            }

            let slope = (volatilities[atm_index + 1] - volatilities[atm_index - 1])
                / (log_moneyness[atm_index + 1] - log_moneyness[atm_index - 1]);
            (volatilities[atm_index], slope)
        };
        self.atm_volatility = atm_volatility;

        let rho_guess = MID_RHO * atm_slope.signum();
        let convexity = rho_guess * (1.0 - self.settings.beta) * self.atm_volatility;
        let nu_guess = 4.0 * (atm_slope + convexity).abs();

        Ok((rho_guess.acos(), nu_guess.sqrt()))
    }

    /// One Nelder-Mead run over `(theta, mu)` from the given seed.
    fn run_simplex(&self, theta: f64, mu: f64) -> FitResult {
        let objective = |x: &[f64]| {
            let (params, _) = self.params_from_transformed(x[0], x[1]);
            self.residual(&params)
        };
        // Unreachable: the initial point is always two-dimensional
        let outcome = nelder_mead(objective, &[theta, mu], &SimplexConfig::default())
            .unwrap_or_else(|_| unreachable!());

        let (params, _) = self.params_from_transformed(outcome.parameters[0], outcome.parameters[1]);
        FitResult {
            params,
            objective_value: outcome.objective_value,
            converged: outcome.converged,
        }
    }

    fn apply_fit(&mut self, fit: &FitResult) {
        self.params = fit.params;
        self.calibration_error = fit.objective_value;
        self.calibrated = fit.converged && fit.objective_value.is_finite();
    }

    /// Maps optimizer coordinates to SABR parameters: `rho = cos(theta)`
    /// (nudged off |rho| = 1), `nu = mu^2`, alpha from the ATM cubic.
    fn params_from_transformed(&self, theta: f64, mu: f64) -> (SabrParameters, bool) {
        let mut rho = theta.cos();
        if rho.abs() >= 1.0 {
            rho -= rho.signum() * RHO_PERTURBATION;
        }
        let nu = mu * mu;
        let (alpha, alpha_converged) = self.solve_alpha(nu, rho);
        (
            SabrParameters::new(alpha, self.settings.beta, nu, rho),
            alpha_converged,
        )
    }

    /// Sum of squared differences between model and market volatilities.
    fn residual(&self, params: &SabrParameters) -> f64 {
        let CalibrationInput::Full {
            strikes,
            volatilities,
        } = &self.input
        else {
            return 0.0;
        };
        let mut residual = 0.0;
        for (strike, market_vol) in strikes.iter().zip(volatilities) {
            let Ok(model_vol) =
                implied_volatility(params, self.asset_price, self.exercise_time, *strike)
            else {
                return f64::MAX;
            };
            if !model_vol.is_finite() {
                return f64::MAX;
            }
            residual += (model_vol - market_vol).powi(2);
        }
        residual
    }

    /// Scans a two-dimensional Halton sequence for the `(nu, rho)` draws
    /// with the smallest residuals. The first coordinate maps to nu, the
    /// second to rho stretched onto `(-1, 1)`.
    fn best_candidates(&self) -> Vec<(f64, f64)> {
        let sequence = HaltonSequence::new(2);
        let mut ranked: Vec<(f64, f64, f64)> = Vec::with_capacity(NUM_BEST_CANDIDATES + 1);
        for point in sequence.generate(SEQUENCE_LENGTH) {
            let nu = point[0];
            let rho = 2.0 * point[1] - 1.0;
            let (alpha, _) = self.solve_alpha(nu, rho);
            let residual =
                self.residual(&SabrParameters::new(alpha, self.settings.beta, nu, rho));
            ranked.push((residual, nu, rho));
            ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
            ranked.truncate(NUM_BEST_CANDIDATES);
        }
        ranked.into_iter().map(|(_, nu, rho)| (nu, rho)).collect()
    }

    /// Solves the Hagan ATM cubic for alpha given nu and rho.
    ///
    /// Falls back to the closed-form leading-order approximation
    /// `alpha = sigma_atm * f^(1 - beta)` when the root search fails, and
    /// reports the fallback through the returned flag.
    fn solve_alpha(&self, nu: f64, rho: f64) -> (f64, bool) {
        let beta = self.settings.beta;
        let f = self.asset_price;
        let t = self.exercise_time;
        let alpha0 = self.atm_volatility * f.powf(1.0 - beta);

        let cubic_coeff = (1.0 - beta).powi(2) * t / (24.0 * f.powf(2.0 - 2.0 * beta));
        let quadratic_coeff = rho * beta * nu * t / (4.0 * f.powf(1.0 - beta));
        let linear_coeff = 1.0 + nu * nu * (2.0 - 3.0 * rho * rho) * t / 24.0;
        let constant = -alpha0;

        let target = |alpha: f64| {
            cubic_coeff * alpha.powi(3) + quadratic_coeff * alpha * alpha + linear_coeff * alpha
                + constant
        };
        match find_root_expand(
            target,
            MINIMUM_ALPHA.min(alpha0 / ALPHA_MULTIPLIER),
            ALPHA_MULTIPLIER * alpha0,
            &SolverConfig::default(),
        ) {
            Ok(root) => (root, true),
            Err(_) => (alpha0, false),
        }
    }
}

/// Outcome of one simplex run.
struct FitResult {
    params: SabrParameters,
    objective_value: f64,
    converged: bool,
}
