//! Crank-Nicolson finite-difference pricer on a log-asset grid.
//!
//! The grid spans `ln(spot) +/- far * sigma * sqrt(T)` and steps backward
//! from expiry with theta-weighted implicit sweeps. Each implicit system
//! is solved by projected SOR, which also enforces the American
//! early-exercise floor. Discrete dividends are handled by a grid shift:
//! at an ex-dividend date the value array is re-read at the shifted asset
//! levels instead of folding the dividend into a continuous yield.
//!
//! Price, delta and gamma come from a cubic fitted through the four grid
//! nodes bracketing the spot; theta from the value change over the final
//! timestep.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use meridian_math::linear_algebra::{solve_gauss_jordan, sor_tridiagonal};

use crate::error::{EquityError, EquityResult};
use crate::market::{DividendSchedule, ZeroRateCurve};
use crate::payoff::{ExerciseStyle, PdePayoff};

/// Discretization settings for the finite-difference pricer.
#[derive(Debug, Clone, Copy)]
pub struct PdeConfig {
    /// Number of spatial grid nodes.
    pub steps: usize,
    /// Nominal time step in years.
    pub time_step: f64,
    /// Half-width of the log grid in standard deviations.
    pub far: f64,
    /// Implicitness weight; 0.5 is Crank-Nicolson.
    pub theta: f64,
    /// SOR convergence tolerance on the update norm.
    pub tolerance: f64,
    /// SOR iteration cap per timestep.
    pub max_iterations: u32,
}

impl Default for PdeConfig {
    fn default() -> Self {
        Self {
            steps: 151,
            time_step: 0.004,
            far: 4.0,
            theta: 0.5,
            tolerance: 1e-6,
            max_iterations: 10_000,
        }
    }
}

impl PdeConfig {
    /// Sets the number of spatial nodes.
    #[must_use]
    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    /// Sets the nominal time step.
    #[must_use]
    pub fn with_time_step(mut self, time_step: f64) -> Self {
        self.time_step = time_step;
        self
    }

    /// Sets the grid half-width in standard deviations.
    #[must_use]
    pub fn with_far(mut self, far: f64) -> Self {
        self.far = far;
        self
    }
}

/// Price and Greeks extracted from one finite-difference solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PdeSolution {
    /// Option value at the spot.
    pub price: f64,
    /// First derivative in the asset.
    pub delta: f64,
    /// Second derivative in the asset.
    pub gamma: f64,
    /// One-day time decay.
    pub theta: f64,
}

/// A Crank-Nicolson pricer for one option.
///
/// The pricer holds inputs only; [`CrankNicolsonPricer::solve`] builds a
/// fresh grid every call, so bumped repricing (vega, implied vol) clones
/// the pricer with changed inputs rather than mutating a solved grid.
#[derive(Debug, Clone)]
pub struct CrankNicolsonPricer {
    spot: f64,
    strike: f64,
    expiry: f64,
    volatility: f64,
    payoff: PdePayoff,
    style: ExerciseStyle,
    config: PdeConfig,
    curve: ZeroRateCurve,
    dividends: DividendSchedule,
}

impl CrankNicolsonPricer {
    /// Creates a pricer with the default discretization.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        spot: f64,
        strike: f64,
        payoff: PdePayoff,
        style: ExerciseStyle,
        expiry: f64,
        volatility: f64,
        curve: &ZeroRateCurve,
        dividends: &DividendSchedule,
    ) -> EquityResult<Self> {
        if spot <= 0.0 || strike <= 0.0 {
            return Err(EquityError::invalid_parameter(format!(
                "spot {spot} and strike {strike} must be positive"
            )));
        }
        if expiry <= 0.0 || volatility <= 0.0 {
            return Err(EquityError::invalid_parameter(format!(
                "expiry {expiry} and volatility {volatility} must be positive"
            )));
        }
        Ok(Self {
            spot,
            strike,
            expiry,
            volatility,
            payoff,
            style,
            config: PdeConfig::default(),
            curve: curve.clone(),
            dividends: dividends.clone(),
        })
    }

    /// Replaces the discretization settings.
    #[must_use]
    pub fn with_config(mut self, config: PdeConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the volatility. Used by bumped repricing.
    #[must_use]
    pub fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = volatility;
        self
    }

    /// Current volatility input.
    #[must_use]
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// Runs the backward induction and extracts price and Greeks.
    pub fn solve(&self) -> EquityResult<PdeSolution> {
        let n = self.config.steps;
        if n < 6 {
            return Err(EquityError::grid_too_coarse(format!(
                "finite-difference grid needs at least 6 nodes, got {n}"
            )));
        }

        let half_width = self.config.far * self.volatility * self.expiry.sqrt();
        let x_lower = self.spot.ln() - half_width;
        let x_upper = self.spot.ln() + half_width;
        let dx = (x_upper - x_lower) / (n - 1) as f64;
        let x: Vec<f64> = (0..n).map(|i| x_lower + i as f64 * dx).collect();

        let mut v: Vec<f64> = x
            .iter()
            .map(|xi| self.payoff.terminal(xi.exp(), self.strike))
            .collect();

        let time_steps = ((self.expiry / self.config.time_step).round() as usize).max(1);
        let dt_nominal = self.expiry / time_steps as f64;

        let mut t_current = self.expiry;
        let mut tau = 0.0;
        let mut dt = dt_nominal;
        let mut value_before_step = 0.0;

        while tau - self.expiry < -0.001 * self.expiry {
            let t_next = (t_current - dt_nominal).max(0.0);
            let (step, dividend) = self.next_step(t_next, t_current);
            dt = step;
            t_current -= dt;
            tau = self.expiry - t_current;

            let rate = self.curve.forward_rate(t_current, t_current + dt)?;
            let rate_to_expiry = self.curve.forward_rate(t_current, self.expiry)?;
            let escrowed = self
                .dividends
                .present_value(&self.curve, t_current, self.expiry)?;

            // Value at the spot before this sweep, for the theta estimate
            value_before_step = interpolate_at(&x, &v, self.spot.ln(), x_lower, dx);

            self.sweep(&x, &mut v, dt, dx, rate, tau, rate_to_expiry, escrowed)?;

            if dividend != 0.0 {
                self.shift_grid(&x, &mut v, dividend, tau, rate_to_expiry, escrowed, x_lower, dx);
            }
        }

        self.extract(&x, &v, x_lower, dx, dt, value_before_step)
    }

    /// Shortens the proposed step to land exactly on an ex-dividend date
    /// inside it, returning the step and the dividend paid.
    fn next_step(&self, t1: f64, t2: f64) -> (f64, f64) {
        for (time, amount) in self.dividends.times() {
            if t1 <= time && t2 > time {
                return (t2 - time, amount);
            }
        }
        (t2 - t1, 0.0)
    }

    /// One theta-weighted implicit sweep, solved by projected SOR.
    #[allow(clippy::too_many_arguments)]
    fn sweep(
        &self,
        x: &[f64],
        v: &mut [f64],
        dt: f64,
        dx: f64,
        rate: f64,
        tau: f64,
        rate_to_expiry: f64,
        escrowed: f64,
    ) -> EquityResult<()> {
        let n = x.len();
        let theta = self.config.theta;
        let n1 = dt / (dx * dx);
        let n2 = dt / dx;

        let diffusion = 0.5 * self.volatility * self.volatility;
        let drift = rate - diffusion;
        let discounting = -rate;

        let ar = (1.0 - theta) * (n1 * diffusion - 0.5 * n2 * drift);
        let br = (1.0 - theta) * (-2.0 * n1 * diffusion + dt * discounting);
        let cr = (1.0 - theta) * (n1 * diffusion + 0.5 * n2 * drift);
        let al = theta * ar / (1.0 - theta);
        let bl = theta * br / (1.0 - theta);
        let cl = theta * cr / (1.0 - theta);

        // Explicit side, evaluated before the boundary overwrite
        let mut q = vec![0.0; n];
        for i in 1..n - 1 {
            q[i] = ar * v[i - 1] + (1.0 + br) * v[i] + cr * v[i + 1];
        }

        v[0] = self.lower_boundary(tau, x[0].exp(), rate_to_expiry, escrowed);
        v[n - 1] = self.upper_boundary(tau, x[n - 1].exp(), rate_to_expiry, escrowed);

        // Interior system with the boundary values folded into the rhs
        let m = n - 2;
        let sub = vec![-al; m - 1];
        let diag = vec![1.0 - bl; m];
        let sup = vec![-cl; m - 1];
        let mut rhs: Vec<f64> = q[1..n - 1].to_vec();
        rhs[0] += al * v[0];
        rhs[m - 1] += cl * v[n - 1];

        let floor: Option<Vec<f64>> = match self.style {
            ExerciseStyle::American => Some(
                x[1..n - 1]
                    .iter()
                    .map(|xi| self.payoff.intrinsic(xi.exp(), self.strike))
                    .collect(),
            ),
            ExerciseStyle::European => None,
        };

        let solution = sor_tridiagonal(
            &sub,
            &diag,
            &sup,
            &rhs,
            &v[1..n - 1],
            1.0,
            floor.as_deref(),
            self.config.tolerance,
            self.config.max_iterations,
        )?;
        v[1..n - 1].copy_from_slice(&solution);
        Ok(())
    }

    /// Re-reads the value array at asset levels lowered by the dividend.
    #[allow(clippy::too_many_arguments)]
    fn shift_grid(
        &self,
        x: &[f64],
        v: &mut Vec<f64>,
        dividend: f64,
        tau: f64,
        rate_to_expiry: f64,
        escrowed: f64,
        x_lower: f64,
        dx: f64,
    ) {
        let n = x.len();
        let american = self.style == ExerciseStyle::American;
        let mut shifted = Vec::with_capacity(n);

        let lower = self.lower_boundary(
            tau,
            (x[0].exp() - dividend).max(0.0),
            rate_to_expiry,
            escrowed,
        );
        shifted.push(if american {
            lower.max(self.payoff.intrinsic(x[0].exp(), self.strike))
        } else {
            lower
        });

        for i in 1..n {
            let asset = x[i].exp() - dividend;
            let value = if asset > 0.0 && asset.ln() >= x_lower {
                interpolate_at(x, v, asset.ln(), x_lower, dx)
            } else {
                // Shifted below the grid: the lower boundary still applies
                self.lower_boundary(tau, asset.max(0.0), rate_to_expiry, escrowed)
            };
            shifted.push(if american {
                value.max(self.payoff.intrinsic(x[i].exp(), self.strike))
            } else {
                value
            });
        }
        *v = shifted;
    }

    fn lower_boundary(&self, tau: f64, asset: f64, rate_to_expiry: f64, escrowed: f64) -> f64 {
        let discount = (-rate_to_expiry * tau).exp();
        match self.payoff {
            PdePayoff::Put => match self.style {
                ExerciseStyle::European => {
                    discount * self.strike - (asset - escrowed).max(0.0)
                }
                ExerciseStyle::American => self.strike - asset,
            },
            PdePayoff::DigitalPut => discount,
            PdePayoff::Call | PdePayoff::DigitalCall | PdePayoff::OneTouch => 0.0,
        }
    }

    fn upper_boundary(&self, tau: f64, asset: f64, rate_to_expiry: f64, escrowed: f64) -> f64 {
        let discount = (-rate_to_expiry * tau).exp();
        match self.payoff {
            PdePayoff::Call => {
                let parity = asset - escrowed - discount * self.strike;
                match self.style {
                    ExerciseStyle::American => parity.max(asset - self.strike),
                    ExerciseStyle::European => parity,
                }
            }
            PdePayoff::DigitalCall => discount,
            PdePayoff::Put | PdePayoff::DigitalPut | PdePayoff::OneTouch => 0.0,
        }
    }

    /// Cubic fit through the four nodes bracketing the spot.
    fn extract(
        &self,
        x: &[f64],
        v: &[f64],
        x_lower: f64,
        dx: f64,
        dt: f64,
        value_before_step: f64,
    ) -> EquityResult<PdeSolution> {
        let n = x.len();
        let key = bracket_index(self.spot.ln(), x_lower, dx).clamp(1, n - 3);
        let price = interpolate_at(x, v, self.spot.ln(), x_lower, dx);

        let mut a = DMatrix::zeros(4, 4);
        let mut b = DVector::zeros(4);
        for row in 0..4 {
            let s = x[key - 1 + row].exp();
            for col in 0..4 {
                a[(row, col)] = s.powi(col as i32);
            }
            b[row] = v[key - 1 + row];
        }
        let coeffs = solve_gauss_jordan(&a, &b)?;

        let s = self.spot;
        Ok(PdeSolution {
            price,
            delta: coeffs[1] + 2.0 * coeffs[2] * s + 3.0 * coeffs[3] * s * s,
            gamma: 2.0 * coeffs[2] + 6.0 * coeffs[3] * s,
            theta: (value_before_step - price) / (365.0 * dt),
        })
    }
}

fn bracket_index(x_value: f64, x_lower: f64, dx: f64) -> usize {
    ((x_value - x_lower) / dx) as usize
}

/// Linear interpolation of the value array at a log-asset level.
fn interpolate_at(x: &[f64], v: &[f64], x_value: f64, x_lower: f64, dx: f64) -> f64 {
    let i = bracket_index(x_value, x_lower, dx).min(x.len() - 2);
    let frac = (x_value - x[i]) / (x[i + 1] - x[i]);
    v[i] * (1.0 - frac) + v[i + 1] * frac
}
