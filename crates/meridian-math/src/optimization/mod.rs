//! Optimization algorithms.
//!
//! The SABR calibrator minimizes a least-squares smile error with a
//! derivative-free simplex search, optionally multi-started from a
//! low-discrepancy sequence.

mod halton;
mod nelder_mead;

pub use halton::HaltonSequence;
pub use nelder_mead::nelder_mead;

/// Configuration for the Nelder-Mead simplex minimizer.
#[derive(Debug, Clone, Copy)]
pub struct SimplexConfig {
    /// Relative tolerance on the simplex function-value spread.
    pub tolerance: f64,
    /// Maximum number of iterations.
    pub max_iterations: u32,
    /// Initial simplex edge length relative to each parameter.
    pub scale: f64,
}

impl Default for SimplexConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 1000,
            scale: 0.1,
        }
    }
}

impl SimplexConfig {
    /// Sets the convergence tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the maximum iterations.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the initial simplex scale.
    #[must_use]
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}

/// Result of an optimization run.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Optimal parameters found.
    pub parameters: Vec<f64>,
    /// Final objective function value.
    pub objective_value: f64,
    /// Number of iterations used.
    pub iterations: u32,
    /// Whether the optimization converged.
    pub converged: bool,
}
