//! Root-finding algorithms.
//!
//! Every bootstrap and calibration in Meridian funnels through the solvers
//! in this module, so the API is deliberately small:
//!
//! - [`brent`]: Brent's method on a caller-supplied bracket
//! - [`brent_bracketed`]: Brent's method with a guess inside validated bounds
//! - [`brent_auto`]: golden-ratio auto-bracketing around a guess, then Brent
//! - [`try_find_root`] / [`find_root`] / [`find_root_expand`]: free-function
//!   variants with non-throwing and auto-expanding flavors
//!
//! # Choosing an entry point
//!
//! | Entry point | Needs | Failure mode |
//! |-------------|-------|--------------|
//! | `brent` | bracket `[a, b]` | error |
//! | `brent_bracketed` | guess + bounds | error |
//! | `brent_auto` | guess + step | error |
//! | `try_find_root` | bracket | `None` |
//! | `find_root_expand` | rough interval | error after expand/reduce |
//!
//! # Example
//!
//! ```rust
//! use meridian_math::solvers::{brent, SolverConfig};
//!
//! // Find root of x^3 - x - 2
//! let f = |x: f64| x * x * x - x - 2.0;
//!
//! let result = brent(f, 1.0, 2.0, &SolverConfig::default()).unwrap();
//! assert!(f(result.root).abs() < 1e-10);
//! ```

mod bracketing;
mod brent;

pub use bracketing::{expand, expand_reduce, find_root, find_root_expand, reduce, try_find_root};
pub use brent::{brent, brent_auto, brent_bracketed};

/// Default accuracy for root-finding algorithms.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Default maximum number of function evaluations.
pub const DEFAULT_MAX_EVALUATIONS: u32 = 100;

/// Configuration for root-finding algorithms.
#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    /// Accuracy target. Convergence is declared when the bracket half-width
    /// falls below `2 * EPSILON * |root| + 0.5 * tolerance`, or when a
    /// function value is exactly zero.
    pub tolerance: f64,
    /// Maximum number of function evaluations.
    pub max_evaluations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_evaluations: DEFAULT_MAX_EVALUATIONS,
        }
    }
}

impl SolverConfig {
    /// Creates a new solver configuration.
    #[must_use]
    pub fn new(tolerance: f64, max_evaluations: u32) -> Self {
        Self {
            tolerance,
            max_evaluations,
        }
    }

    /// Sets the accuracy target.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the maximum number of function evaluations.
    #[must_use]
    pub fn with_max_evaluations(mut self, max_evaluations: u32) -> Self {
        self.max_evaluations = max_evaluations;
        self
    }
}

/// Result of a root-finding run.
#[derive(Debug, Clone, Copy)]
pub struct SolverResult {
    /// The root found.
    pub root: f64,
    /// Number of function evaluations used.
    pub evaluations: u32,
    /// Function value at the root.
    pub residual: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // A typical financial objective: present value error of a 5y 5% annual
    // bond priced at 95, as a function of yield.
    fn bond_price_error(y: f64) -> f64 {
        let mut pv = 0.0;
        for t in 1..=5 {
            pv += 5.0 / (1.0 + y).powi(t);
        }
        pv += 100.0 / (1.0 + y).powi(5);
        pv - 95.0
    }

    #[test]
    fn test_ytm_via_brent() {
        let result = brent(bond_price_error, 0.0, 0.20, &SolverConfig::default()).unwrap();
        // YTM > coupon rate for a discount bond
        assert!(result.root > 0.05);
        assert!(bond_price_error(result.root).abs() < 1e-8);
    }

    #[test]
    fn test_ytm_via_auto_bracket() {
        let result = brent_auto(bond_price_error, 0.05, 0.01, &SolverConfig::default()).unwrap();
        assert!(bond_price_error(result.root).abs() < 1e-8);
    }

    #[test]
    fn test_config_builder() {
        let config = SolverConfig::default()
            .with_tolerance(1e-8)
            .with_max_evaluations(50);
        assert_relative_eq!(config.tolerance, 1e-8);
        assert_eq!(config.max_evaluations, 50);
    }

    #[test]
    fn test_exact_linear_roots() {
        // f(x) = x - k recovers k exactly across magnitudes
        for k in [-1000.0, -1.0, 0.0, 1.0, 1000.0] {
            let f = move |x: f64| x - k;
            let result = brent_auto(f, 0.1, 1.0, &SolverConfig::default()).unwrap();
            assert_relative_eq!(result.root, k, epsilon = 1e-9, max_relative = 1e-9);
        }
    }
}
