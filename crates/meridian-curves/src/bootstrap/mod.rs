//! Curve bootstrapping.
//!
//! All bootstrappers share one sequential algorithm: sort instruments by
//! maturity, skip duplicates, seed each point analytically where the asset
//! class allows, accept the seed outright when it already reprices within
//! tolerance, and otherwise solve with Brent's method inside value-kind
//! bounds. The variants differ only in curve kind, seeding fallbacks and
//! the objective they hand the solver.

mod capfloor;
mod credit;
mod direct;
mod fx;
mod rate;
mod sequential;
mod spread;

pub use capfloor::CapFloorBootstrapper;
pub use credit::CreditBootstrapper;
pub use direct::{BondBootstrapper, SimpleExchangeBootstrapper};
pub use fx::FxBootstrapper;
pub use rate::RateBootstrapper;
pub use spread::RateSpreadBootstrapper;

use meridian_math::solvers::SolverConfig;

use crate::curve::CurveInterpolation;

/// Default quote-error tolerance below which a seeded guess is accepted
/// without solving.
pub const DEFAULT_TOLERANCE: f64 = 1e-8;

/// Configuration shared by the bootstrappers.
#[derive(Debug, Clone, Copy)]
pub struct BootstrapConfig {
    /// Quote-error tolerance for the fast-path guess acceptance, and the
    /// repricing tolerance the finished curve is expected to meet.
    pub tolerance: f64,
    /// Root-finder configuration for points that need solving.
    pub solver: SolverConfig,
    /// Interpolation scheme for the curve being built.
    pub interpolation: CurveInterpolation,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            solver: SolverConfig::default(),
            interpolation: CurveInterpolation::LogLinear,
        }
    }
}

impl BootstrapConfig {
    /// Sets the quote-error tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the solver configuration.
    #[must_use]
    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Sets the curve interpolation scheme.
    #[must_use]
    pub fn with_interpolation(mut self, interpolation: CurveInterpolation) -> Self {
        self.interpolation = interpolation;
        self
    }
}
