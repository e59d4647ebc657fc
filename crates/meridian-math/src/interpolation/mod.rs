//! Interpolation methods.
//!
//! Curve lookups and surface fills share three primitives: one-dimensional
//! linear and natural cubic spline interpolation with a configurable
//! out-of-range policy, and bilinear interpolation on a rectangular grid.

mod bilinear;
mod cubic;
mod linear;

pub use bilinear::BilinearInterpolator;
pub use cubic::CubicSpline;
pub use linear::LinearInterpolator;

use crate::error::MathResult;

/// Policy for queries outside the data range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Extrapolation {
    /// Out-of-range queries are an error.
    #[default]
    None,
    /// Clamp to the nearest endpoint value.
    Flat,
    /// Extend the first/last segment's slope.
    Linear,
}

/// Trait for one-dimensional interpolators.
pub trait Interpolator {
    /// Interpolates a value at `x`.
    fn interpolate(&self, x: f64) -> MathResult<f64>;

    /// Smallest x in the data range.
    fn min_x(&self) -> f64;

    /// Largest x in the data range.
    fn max_x(&self) -> f64;

    /// The out-of-range policy in effect.
    fn extrapolation(&self) -> Extrapolation;
}
