//! Natural cubic spline interpolation.

use crate::error::{MathError, MathResult};
use crate::interpolation::{Extrapolation, Interpolator};

/// Natural cubic spline through the data points.
///
/// Piecewise cubics with continuous first and second derivatives; the
/// second derivative is zero at both endpoints. [`Extrapolation::Linear`]
/// extends the endpoint tangent beyond the data range.
///
/// # Example
///
/// ```rust
/// use meridian_math::interpolation::{CubicSpline, Interpolator};
///
/// let xs = vec![0.0, 1.0, 2.0, 3.0];
/// let ys = vec![0.0, 1.0, 4.0, 9.0];
///
/// let spline = CubicSpline::new(xs, ys).unwrap();
/// let y = spline.interpolate(1.5).unwrap();
/// assert!(y > 1.0 && y < 4.0);
/// ```
#[derive(Debug, Clone)]
pub struct CubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    // Second derivatives at each knot
    y2s: Vec<f64>,
    extrapolation: Extrapolation,
}

impl CubicSpline {
    /// Creates a natural cubic spline.
    ///
    /// # Arguments
    ///
    /// * `xs` - X coordinates (must be strictly increasing)
    /// * `ys` - Y coordinates
    ///
    /// # Errors
    ///
    /// Returns an error if there are fewer than 3 points, lengths differ,
    /// or the x values are not strictly increasing.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        if xs.len() < 3 {
            return Err(MathError::insufficient_data(3, xs.len()));
        }
        if xs.len() != ys.len() {
            return Err(MathError::invalid_input(format!(
                "xs and ys must have same length: {} vs {}",
                xs.len(),
                ys.len()
            )));
        }
        for i in 1..xs.len() {
            if xs[i] <= xs[i - 1] {
                return Err(MathError::invalid_input(
                    "x values must be strictly increasing",
                ));
            }
        }

        let y2s = second_derivatives(&xs, &ys);

        Ok(Self {
            xs,
            ys,
            y2s,
            extrapolation: Extrapolation::None,
        })
    }

    /// Sets the out-of-range policy.
    #[must_use]
    pub fn with_extrapolation(mut self, extrapolation: Extrapolation) -> Self {
        self.extrapolation = extrapolation;
        self
    }

    /// Finds the index i such that xs[i] <= x < xs[i+1].
    fn find_segment(&self, x: f64) -> usize {
        match self
            .xs
            .binary_search_by(|probe| probe.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Equal))
        {
            Ok(i) => i.min(self.xs.len() - 2),
            Err(i) => (i.saturating_sub(1)).min(self.xs.len() - 2),
        }
    }

    /// First derivative at an endpoint, for tangent extrapolation.
    fn endpoint_slope(&self, at_start: bool) -> f64 {
        let n = self.xs.len();
        if at_start {
            let h = self.xs[1] - self.xs[0];
            (self.ys[1] - self.ys[0]) / h - h * (2.0 * self.y2s[0] + self.y2s[1]) / 6.0
        } else {
            let h = self.xs[n - 1] - self.xs[n - 2];
            (self.ys[n - 1] - self.ys[n - 2]) / h
                + h * (self.y2s[n - 2] + 2.0 * self.y2s[n - 1]) / 6.0
        }
    }
}

impl Interpolator for CubicSpline {
    fn interpolate(&self, x: f64) -> MathResult<f64> {
        let n = self.xs.len();
        if x < self.xs[0] || x > self.xs[n - 1] {
            match self.extrapolation {
                Extrapolation::None => {
                    return Err(MathError::ExtrapolationNotAllowed {
                        x,
                        min: self.xs[0],
                        max: self.xs[n - 1],
                    });
                }
                Extrapolation::Flat => {
                    return Ok(if x < self.xs[0] {
                        self.ys[0]
                    } else {
                        self.ys[n - 1]
                    });
                }
                Extrapolation::Linear => {
                    return Ok(if x < self.xs[0] {
                        self.ys[0] + self.endpoint_slope(true) * (x - self.xs[0])
                    } else {
                        self.ys[n - 1] + self.endpoint_slope(false) * (x - self.xs[n - 1])
                    });
                }
            }
        }

        let i = self.find_segment(x);
        let h = self.xs[i + 1] - self.xs[i];
        let a = (self.xs[i + 1] - x) / h;
        let b = (x - self.xs[i]) / h;

        Ok(a * self.ys[i]
            + b * self.ys[i + 1]
            + ((a * a * a - a) * self.y2s[i] + (b * b * b - b) * self.y2s[i + 1]) * (h * h) / 6.0)
    }

    fn min_x(&self) -> f64 {
        self.xs[0]
    }

    fn max_x(&self) -> f64 {
        self.xs[self.xs.len() - 1]
    }

    fn extrapolation(&self) -> Extrapolation {
        self.extrapolation
    }
}

/// Second derivatives at the knots of a natural spline, by the standard
/// tridiagonal recursion.
fn second_derivatives(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let n = xs.len();
    let mut y2s = vec![0.0; n];
    let mut u = vec![0.0; n - 1];

    for i in 1..n - 1 {
        let sig = (xs[i] - xs[i - 1]) / (xs[i + 1] - xs[i - 1]);
        let p = sig * y2s[i - 1] + 2.0;
        y2s[i] = (sig - 1.0) / p;
        let d = (ys[i + 1] - ys[i]) / (xs[i + 1] - xs[i])
            - (ys[i] - ys[i - 1]) / (xs[i] - xs[i - 1]);
        u[i] = (6.0 * d / (xs[i + 1] - xs[i - 1]) - sig * u[i - 1]) / p;
    }

    // Back-substitution; y2s at both ends stay zero
    for i in (1..n - 1).rev() {
        y2s[i] = y2s[i] * y2s[i + 1] + u[i];
    }
    y2s
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reproduces_knots() {
        let xs = vec![0.0, 1.0, 2.5, 4.0];
        let ys = vec![1.0, 0.5, 0.8, 0.2];
        let spline = CubicSpline::new(xs.clone(), ys.clone()).unwrap();
        for (x, y) in xs.iter().zip(&ys) {
            assert_relative_eq!(spline.interpolate(*x).unwrap(), *y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_linear_data_stays_linear() {
        // A natural spline through collinear points is the line itself
        let xs = vec![0.0, 1.0, 2.0, 3.0];
        let ys = vec![1.0, 3.0, 5.0, 7.0];
        let spline = CubicSpline::new(xs, ys).unwrap();
        assert_relative_eq!(spline.interpolate(1.5).unwrap(), 4.0, epsilon = 1e-12);
        assert_relative_eq!(spline.interpolate(2.25).unwrap(), 5.5, epsilon = 1e-12);
    }

    #[test]
    fn test_smoother_than_segments() {
        // Between knots of a convex set the spline dips below the chord
        let xs = vec![0.0, 1.0, 2.0, 3.0];
        let ys = vec![0.0, 1.0, 4.0, 9.0];
        let spline = CubicSpline::new(xs, ys).unwrap();
        let mid = spline.interpolate(1.5).unwrap();
        assert!(mid > 1.0 && mid < 2.5);
    }

    #[test]
    fn test_out_of_range_policies() {
        let xs = vec![0.0, 1.0, 2.0];
        let ys = vec![0.0, 1.0, 0.0];

        let strict = CubicSpline::new(xs.clone(), ys.clone()).unwrap();
        assert!(strict.interpolate(-1.0).is_err());

        let flat = CubicSpline::new(xs.clone(), ys.clone())
            .unwrap()
            .with_extrapolation(Extrapolation::Flat);
        assert_relative_eq!(flat.interpolate(5.0).unwrap(), 0.0);

        let tangent = CubicSpline::new(xs, ys)
            .unwrap()
            .with_extrapolation(Extrapolation::Linear);
        // Beyond the last knot the value keeps falling along the tangent
        assert!(tangent.interpolate(3.0).unwrap() < 0.0);
    }

    #[test]
    fn test_too_few_points_rejected() {
        assert!(CubicSpline::new(vec![0.0, 1.0], vec![1.0, 2.0]).is_err());
    }
}
