//! Bilinear interpolation on a rectangular grid.

use crate::error::{MathError, MathResult};

/// Bilinear interpolation over a rectangular grid of values.
///
/// Rows are indexed by `xs`, columns by `ys`; `values[i][j]` is the sample at
/// `(xs[i], ys[j])`. Queries outside the grid are clamped to the edge, which
/// is the behavior surface lookups want (a 35y tenor query on a grid ending
/// at 30y reads the 30y column).
#[derive(Debug, Clone)]
pub struct BilinearInterpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
    values: Vec<Vec<f64>>,
}

impl BilinearInterpolator {
    /// Creates a new bilinear interpolator.
    ///
    /// # Errors
    ///
    /// Returns an error if either axis is empty, not strictly increasing, or
    /// the value grid does not match the axis dimensions.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>, values: Vec<Vec<f64>>) -> MathResult<Self> {
        if xs.is_empty() || ys.is_empty() {
            return Err(MathError::insufficient_data(1, 0));
        }
        if values.len() != xs.len() {
            return Err(MathError::dimension_mismatch(format!(
                "grid has {} rows, axis has {} points",
                values.len(),
                xs.len()
            )));
        }
        for row in &values {
            if row.len() != ys.len() {
                return Err(MathError::dimension_mismatch(format!(
                    "grid row has {} columns, axis has {} points",
                    row.len(),
                    ys.len()
                )));
            }
        }
        for axis in [&xs, &ys] {
            for i in 1..axis.len() {
                if axis[i] <= axis[i - 1] {
                    return Err(MathError::invalid_input(
                        "axis values must be strictly increasing",
                    ));
                }
            }
        }

        Ok(Self { xs, ys, values })
    }

    /// Interpolates the grid at `(x, y)`, clamping to the grid edges.
    #[must_use]
    pub fn interpolate(&self, x: f64, y: f64) -> f64 {
        let (i0, i1, tx) = Self::locate(&self.xs, x);
        let (j0, j1, ty) = Self::locate(&self.ys, y);

        let v00 = self.values[i0][j0];
        let v01 = self.values[i0][j1];
        let v10 = self.values[i1][j0];
        let v11 = self.values[i1][j1];

        let low = v00 + tx * (v10 - v00);
        let high = v01 + tx * (v11 - v01);
        low + ty * (high - low)
    }

    /// Finds the bracketing indices and interpolation weight for `v`.
    fn locate(axis: &[f64], v: f64) -> (usize, usize, f64) {
        let n = axis.len();
        if n == 1 || v <= axis[0] {
            return (0, 0, 0.0);
        }
        if v >= axis[n - 1] {
            return (n - 1, n - 1, 0.0);
        }
        let mut i = 0;
        while axis[i + 1] < v {
            i += 1;
        }
        let t = (v - axis[i]) / (axis[i + 1] - axis[i]);
        (i, i + 1, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample() -> BilinearInterpolator {
        BilinearInterpolator::new(
            vec![0.0, 1.0],
            vec![0.0, 1.0],
            vec![vec![0.0, 1.0], vec![2.0, 3.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_corners() {
        let interp = sample();
        assert_relative_eq!(interp.interpolate(0.0, 0.0), 0.0);
        assert_relative_eq!(interp.interpolate(0.0, 1.0), 1.0);
        assert_relative_eq!(interp.interpolate(1.0, 0.0), 2.0);
        assert_relative_eq!(interp.interpolate(1.0, 1.0), 3.0);
    }

    #[test]
    fn test_center() {
        let interp = sample();
        assert_relative_eq!(interp.interpolate(0.5, 0.5), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_edge_clamping() {
        let interp = sample();
        assert_relative_eq!(interp.interpolate(-1.0, -1.0), 0.0);
        assert_relative_eq!(interp.interpolate(5.0, 5.0), 3.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let result = BilinearInterpolator::new(
            vec![0.0, 1.0],
            vec![0.0, 1.0],
            vec![vec![0.0, 1.0]],
        );
        assert!(result.is_err());
    }
}
