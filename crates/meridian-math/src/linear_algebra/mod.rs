//! Linear algebra utilities.
//!
//! Three solvers cover the PDE engine's needs: a direct tridiagonal sweep,
//! Gauss-Jordan elimination with full pivoting for the small polynomial-fit
//! systems, and a projected SOR iteration for the implicit timestep with an
//! early-exercise floor.

use nalgebra::{DMatrix, DVector};

use crate::error::{MathError, MathResult};

/// Solves a tridiagonal system of equations with the Thomas algorithm.
///
/// # Arguments
///
/// * `a` - Lower diagonal (length n-1)
/// * `b` - Main diagonal (length n)
/// * `c` - Upper diagonal (length n-1)
/// * `d` - Right-hand side (length n)
///
/// # Returns
///
/// Solution vector x.
pub fn solve_tridiagonal(a: &[f64], b: &[f64], c: &[f64], d: &[f64]) -> MathResult<Vec<f64>> {
    let n = b.len();

    if n == 0 {
        return Ok(vec![]);
    }
    if a.len() != n - 1 || c.len() != n - 1 || d.len() != n {
        return Err(MathError::dimension_mismatch(
            "tridiagonal system has inconsistent lengths",
        ));
    }

    // Forward elimination
    let mut c_prime = vec![0.0; n];
    let mut d_prime = vec![0.0; n];

    if b[0].abs() < 1e-15 {
        return Err(MathError::SingularMatrix);
    }
    c_prime[0] = if n > 1 { c[0] / b[0] } else { 0.0 };
    d_prime[0] = d[0] / b[0];

    for i in 1..n {
        let denom = b[i] - a[i - 1] * c_prime[i - 1];
        if denom.abs() < 1e-15 {
            return Err(MathError::SingularMatrix);
        }
        if i < n - 1 {
            c_prime[i] = c[i] / denom;
        }
        d_prime[i] = (d[i] - a[i - 1] * d_prime[i - 1]) / denom;
    }

    // Back substitution
    let mut x = vec![0.0; n];
    x[n - 1] = d_prime[n - 1];
    for i in (0..n - 1).rev() {
        x[i] = d_prime[i] - c_prime[i] * x[i + 1];
    }

    Ok(x)
}

/// Solves `A x = b` by Gauss-Jordan elimination with full pivoting.
///
/// Intended for the small dense systems that arise when fitting a cubic
/// through four grid points; full pivoting keeps those well conditioned even
/// when the abscissae are closely spaced.
pub fn solve_gauss_jordan(a: &DMatrix<f64>, b: &DVector<f64>) -> MathResult<DVector<f64>> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(MathError::invalid_input("matrix must be square"));
    }
    if n != b.len() {
        return Err(MathError::dimension_mismatch(format!(
            "matrix is {n}x{n} but rhs has {} entries",
            b.len()
        )));
    }

    let mut m = a.clone();
    let mut rhs = b.clone();
    // Column permutation applied during full pivoting
    let mut col_of = (0..n).collect::<Vec<_>>();

    for k in 0..n {
        // Find the largest remaining pivot
        let mut pivot = 0.0_f64;
        let (mut pr, mut pc) = (k, k);
        for i in k..n {
            for j in k..n {
                if m[(i, j)].abs() > pivot {
                    pivot = m[(i, j)].abs();
                    pr = i;
                    pc = j;
                }
            }
        }
        if pivot < 1e-15 {
            return Err(MathError::SingularMatrix);
        }

        if pr != k {
            m.swap_rows(pr, k);
            rhs.swap_rows(pr, k);
        }
        if pc != k {
            m.swap_columns(pc, k);
            col_of.swap(pc, k);
        }

        let diag = m[(k, k)];
        for j in k..n {
            m[(k, j)] /= diag;
        }
        rhs[k] /= diag;

        for i in 0..n {
            if i == k {
                continue;
            }
            let factor = m[(i, k)];
            if factor == 0.0 {
                continue;
            }
            for j in k..n {
                m[(i, j)] -= factor * m[(k, j)];
            }
            rhs[i] -= factor * rhs[k];
        }
    }

    // Undo the column permutation
    let mut x = DVector::zeros(n);
    for i in 0..n {
        x[col_of[i]] = rhs[i];
    }
    Ok(x)
}

/// Solves a tridiagonal system by successive over-relaxation.
///
/// Iterates from `initial` until the root-sum-square update falls below
/// `tolerance`. When `floor` is supplied each component is clamped from below
/// after every update, which turns the sweep into a projected SOR solve of
/// the early-exercise complementarity problem.
///
/// # Arguments
///
/// * `a`, `b`, `c` - Lower/main/upper diagonals (lengths n-1, n, n-1)
/// * `d` - Right-hand side (length n)
/// * `initial` - Starting vector (length n)
/// * `omega` - Relaxation parameter (1.0 is Gauss-Seidel)
/// * `floor` - Optional per-component lower bound
/// * `tolerance` - Convergence criterion on the update norm
/// * `max_iterations` - Iteration cap
#[allow(clippy::too_many_arguments)]
pub fn sor_tridiagonal(
    a: &[f64],
    b: &[f64],
    c: &[f64],
    d: &[f64],
    initial: &[f64],
    omega: f64,
    floor: Option<&[f64]>,
    tolerance: f64,
    max_iterations: u32,
) -> MathResult<Vec<f64>> {
    let n = b.len();
    if n == 0 {
        return Ok(vec![]);
    }
    if a.len() != n - 1 || c.len() != n - 1 || d.len() != n || initial.len() != n {
        return Err(MathError::dimension_mismatch(
            "SOR system has inconsistent lengths",
        ));
    }
    if let Some(fl) = floor {
        if fl.len() != n {
            return Err(MathError::dimension_mismatch(
                "floor vector length must match system size",
            ));
        }
    }

    let mut x = initial.to_vec();
    for _ in 0..max_iterations {
        let mut err = 0.0;
        for i in 0..n {
            if b[i].abs() < 1e-15 {
                return Err(MathError::SingularMatrix);
            }
            let mut sum = d[i];
            if i > 0 {
                sum -= a[i - 1] * x[i - 1];
            }
            if i < n - 1 {
                sum -= c[i] * x[i + 1];
            }
            let mut updated = (1.0 - omega) * x[i] + omega * sum / b[i];
            if let Some(fl) = floor {
                updated = updated.max(fl[i]);
            }
            err += (updated - x[i]) * (updated - x[i]);
            x[i] = updated;
        }
        if err.sqrt() < tolerance {
            return Ok(x);
        }
    }

    Err(MathError::convergence_failed(max_iterations, 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tridiagonal_simple() {
        let a = vec![1.0, 1.0];
        let b = vec![2.0, 2.0, 2.0];
        let c = vec![1.0, 1.0];
        let d = vec![1.0, 2.0, 3.0];

        let x = solve_tridiagonal(&a, &b, &c, &d).unwrap();

        assert_relative_eq!(b[0] * x[0] + c[0] * x[1], d[0], epsilon = 1e-12);
        assert_relative_eq!(a[0] * x[0] + b[1] * x[1] + c[1] * x[2], d[1], epsilon = 1e-12);
        assert_relative_eq!(a[1] * x[1] + b[2] * x[2], d[2], epsilon = 1e-12);
    }

    #[test]
    fn test_gauss_jordan_cubic_fit() {
        // Fit a cubic through four points of y = x^3 - x + 1
        let xs: [f64; 4] = [0.8, 0.9, 1.0, 1.1];
        let mut m = DMatrix::zeros(4, 4);
        let mut rhs = DVector::zeros(4);
        for (i, &x) in xs.iter().enumerate() {
            for j in 0..4 {
                m[(i, j)] = x.powi(j as i32);
            }
            rhs[i] = x.powi(3) - x + 1.0;
        }

        let coeffs = solve_gauss_jordan(&m, &rhs).unwrap();
        assert_relative_eq!(coeffs[0], 1.0, epsilon = 1e-8);
        assert_relative_eq!(coeffs[1], -1.0, epsilon = 1e-8);
        assert_relative_eq!(coeffs[2], 0.0, epsilon = 1e-8);
        assert_relative_eq!(coeffs[3], 1.0, epsilon = 1e-8);
    }

    #[test]
    fn test_gauss_jordan_singular() {
        let m = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        let rhs = DVector::from_vec(vec![1.0, 2.0]);
        assert!(matches!(
            solve_gauss_jordan(&m, &rhs),
            Err(MathError::SingularMatrix)
        ));
    }

    #[test]
    fn test_sor_matches_direct_solve() {
        let a = vec![-0.4, -0.4, -0.4];
        let b = vec![2.0, 2.0, 2.0, 2.0];
        let c = vec![-0.4, -0.4, -0.4];
        let d = vec![1.0, 0.5, 0.25, 0.125];

        let direct = solve_tridiagonal(&a, &b, &c, &d).unwrap();
        let iterative =
            sor_tridiagonal(&a, &b, &c, &d, &vec![0.0; 4], 1.0, None, 1e-12, 500).unwrap();

        for (x, y) in direct.iter().zip(&iterative) {
            assert_relative_eq!(x, y, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_sor_floor_clamps() {
        let a = vec![0.0];
        let b = vec![1.0, 1.0];
        let c = vec![0.0];
        let d = vec![-5.0, 5.0];
        let floor = vec![0.0, 0.0];

        let x = sor_tridiagonal(&a, &b, &c, &d, &vec![0.0; 2], 1.0, Some(&floor), 1e-12, 100)
            .unwrap();
        assert_relative_eq!(x[0], 0.0); // clamped
        assert_relative_eq!(x[1], 5.0);
    }
}
