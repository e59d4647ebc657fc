//! Brent's root-finding algorithm.
//!
//! The iteration is the Numerical Recipes formulation: inverse quadratic
//! interpolation with a bisection fallback, converging when the bracket
//! half-width drops below `2 * EPSILON * |root| + 0.5 * tolerance`. The exact
//! epsilon scaling matters: bootstrap objective functions are nearly flat for
//! deep out-of-the-money curve points and a looser test stalls there.

use crate::error::{MathError, MathResult};
use crate::solvers::{SolverConfig, SolverResult};

/// Golden-ratio growth factor for the auto-bracketing search.
const GROWTH_FACTOR: f64 = 1.618;

/// Brent's root-finding algorithm on a caller-supplied bracket.
///
/// Combines the reliability of bisection with the speed of inverse quadratic
/// interpolation. This is generally the best choice when a derivative is not
/// available.
///
/// Requires: `f(a) * f(b) <= 0` (opposite signs at endpoints).
///
/// # Arguments
///
/// * `f` - The function for which to find a root
/// * `a` - Lower bound of the bracket
/// * `b` - Upper bound of the bracket
/// * `config` - Solver configuration
///
/// # Returns
///
/// The root and evaluation statistics, or an error if the bracket is invalid
/// or the evaluation budget is exhausted.
///
/// # Example
///
/// ```rust
/// use meridian_math::solvers::{brent, SolverConfig};
///
/// let f = |x: f64| x * x - 2.0;
/// let result = brent(f, 1.0, 2.0, &SolverConfig::default()).unwrap();
/// assert!((result.root - std::f64::consts::SQRT_2).abs() < 1e-10);
/// ```
pub fn brent<F>(f: F, a: f64, b: f64, config: &SolverConfig) -> MathResult<SolverResult>
where
    F: Fn(f64) -> f64,
{
    let fa = f(a);
    if fa == 0.0 {
        return Ok(SolverResult {
            root: a,
            evaluations: 1,
            residual: fa,
        });
    }
    let fb = f(b);
    if fb == 0.0 {
        return Ok(SolverResult {
            root: b,
            evaluations: 2,
            residual: fb,
        });
    }
    if fa * fb > 0.0 {
        return Err(MathError::InvalidBracket { a, b, fa, fb });
    }

    solve_impl(&f, a, fa, b, fb, (a + b) / 2.0, 2, config)
}

/// Brent's method with a guess inside a validated bracket.
///
/// Validates `x_min < x_max` and `guess` within `[x_min, x_max]`. Either
/// endpoint already within accuracy of a root is returned immediately; a
/// same-sign bracket is an error.
///
/// # Errors
///
/// [`MathError::InvalidRange`] for bad bounds or guess,
/// [`MathError::InvalidBracket`] when no sign change exists,
/// [`MathError::ConvergenceFailed`] when the evaluation budget runs out.
pub fn brent_bracketed<F>(
    f: F,
    guess: f64,
    x_min: f64,
    x_max: f64,
    config: &SolverConfig,
) -> MathResult<SolverResult>
where
    F: Fn(f64) -> f64,
{
    if x_min >= x_max {
        return Err(MathError::invalid_range(format!(
            "invalid bounds: x_min ({x_min}) >= x_max ({x_max})"
        )));
    }
    if guess < x_min || guess > x_max {
        return Err(MathError::invalid_range(format!(
            "guess ({guess}) outside [{x_min}, {x_max}]"
        )));
    }

    let f_min = f(x_min);
    if f_min.abs() < config.tolerance {
        return Ok(SolverResult {
            root: x_min,
            evaluations: 1,
            residual: f_min,
        });
    }
    let f_max = f(x_max);
    if f_max.abs() < config.tolerance {
        return Ok(SolverResult {
            root: x_max,
            evaluations: 2,
            residual: f_max,
        });
    }
    if f_min * f_max > 0.0 {
        return Err(MathError::InvalidBracket {
            a: x_min,
            b: x_max,
            fa: f_min,
            fb: f_max,
        });
    }

    solve_impl(&f, x_min, f_min, x_max, f_max, guess, 2, config)
}

/// Brent's method with automatic bracketing around a guess.
///
/// Evaluates at `guess` first; if already within accuracy, returns it.
/// Otherwise expands outward by a golden-ratio growth factor, moving the side
/// with the smaller function magnitude (alternating on ties), until a sign
/// change brackets a root, then runs the Brent iteration from the bracket
/// midpoint. The expansion and the iteration share one evaluation budget.
pub fn brent_auto<F>(f: F, guess: f64, step: f64, config: &SolverConfig) -> MathResult<SolverResult>
where
    F: Fn(f64) -> f64,
{
    if step <= 0.0 {
        return Err(MathError::invalid_range(format!(
            "step must be positive, got {step}"
        )));
    }

    let f_guess = f(guess);
    if f_guess.abs() < config.tolerance {
        return Ok(SolverResult {
            root: guess,
            evaluations: 1,
            residual: f_guess,
        });
    }

    let (mut x_min, mut f_min, mut x_max, mut f_max);
    if f_guess > 0.0 {
        x_min = guess - step;
        f_min = f(x_min);
        x_max = guess;
        f_max = f_guess;
    } else {
        x_min = guess;
        f_min = f_guess;
        x_max = guess + step;
        f_max = f(x_max);
    }

    let mut evaluations: u32 = 2;
    let mut flipflop = -1;

    while evaluations <= config.max_evaluations {
        if f_min * f_max <= 0.0 {
            if f_min == 0.0 {
                return Ok(SolverResult {
                    root: x_min,
                    evaluations,
                    residual: f_min,
                });
            }
            if f_max == 0.0 {
                return Ok(SolverResult {
                    root: x_max,
                    evaluations,
                    residual: f_max,
                });
            }
            let root = (x_min + x_max) / 2.0;
            return solve_impl(&f, x_min, f_min, x_max, f_max, root, evaluations, config);
        }

        // Expand the side whose function value is closer to zero; it is the
        // better candidate for crossing.
        if f_min.abs() < f_max.abs() {
            x_min += GROWTH_FACTOR * (x_min - x_max);
            f_min = f(x_min);
        } else if f_min.abs() > f_max.abs() {
            x_max += GROWTH_FACTOR * (x_max - x_min);
            f_max = f(x_max);
        } else if flipflop == -1 {
            x_min += GROWTH_FACTOR * (x_min - x_max);
            f_min = f(x_min);
            flipflop = 1;
        } else {
            x_max += GROWTH_FACTOR * (x_max - x_min);
            f_max = f(x_max);
            flipflop = -1;
        }
        evaluations += 1;
    }

    Err(MathError::convergence_failed(
        config.max_evaluations,
        f_min.abs().min(f_max.abs()),
    ))
}

/// Core Brent iteration on an established bracket.
#[allow(clippy::too_many_arguments)]
fn solve_impl<F>(
    f: &F,
    mut x_min: f64,
    mut f_min: f64,
    mut x_max: f64,
    mut f_max: f64,
    mut root: f64,
    mut evaluations: u32,
    config: &SolverConfig,
) -> MathResult<SolverResult>
where
    F: Fn(f64) -> f64,
{
    let mut d = 0.0;
    let mut e = 0.0;

    let mut f_root = f(root);
    evaluations += 1;

    while evaluations <= config.max_evaluations {
        // Keep (root, x_max) an opposite-sign pair
        if (f_root > 0.0 && f_max > 0.0) || (f_root < 0.0 && f_max < 0.0) {
            x_max = x_min;
            f_max = f_min;
            d = root - x_min;
            e = d;
        }
        // The point with the smaller |f| plays the role of the current root
        if f_max.abs() < f_root.abs() {
            x_min = root;
            root = x_max;
            x_max = x_min;
            f_min = f_root;
            f_root = f_max;
            f_max = f_min;
        }

        let x_acc1 = 2.0 * f64::EPSILON * root.abs() + 0.5 * config.tolerance;
        let x_mid = (x_max - root) / 2.0;

        if x_mid.abs() <= x_acc1 || f_root == 0.0 {
            return Ok(SolverResult {
                root,
                evaluations,
                residual: f_root,
            });
        }

        if e.abs() >= x_acc1 && f_min.abs() > f_root.abs() {
            // Attempt inverse quadratic interpolation
            let s = f_root / f_min;
            let mut p;
            let mut q;
            if x_min == x_max {
                p = 2.0 * x_mid * s;
                q = 1.0 - s;
            } else {
                q = f_min / f_max;
                let r = f_root / f_max;
                p = s * (2.0 * x_mid * q * (q - r) - (root - x_min) * (r - 1.0));
                q = (q - 1.0) * (r - 1.0) * (s - 1.0);
            }
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();
            let min1 = 3.0 * x_mid * q - (x_acc1 * q).abs();
            let min2 = (e * q).abs();
            if 2.0 * p < min1.min(min2) {
                // Interpolation accepted
                e = d;
                d = p / q;
            } else {
                d = x_mid;
                e = d;
            }
        } else {
            // Bounds decreasing too slowly, bisect
            d = x_mid;
            e = d;
        }

        x_min = root;
        f_min = f_root;
        if d.abs() > x_acc1 {
            root += d;
        } else {
            root += x_acc1.copysign(x_mid);
        }
        f_root = f(root);
        evaluations += 1;
    }

    Err(MathError::convergence_failed(
        config.max_evaluations,
        f_root.abs(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_sqrt_2() {
        let f = |x: f64| x * x - 2.0;
        let result = brent(f, 1.0, 2.0, &SolverConfig::default()).unwrap();
        assert_relative_eq!(result.root, std::f64::consts::SQRT_2, epsilon = 1e-10);
    }

    #[test]
    fn test_cubic() {
        // x^3 - x - 2 has a root near 1.52
        let f = |x: f64| x * x * x - x - 2.0;
        let result = brent(f, 1.0, 2.0, &SolverConfig::default()).unwrap();
        assert!(f(result.root).abs() < 1e-9);
        assert_relative_eq!(result.root, 1.521_379_706_804_568, epsilon = 1e-9);
    }

    #[test]
    fn test_sin_near_pi() {
        let f = |x: f64| x.sin();
        let result = brent(f, 3.0, 4.0, &SolverConfig::default()).unwrap();
        assert_relative_eq!(result.root, std::f64::consts::PI, epsilon = 1e-10);
    }

    #[test]
    fn test_invalid_bracket() {
        let f = |x: f64| x * x - 2.0;
        let result = brent(f, 2.0, 3.0, &SolverConfig::default());
        assert!(matches!(result, Err(MathError::InvalidBracket { .. })));
    }

    #[test]
    fn test_bracketed_endpoint_within_accuracy() {
        let config = SolverConfig::default().with_tolerance(1e-4);
        // f(1.0) = 1e-6 is already within the accuracy target
        let f = |x: f64| (x - 1.0) + 1e-6;
        let result = brent_bracketed(f, 1.5, 1.0, 2.0, &config).unwrap();
        assert_relative_eq!(result.root, 1.0);
        assert_eq!(result.evaluations, 1);
    }

    #[test]
    fn test_bracketed_rejects_bad_bounds() {
        let f = |x: f64| x;
        assert!(matches!(
            brent_bracketed(f, 0.0, 1.0, -1.0, &SolverConfig::default()),
            Err(MathError::InvalidRange { .. })
        ));
        assert!(matches!(
            brent_bracketed(f, 5.0, -1.0, 1.0, &SolverConfig::default()),
            Err(MathError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_auto_bracket_expands_to_root() {
        // Root at 10, guess far below with a small step
        let f = |x: f64| x - 10.0;
        let result = brent_auto(f, 0.0, 0.1, &SolverConfig::default()).unwrap();
        assert_relative_eq!(result.root, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_auto_bracket_guess_already_root() {
        let f = |x: f64| x - 1.0;
        let result = brent_auto(f, 1.0, 0.5, &SolverConfig::default()).unwrap();
        assert_eq!(result.evaluations, 1);
        assert_relative_eq!(result.root, 1.0);
    }

    #[test]
    fn test_auto_bracket_rejects_non_positive_step() {
        let f = |x: f64| x;
        assert!(brent_auto(f, 1.0, 0.0, &SolverConfig::default()).is_err());
    }

    #[test]
    fn test_evaluation_budget_exhausted() {
        // No root anywhere: expansion can never bracket
        let f = |x: f64| x * x + 1.0;
        let result = brent_auto(f, 0.0, 1.0, &SolverConfig::default());
        assert!(matches!(
            result,
            Err(MathError::ConvergenceFailed { evaluations: 100, .. })
        ));
    }

    #[test]
    fn test_flat_objective_converges() {
        // Nearly flat away from the root, like a long-dated discount factor
        // objective evaluated at short maturities
        let f = |x: f64| (x - 0.3).powi(3) * 1e-6;
        let result = brent(f, 0.0, 1.0, &SolverConfig::default()).unwrap();
        assert_relative_eq!(result.root, 0.3, epsilon = 1e-3);
    }

    proptest! {
        #[test]
        fn prop_root_stays_inside_bracket(k in -100.0f64..100.0) {
            let f = move |x: f64| (x - k) * ((x - k).powi(2) + 1.0);
            let (a, b) = (k - 3.0, k + 2.0);
            let result = brent(f, a, b, &SolverConfig::default()).unwrap();
            prop_assert!(result.root >= a && result.root <= b);
            prop_assert!(f(result.root).abs() < 1e-6);
        }
    }
}
