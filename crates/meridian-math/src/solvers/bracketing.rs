//! Bracket search helpers and the free-function root-finding API.
//!
//! Callers that can tolerate failure (retry with a wider interval, skip an
//! instrument) use [`try_find_root`]; callers for which a missing root is
//! fatal use [`find_root`]. [`find_root_expand`] first repairs a same-sign
//! interval by geometric expansion and subdivision search.

use log::debug;

use crate::error::{MathError, MathResult};
use crate::solvers::{brent, SolverConfig};

/// Default geometric expansion factor.
pub const EXPANSION_FACTOR: f64 = 1.6;

/// Default maximum expansion iterations.
pub const EXPANSION_MAX_ITERATIONS: u32 = 50;

/// Default number of subdivisions for the reduction search.
pub const REDUCE_SUBDIVISIONS: u32 = 1000;

/// Expands an interval geometrically until it brackets a sign change.
///
/// Each iteration moves the endpoint whose function value is smaller in
/// magnitude outward by `factor` times the current width. Returns `true` when
/// `[a, b]` brackets a root on exit.
pub fn expand<F>(f: &F, a: &mut f64, b: &mut f64, factor: f64, max_iterations: u32) -> bool
where
    F: Fn(f64) -> f64,
{
    if *a >= *b {
        return false;
    }
    let mut fa = f(*a);
    let mut fb = f(*b);
    for _ in 0..max_iterations {
        if fa.signum() != fb.signum() {
            return true;
        }
        if fa.abs() < fb.abs() {
            *a += factor * (*a - *b);
            fa = f(*a);
        } else {
            *b += factor * (*b - *a);
            fb = f(*b);
        }
    }
    fa.signum() != fb.signum()
}

/// Searches subintervals of `[a, b]` for a sign change.
///
/// Walks `subdivisions` equal subintervals left to right and narrows `[a, b]`
/// to the first one whose finite endpoint values change sign. Subintervals
/// with non-finite values (poles, overflow) are skipped. Returns `true` when
/// a bracketing subinterval was found.
pub fn reduce<F>(f: &F, a: &mut f64, b: &mut f64, subdivisions: u32) -> bool
where
    F: Fn(f64) -> f64,
{
    if *a >= *b || subdivisions == 0 {
        return false;
    }
    let width = (*b - *a) / f64::from(subdivisions);
    let mut sa = *a;
    let mut fa = f(sa);
    for _ in 0..subdivisions {
        let sb = sa + width;
        let fb = f(sb);
        if fa.is_finite() && fb.is_finite() && fa.signum() != fb.signum() {
            *a = sa;
            *b = sb;
            return true;
        }
        sa = sb;
        fa = fb;
    }
    false
}

/// Expands then, if expansion failed, subdivides in search of a bracket.
pub fn expand_reduce<F>(
    f: &F,
    a: &mut f64,
    b: &mut f64,
    factor: f64,
    expansion_max_iterations: u32,
    subdivisions: u32,
) -> bool
where
    F: Fn(f64) -> f64,
{
    if expand(f, a, b, factor, expansion_max_iterations) {
        return true;
    }
    debug!("bracket expansion failed on [{a}, {b}], falling back to subdivision search");
    reduce(f, a, b, subdivisions)
}

/// Non-throwing root search on a bracket.
///
/// Returns `None` instead of an error when the interval does not bracket a
/// root or the iteration fails to converge, letting the caller fall back to
/// another strategy.
pub fn try_find_root<F>(f: F, a: f64, b: f64, config: &SolverConfig) -> Option<f64>
where
    F: Fn(f64) -> f64,
{
    brent(f, a, b, config).ok().map(|result| result.root)
}

/// Root search on a bracket; failure to find a root is an error.
pub fn find_root<F>(f: F, a: f64, b: f64, config: &SolverConfig) -> MathResult<f64>
where
    F: Fn(f64) -> f64,
{
    brent(f, a, b, config).map(|result| result.root)
}

/// Root search that repairs the interval first.
///
/// Runs [`expand_reduce`] with the default factor/iteration constants to
/// locate a sign change, then solves on the repaired bracket.
///
/// # Errors
///
/// [`MathError::InvalidBracket`] when no sign change could be found even
/// after expansion and subdivision.
pub fn find_root_expand<F>(f: F, a: f64, b: f64, config: &SolverConfig) -> MathResult<f64>
where
    F: Fn(f64) -> f64,
{
    let mut lo = a;
    let mut hi = b;
    if !expand_reduce(
        &f,
        &mut lo,
        &mut hi,
        EXPANSION_FACTOR,
        EXPANSION_MAX_ITERATIONS,
        REDUCE_SUBDIVISIONS,
    ) {
        return Err(MathError::InvalidBracket {
            a,
            b,
            fa: f(a),
            fb: f(b),
        });
    }
    find_root(f, lo, hi, config)
}
