//! # Meridian Math
//!
//! Numerical workhorse for the Meridian analytics library.
//!
//! This crate provides:
//!
//! - **Solvers**: Brent's method (pre-bracketed and auto-bracketing), plus
//!   non-throwing bracket expansion/reduction helpers
//! - **Interpolation**: linear and bilinear interpolation
//! - **Optimization**: Nelder-Mead simplex, Halton quasi-random sequences
//! - **Linear Algebra**: tridiagonal solve, Gauss-Jordan elimination, SOR
//!
//! ## Design Philosophy
//!
//! - **Numerical Stability**: convergence tests scale with machine epsilon
//! - **Bounded Work**: every iterative routine carries an iteration cap
//!   rather than a wall-clock timeout

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::if_not_else)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::float_cmp)]

pub mod error;
pub mod interpolation;
pub mod linear_algebra;
pub mod optimization;
pub mod solvers;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{MathError, MathResult};
    pub use crate::interpolation::{
        BilinearInterpolator, CubicSpline, Extrapolation, Interpolator, LinearInterpolator,
    };
    pub use crate::optimization::{
        nelder_mead, HaltonSequence, OptimizationResult, SimplexConfig,
    };
    pub use crate::solvers::{
        brent, brent_auto, brent_bracketed, expand, expand_reduce, find_root, find_root_expand,
        reduce, try_find_root, SolverConfig, SolverResult,
    };
}

pub use error::{MathError, MathResult};
