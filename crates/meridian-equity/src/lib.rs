//! # Meridian Equity
//!
//! Equity option pricing on discrete-dividend trees and finite-difference
//! grids.
//!
//! This crate provides:
//!
//! - **Market inputs**: a day-pillar zero curve with linear-in-rate
//!   interpolation and a cash [`market::DividendSchedule`]
//! - **Binomial**: a CRR-style lattice on the escrowed-dividend spot with
//!   payoff smoothing near the strike and lattice Greeks
//! - **PDE**: a Crank-Nicolson solver on a log-asset grid with projected
//!   SOR for American exercise, grid-shift dividends and digital payoffs
//! - **Implied volatility**: a bumped-Newton search over the PDE price
//!
//! ## Example
//!
//! ```rust
//! use meridian_equity::binomial::{BinomialPricer, BinomialSpec};
//! use meridian_equity::market::{DividendSchedule, ZeroRateCurve};
//! use meridian_equity::payoff::{ExerciseStyle, OptionKind};
//!
//! let spec = BinomialSpec::new(100.0, 100.0, OptionKind::Put, ExerciseStyle::American, 1.0, 0.2)
//!     .with_steps(200);
//! let pricer = BinomialPricer::build(
//!     spec,
//!     &ZeroRateCurve::flat(0.05),
//!     &DividendSchedule::none(),
//! )
//! .unwrap();
//! assert!(pricer.price() > 0.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::if_not_else)]
#![allow(clippy::float_cmp)]

pub mod binomial;
pub mod error;
pub mod implied;
pub mod market;
pub mod payoff;
pub mod pde;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::binomial::{BinomialPricer, BinomialSpec};
    pub use crate::error::{EquityError, EquityResult};
    pub use crate::implied::implied_volatility;
    pub use crate::market::{forward_price, DividendSchedule, ZeroRateCurve};
    pub use crate::payoff::{ExerciseStyle, OptionKind, PdePayoff};
    pub use crate::pde::{CrankNicolsonPricer, PdeConfig, PdeSolution};
}

pub use error::{EquityError, EquityResult};
