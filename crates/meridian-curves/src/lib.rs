//! # Meridian Curves
//!
//! Sequential curve bootstrapping from market instrument quotes.
//!
//! This crate provides:
//!
//! - **Term curves**: ordered (date, value) term structures over discount
//!   factors, survival probabilities or volatilities, with pluggable
//!   interpolation
//! - **Instruments**: a narrow [`instruments::PriceableInstrument`]
//!   capability trait with concrete quote types per asset class
//! - **Bootstrappers**: rate, credit, fx, cap/floor, rate-spread and
//!   direct-insertion variants sharing one sequential algorithm
//!
//! ## The bootstrap contract
//!
//! Each instrument, repriced against the finished curve, reproduces its
//! market quote within tolerance; curve dates are strictly increasing and
//! match the instrument maturities in order.
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use meridian_curves::bootstrap::RateBootstrapper;
//! use meridian_curves::instruments::DepositQuote;
//!
//! let base = NaiveDate::from_ymd_opt(2010, 7, 20).unwrap();
//! let curve = RateBootstrapper::new(base)
//!     .add_instrument(Box::new(DepositQuote::act365(
//!         "AUD-Deposit-1M",
//!         base,
//!         NaiveDate::from_ymd_opt(2010, 8, 20).unwrap(),
//!         0.045,
//!     )))
//!     .bootstrap()
//!     .unwrap();
//! assert_eq!(curve.points().len(), 2); // base point + deposit
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
#![allow(clippy::similar_names)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::if_not_else)]
#![allow(clippy::float_cmp)]

pub mod bootstrap;
pub mod curve;
pub mod error;
pub mod instruments;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bootstrap::{
        BootstrapConfig, BondBootstrapper, CapFloorBootstrapper, CreditBootstrapper,
        FxBootstrapper, RateBootstrapper, RateSpreadBootstrapper, SimpleExchangeBootstrapper,
    };
    pub use crate::curve::{
        published_curve_name, CurveInterpolation, CurveValueKind, CurveView, TermCurve,
        TermPoint, TrialCurve,
    };
    pub use crate::error::{CurveError, CurveResult};
    pub use crate::instruments::{
        CapFloorQuote, CreditQuote, DepositQuote, DirectQuote, FutureQuote, FxForwardQuote,
        InstrumentType, PriceableInstrument, SwapQuote,
    };
}

pub use error::{CurveError, CurveResult};
