//! # Meridian SABR
//!
//! SABR volatility model calibration and implied-volatility queries.
//!
//! This crate provides:
//!
//! - **Model**: the Hagan lognormal implied-volatility expansion over a
//!   validated [`model::SabrParameters`] set
//! - **Engine**: one [`engine::SabrEngine`] per (expiry, tenor) cell, with
//!   full-smile, ATM and surface-interpolated calibration modes
//! - **Session**: a handle-keyed registry of settings, engine collections
//!   and forward rate grids, queried by normalized tenor labels
//!
//! ## Example
//!
//! ```rust
//! use meridian_sabr::engine::{CalibrationSettings, SabrEngine};
//!
//! // Fix nu and rho, solve alpha so the model reprices the ATM vol
//! let settings = CalibrationSettings::new("Swaption", "AUD", 0.85);
//! let mut engine = SabrEngine::atm(settings, 0.4, -0.3, 0.22, 0.05, 2.0).unwrap();
//! engine.calibrate().unwrap();
//! assert!(engine.is_calibrated());
//! assert!(engine.parameters().alpha > 0.0);
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

pub mod engine;
pub mod error;
pub mod grids;
pub mod model;
pub mod session;
pub mod surface;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::engine::{CalibrationSettings, SabrEngine};
    pub use crate::error::{SabrError, SabrResult};
    pub use crate::grids::{ForwardRateGrid, VolatilityGrid};
    pub use crate::model::{implied_volatility, SabrParameters};
    pub use crate::session::{SabrKey, SabrParameter, SabrSession};
    pub use crate::surface::{NuRhoSurface, SurfaceSample};
}

pub use error::{SabrError, SabrResult};
