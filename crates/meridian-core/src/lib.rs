//! # Meridian Core
//!
//! Core types and conventions for the Meridian analytics library.
//!
//! This crate provides the foundational building blocks used throughout
//! Meridian:
//!
//! - **Tenor labels**: parsing and normalization of period labels ("1D",
//!   "6M", "10Y") and conversion to year fractions
//! - **Day count conventions**: ACT/365F and ACT/360 year fractions
//!
//! ## Design Philosophy
//!
//! - **Explicit Over Implicit**: malformed labels are rejected, not guessed
//! - **Small Surface**: only the primitives the numerical crates share

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::uninlined_format_args)]

pub mod daycounts;
pub mod error;
pub mod tenor;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::daycounts::{year_fraction_act360, year_fraction_act365};
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::tenor::{Tenor, TenorUnit};
}

pub use error::{CoreError, CoreResult};
