//! Day count conventions.
//!
//! The bootstrap and volatility code works in year fractions rather than
//! dates, so the only conventions carried here are the two actual/fixed
//! variants the instrument set uses.

use chrono::NaiveDate;

/// Actual day count between two dates.
#[must_use]
pub fn day_count(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// ACT/365F year fraction between two dates.
///
/// The year basis is always 365 days. Used for AUD rates, credit survival
/// curves and the equity pricers' day basis.
#[must_use]
pub fn year_fraction_act365(start: NaiveDate, end: NaiveDate) -> f64 {
    day_count(start, end) as f64 / 365.0
}

/// ACT/360 year fraction between two dates.
///
/// Money-market convention for deposits and FRAs in most USD/EUR markets.
#[must_use]
pub fn year_fraction_act360(start: NaiveDate, end: NaiveDate) -> f64 {
    day_count(start, end) as f64 / 360.0
}
