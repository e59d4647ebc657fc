//! Market inputs for equity pricing: a continuously-compounded zero curve
//! and a discrete dividend schedule.
//!
//! Both are keyed by calendar days from the pricing date and converted to
//! ACT/365 year fractions. Zero rates interpolate linearly in the rate and
//! clamp flat beyond the quoted range.

use meridian_math::interpolation::{Extrapolation, Interpolator, LinearInterpolator};
use serde::{Deserialize, Serialize};

use crate::error::{EquityError, EquityResult};

/// Days per year for the ACT/365 conversions used throughout.
pub const DAY_BASIS: f64 = 365.0;

/// A continuously-compounded zero rate curve quoted at day pillars.
#[derive(Debug, Clone)]
pub struct ZeroRateCurve {
    days: Vec<u32>,
    rates: Vec<f64>,
    // None when a single quote makes the curve flat
    interp: Option<LinearInterpolator>,
}

impl ZeroRateCurve {
    /// Creates a curve from day pillars and zero rates.
    ///
    /// Pillars must be strictly increasing; at least one quote is required.
    pub fn new(days: &[u32], rates: &[f64]) -> EquityResult<Self> {
        if days.is_empty() {
            return Err(EquityError::invalid_parameter(
                "zero curve needs at least one quote",
            ));
        }
        if days.len() != rates.len() {
            return Err(EquityError::invalid_parameter(format!(
                "{} day pillars but {} rates",
                days.len(),
                rates.len()
            )));
        }
        let interp = if days.len() == 1 {
            None
        } else {
            let times: Vec<f64> = days.iter().map(|d| f64::from(*d) / DAY_BASIS).collect();
            Some(
                LinearInterpolator::new(times, rates.to_vec())?
                    .with_extrapolation(Extrapolation::Flat),
            )
        };
        Ok(Self {
            days: days.to_vec(),
            rates: rates.to_vec(),
            interp,
        })
    }

    /// A flat curve at one rate.
    pub fn flat(rate: f64) -> Self {
        Self {
            days: vec![365],
            rates: vec![rate],
            interp: None,
        }
    }

    /// Day pillars of the curve.
    #[must_use]
    pub fn days(&self) -> &[u32] {
        &self.days
    }

    /// The curve with every pillar moved one day closer (floored at zero).
    /// Used by theta bumps.
    #[must_use]
    pub fn shifted_back_one_day(&self) -> Self {
        let days: Vec<u32> = self.days.iter().map(|d| d.saturating_sub(1)).collect();
        // Pillars can collide at zero after the shift; fall back to the
        // first rate as a flat curve in that degenerate case
        Self::new(&days, &self.rates).unwrap_or_else(|_| Self::flat(self.rates[0]))
    }

    /// Zero rate at a year fraction, flat beyond the quoted pillars.
    pub fn zero_rate(&self, t: f64) -> EquityResult<f64> {
        match &self.interp {
            Some(interp) => Ok(interp.interpolate(t)?),
            None => Ok(self.rates[0]),
        }
    }

    /// Continuously-compounded forward rate between two year fractions,
    /// zero when they coincide.
    pub fn forward_rate(&self, t1: f64, t2: f64) -> EquityResult<f64> {
        if (t2 - t1).abs() < f64::EPSILON {
            return Ok(0.0);
        }
        let r1 = self.zero_rate(t1)?;
        let r2 = self.zero_rate(t2)?;
        Ok((r2 * t2 - r1 * t1) / (t2 - t1))
    }

    /// Discount factor between two year fractions.
    pub fn discount_factor(&self, t1: f64, t2: f64) -> EquityResult<f64> {
        let fwd = self.forward_rate(t1, t2)?;
        Ok((-fwd * (t2 - t1)).exp())
    }
}

/// A strip of discrete dividends, each a cash amount at a day offset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DividendSchedule {
    days: Vec<u32>,
    amounts: Vec<f64>,
}

impl DividendSchedule {
    /// Creates a schedule, dropping entries at day zero or earlier.
    pub fn new(days: &[u32], amounts: &[f64]) -> EquityResult<Self> {
        if days.len() != amounts.len() {
            return Err(EquityError::invalid_parameter(format!(
                "{} dividend days but {} amounts",
                days.len(),
                amounts.len()
            )));
        }
        let mut kept_days = Vec::new();
        let mut kept_amounts = Vec::new();
        for (day, amount) in days.iter().zip(amounts) {
            if *day > 0 {
                kept_days.push(*day);
                kept_amounts.push(*amount);
            }
        }
        Ok(Self {
            days: kept_days,
            amounts: kept_amounts,
        })
    }

    /// An empty schedule.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether the schedule carries no dividends.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Dividend payment times as year fractions.
    pub fn times(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.days
            .iter()
            .zip(&self.amounts)
            .map(|(d, a)| (f64::from(*d) / DAY_BASIS, *a))
    }

    /// The schedule with every payment moved one day closer (entries that
    /// reach day zero drop out). Used by theta bumps.
    #[must_use]
    pub fn shifted_back_one_day(&self) -> Self {
        let days: Vec<u32> = self.days.iter().map(|d| d.saturating_sub(1)).collect();
        // Lengths are equal by construction
        Self::new(&days, &self.amounts).unwrap_or_else(|_| Self::none())
    }

    /// Present value, as seen from `t1`, of the dividends paid in `(t1, t2]`.
    pub fn present_value(
        &self,
        curve: &ZeroRateCurve,
        t1: f64,
        t2: f64,
    ) -> EquityResult<f64> {
        let mut pv = 0.0;
        for (time, amount) in self.times() {
            if time > t1 && time <= t2 {
                let fwd = curve.forward_rate(t1, time)?;
                pv += amount * (-fwd * (time - t1)).exp();
            }
        }
        Ok(pv)
    }
}

/// Forward price of the asset at a year fraction: spot less the present
/// value of intervening dividends, grown at the zero rate.
pub fn forward_price(
    spot: f64,
    t: f64,
    curve: &ZeroRateCurve,
    dividends: &DividendSchedule,
) -> EquityResult<f64> {
    let pv_divs = dividends.present_value(curve, 0.0, t)?;
    let rate = curve.zero_rate(t)?;
    Ok((spot - pv_divs) * (rate * t).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_flat_curve_rates() {
        let curve = ZeroRateCurve::flat(0.05);
        assert_relative_eq!(curve.zero_rate(0.25).unwrap(), 0.05);
        assert_relative_eq!(curve.forward_rate(0.5, 1.5).unwrap(), 0.05, epsilon = 1e-12);
        assert_relative_eq!(
            curve.discount_factor(0.0, 2.0).unwrap(),
            (-0.1_f64).exp(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_forward_rate_from_sloped_curve() {
        // 4% at 1y, 5% at 2y: the 1y1y forward is 6%
        let curve = ZeroRateCurve::new(&[365, 730], &[0.04, 0.05]).unwrap();
        assert_relative_eq!(curve.forward_rate(1.0, 2.0).unwrap(), 0.06, epsilon = 1e-10);
    }

    #[test]
    fn test_rates_clamp_beyond_pillars() {
        let curve = ZeroRateCurve::new(&[365, 730], &[0.04, 0.05]).unwrap();
        assert_relative_eq!(curve.zero_rate(10.0).unwrap(), 0.05);
        assert_relative_eq!(curve.zero_rate(0.1).unwrap(), 0.04);
    }

    #[test]
    fn test_coincident_times_give_zero_forward() {
        let curve = ZeroRateCurve::flat(0.05);
        assert_relative_eq!(curve.forward_rate(1.0, 1.0).unwrap(), 0.0);
    }

    #[test]
    fn test_dividend_pv_window() {
        let curve = ZeroRateCurve::flat(0.05);
        let divs = DividendSchedule::new(&[91, 273], &[1.0, 1.5]).unwrap();

        // Only the second dividend falls in (0.5, 1.0]
        let t_div: f64 = 273.0 / 365.0;
        let expected = 1.5 * (-0.05 * (t_div - 0.5)).exp();
        assert_relative_eq!(
            divs.present_value(&curve, 0.5, 1.0).unwrap(),
            expected,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_day_zero_dividends_dropped() {
        let divs = DividendSchedule::new(&[0, 182], &[2.0, 1.0]).unwrap();
        let curve = ZeroRateCurve::flat(0.0);
        assert_relative_eq!(divs.present_value(&curve, 0.0, 1.0).unwrap(), 1.0);
    }

    #[test]
    fn test_forward_price_no_dividends() {
        let curve = ZeroRateCurve::flat(0.05);
        let fwd = forward_price(100.0, 1.0, &curve, &DividendSchedule::none()).unwrap();
        assert_relative_eq!(fwd, 100.0 * 0.05_f64.exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_forward_price_with_dividend() {
        let curve = ZeroRateCurve::flat(0.05);
        let divs = DividendSchedule::new(&[182], &[2.0]).unwrap();
        let t_div: f64 = 182.0 / 365.0;
        let expected = (100.0 - 2.0 * (-0.05 * t_div).exp()) * 0.05_f64.exp();
        assert_relative_eq!(
            forward_price(100.0, 1.0, &curve, &divs).unwrap(),
            expected,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_mismatched_inputs_rejected() {
        assert!(ZeroRateCurve::new(&[365], &[0.04, 0.05]).is_err());
        assert!(ZeroRateCurve::new(&[], &[]).is_err());
        assert!(DividendSchedule::new(&[91], &[1.0, 2.0]).is_err());
    }
}
