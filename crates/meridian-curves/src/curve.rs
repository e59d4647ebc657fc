//! Term curves: ordered (date, value) term structures.
//!
//! A [`TermCurve`] is the finished product of a bootstrap; a [`TrialCurve`]
//! is the read-only view an objective function prices against while the
//! solver varies the provisional last point. The trial value lives in the
//! view, not in the curve, so concurrent evaluations can never corrupt the
//! confirmed points.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use meridian_core::daycounts::year_fraction_act365;
use meridian_math::interpolation::{CubicSpline, Interpolator};

use crate::error::{CurveError, CurveResult};

/// Rate-gap constant bounding the survival-probability solver bracket.
pub const CREDIT_RATE_GAP: f64 = 0.015;

/// What the values on a curve mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveValueKind {
    /// Discount factors; base date carries 1.0.
    DiscountFactor,
    /// Survival probabilities; base date carries 1.0.
    SurvivalProbability,
    /// Volatilities; no base-date identity point.
    Volatility,
    /// Index or price levels inserted directly; no base-date identity point.
    IndexValue,
}

impl CurveValueKind {
    /// Identity value at the base date, if this kind has one.
    #[must_use]
    pub fn identity_value(self) -> Option<f64> {
        match self {
            Self::DiscountFactor | Self::SurvivalProbability => Some(1.0),
            Self::Volatility | Self::IndexValue => None,
        }
    }

    /// Default seed for the first point when no analytic value exists.
    #[must_use]
    pub fn default_seed(self) -> f64 {
        match self {
            Self::DiscountFactor | Self::SurvivalProbability => 0.9,
            Self::Volatility => 0.2,
            Self::IndexValue => 1.0,
        }
    }

    /// Solver bracket for a point of this kind.
    ///
    /// Discount factors and volatilities use wide fixed bounds. Survival
    /// probabilities are bracketed tightly around the extrapolated guess by
    /// a rate-gap heuristic: `guess * exp(±gap * t)` with the ACT/365 year
    /// fraction `t`, which keeps the search stable for long-dated names.
    #[must_use]
    pub fn solver_bounds(self, guess: f64, t: f64) -> (f64, f64) {
        match self {
            Self::DiscountFactor | Self::Volatility => (1e-9, 2.0),
            Self::IndexValue => (1e-9, 1e9),
            Self::SurvivalProbability => {
                let lo = (guess * (-CREDIT_RATE_GAP * t).exp()).max(1e-9);
                let hi = guess * (CREDIT_RATE_GAP * t).exp();
                (lo, hi)
            }
        }
    }
}

/// Interpolation scheme over curve values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CurveInterpolation {
    /// Straight-line interpolation on values.
    Linear,
    /// Straight-line interpolation on log-values; the usual choice for
    /// discount factors and survival probabilities.
    #[default]
    LogLinear,
    /// Natural cubic spline on values. Needs at least three pillars;
    /// curves with fewer fall back to straight-line segments, as does the
    /// provisional extension segment during a bootstrap.
    CubicSpline,
}

/// A single (date, value) pair on a curve, tagged with the instrument that
/// produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermPoint {
    /// Date of the point.
    pub date: NaiveDate,
    /// Curve value at the date.
    pub value: f64,
    /// Identifier of the originating instrument, if any.
    pub instrument_id: Option<String>,
}

impl TermPoint {
    /// Creates an untagged term point.
    #[must_use]
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            value,
            instrument_id: None,
        }
    }

    /// Creates a term point tagged with an instrument id.
    #[must_use]
    pub fn with_id(date: NaiveDate, value: f64, id: impl Into<String>) -> Self {
        Self {
            date,
            value,
            instrument_id: Some(id.into()),
        }
    }
}

/// Read-only pricing interface handed to objective functions.
pub trait CurveView {
    /// The curve base date.
    fn base_date(&self) -> NaiveDate;

    /// Curve value at a date.
    fn value(&self, date: NaiveDate) -> CurveResult<f64>;
}

/// An ordered term structure of curve points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermCurve {
    base_date: NaiveDate,
    kind: CurveValueKind,
    interpolation: CurveInterpolation,
    #[serde(default)]
    name: Option<String>,
    points: Vec<TermPoint>,
    ts: Vec<f64>,
}

impl TermCurve {
    /// Creates an empty curve, seeding the base-date identity point for
    /// discount-factor and survival curves.
    #[must_use]
    pub fn new(base_date: NaiveDate, kind: CurveValueKind) -> Self {
        let mut curve = Self {
            base_date,
            kind,
            interpolation: CurveInterpolation::default(),
            name: None,
            points: Vec::new(),
            ts: Vec::new(),
        };
        if let Some(identity) = kind.identity_value() {
            curve.points.push(TermPoint::new(base_date, identity));
            curve.ts.push(0.0);
        }
        curve
    }

    /// Sets the interpolation scheme.
    #[must_use]
    pub fn with_interpolation(mut self, interpolation: CurveInterpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Sets the published name of the curve.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The published name, if one was set.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Appends a point; its date must be strictly after the last point's.
    pub fn push(&mut self, point: TermPoint) -> CurveResult<()> {
        if let Some(last) = self.points.last() {
            if point.date <= last.date {
                return Err(CurveError::non_monotonic_dates(
                    self.points.len(),
                    last.date,
                    point.date,
                ));
            }
        }
        if !point.value.is_finite() {
            return Err(CurveError::invalid_value(format!(
                "non-finite curve value at {}",
                point.date
            )));
        }
        self.ts.push(year_fraction_act365(self.base_date, point.date));
        self.points.push(point);
        Ok(())
    }

    /// The confirmed points, base-date point included where applicable.
    #[must_use]
    pub fn points(&self) -> &[TermPoint] {
        &self.points
    }

    /// The curve base date.
    #[must_use]
    pub fn base_date(&self) -> NaiveDate {
        self.base_date
    }

    /// The value kind of this curve.
    #[must_use]
    pub fn kind(&self) -> CurveValueKind {
        self.kind
    }

    /// The interpolation scheme in effect.
    #[must_use]
    pub fn interpolation(&self) -> CurveInterpolation {
        self.interpolation
    }

    /// Date of the last confirmed point, if any.
    #[must_use]
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Value of the last confirmed point, if any.
    #[must_use]
    pub fn last_value(&self) -> Option<f64> {
        self.points.last().map(|p| p.value)
    }

    /// Curve value at an ACT/365 year fraction from the base date.
    ///
    /// Queries outside the pillar range are clamped flat to the nearest
    /// endpoint, the behavior the sequential bootstrap relies on when
    /// extrapolating a guess for the next maturity.
    pub fn value_at(&self, t: f64) -> CurveResult<f64> {
        let n = self.points.len();
        if n == 0 {
            return Err(CurveError::insufficient_points(1, 0));
        }
        if t <= self.ts[0] {
            return Ok(self.points[0].value);
        }
        if t >= self.ts[n - 1] {
            return Ok(self.points[n - 1].value);
        }

        if self.interpolation == CurveInterpolation::CubicSpline && n >= 3 {
            // Rebuilt per lookup: pillars move while a bootstrap extends
            // the curve
            let values: Vec<f64> = self.points.iter().map(|p| p.value).collect();
            let spline = CubicSpline::new(self.ts.clone(), values)?;
            return Ok(spline.interpolate(t)?);
        }

        // Find the segment containing t
        let i = match self
            .ts
            .binary_search_by(|probe| probe.partial_cmp(&t).unwrap_or(std::cmp::Ordering::Equal))
        {
            Ok(i) => return Ok(self.points[i].value),
            Err(i) => i - 1,
        };
        interp_segment(
            self.ts[i],
            self.points[i].value,
            self.ts[i + 1],
            self.points[i + 1].value,
            t,
            self.interpolation,
        )
    }
}

impl CurveView for TermCurve {
    fn base_date(&self) -> NaiveDate {
        self.base_date
    }

    fn value(&self, date: NaiveDate) -> CurveResult<f64> {
        self.value_at(year_fraction_act365(self.base_date, date))
    }
}

/// Confirmed points plus one provisional point, as seen by an objective
/// function while the solver varies the provisional value.
#[derive(Debug, Clone, Copy)]
pub struct TrialCurve<'a> {
    curve: &'a TermCurve,
    trial_t: f64,
    trial_value: f64,
}

impl<'a> TrialCurve<'a> {
    /// Creates a trial view with a provisional point at `date`.
    ///
    /// The provisional date must lie strictly after the last confirmed point.
    pub fn new(curve: &'a TermCurve, date: NaiveDate, value: f64) -> CurveResult<Self> {
        if let Some(last) = curve.last_date() {
            if date <= last {
                return Err(CurveError::non_monotonic_dates(
                    curve.points().len(),
                    last,
                    date,
                ));
            }
        }
        Ok(Self {
            curve,
            trial_t: year_fraction_act365(curve.base_date, date),
            trial_value: value,
        })
    }

    /// Replaces the provisional value, keeping the date.
    #[must_use]
    pub fn with_value(mut self, value: f64) -> Self {
        self.trial_value = value;
        self
    }

    /// The provisional value under test.
    #[must_use]
    pub fn trial_value(&self) -> f64 {
        self.trial_value
    }
}

impl CurveView for TrialCurve<'_> {
    fn base_date(&self) -> NaiveDate {
        self.curve.base_date
    }

    fn value(&self, date: NaiveDate) -> CurveResult<f64> {
        let t = year_fraction_act365(self.curve.base_date, date);
        if t >= self.trial_t {
            // Flat beyond the provisional point
            return Ok(self.trial_value);
        }
        let n = self.curve.points.len();
        if n == 0 {
            return Ok(self.trial_value);
        }
        let last_t = self.curve.ts[n - 1];
        if t > last_t {
            return interp_segment(
                last_t,
                self.curve.points[n - 1].value,
                self.trial_t,
                self.trial_value,
                t,
                self.curve.interpolation,
            );
        }
        self.curve.value_at(t)
    }
}

/// Builds the canonical published curve name:
/// `Market.Index.Tenor.Validity.Source.dd/mm/yyyy`.
#[must_use]
pub fn published_curve_name(
    market: &str,
    index: &str,
    tenor: &str,
    validity: &str,
    source: &str,
    base_date: NaiveDate,
) -> String {
    format!(
        "{market}.{index}.{tenor}.{validity}.{source}.{}",
        base_date.format("%d/%m/%Y")
    )
}

/// Interpolates between two pillars.
fn interp_segment(
    t0: f64,
    v0: f64,
    t1: f64,
    v1: f64,
    t: f64,
    interpolation: CurveInterpolation,
) -> CurveResult<f64> {
    let w = (t - t0) / (t1 - t0);
    match interpolation {
        // Two pillars define no cubic; the spline scheme degrades to a
        // straight segment here
        CurveInterpolation::Linear | CurveInterpolation::CubicSpline => Ok(v0 + w * (v1 - v0)),
        CurveInterpolation::LogLinear => {
            if v0 <= 0.0 || v1 <= 0.0 {
                return Err(CurveError::invalid_value(
                    "log-linear interpolation requires positive values",
                ));
            }
            Ok((v0.ln() + w * (v1.ln() - v0.ln())).exp())
        }
    }
}
