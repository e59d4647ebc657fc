//! Priceable instrument quotes.
//!
//! Bootstrappers only ever need a narrow capability from an instrument: its
//! maturity, its normalized market quote, and the quote implied by a curve.
//! [`PriceableInstrument`] is that capability; each asset class implements it
//! as a small quote struct. Instruments with a closed form also expose
//! [`PriceableInstrument::analytic_value`] so the bootstrap can seed a point
//! without calling the solver.

use std::fmt;

use chrono::{Datelike, NaiveDate};

use meridian_core::daycounts::{year_fraction_act360, year_fraction_act365};

use crate::curve::CurveView;
use crate::error::{CurveError, CurveResult};

/// Asset class of a curve instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrumentType {
    /// Cash deposit.
    Deposit,
    /// Interest rate future.
    Future,
    /// Interest rate swap.
    Swap,
    /// Bond quote inserted directly.
    Bond,
    /// Credit instrument quoting a hazard rate.
    Credit,
    /// FX forward.
    FxForward,
    /// Cap or floor volatility quote.
    CapFloor,
    /// Exchange index value inserted directly.
    ExchangeIndex,
}

impl fmt::Display for InstrumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Deposit => "Deposit",
            Self::Future => "Future",
            Self::Swap => "Swap",
            Self::Bond => "Bond",
            Self::Credit => "Credit",
            Self::FxForward => "FxForward",
            Self::CapFloor => "CapFloor",
            Self::ExchangeIndex => "ExchangeIndex",
        };
        write!(f, "{name}")
    }
}

/// Money-market day basis for simple-interest instruments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayBasis {
    /// ACT/365F.
    Act365,
    /// ACT/360.
    Act360,
}

impl DayBasis {
    fn year_fraction(self, start: NaiveDate, end: NaiveDate) -> f64 {
        match self {
            Self::Act365 => year_fraction_act365(start, end),
            Self::Act360 => year_fraction_act360(start, end),
        }
    }
}

/// The capability bootstrappers and objective functions price against.
pub trait PriceableInstrument: Send + Sync {
    /// Instrument identifier, carried onto the curve point it produces.
    fn id(&self) -> &str;

    /// Asset class.
    fn instrument_type(&self) -> InstrumentType;

    /// Risk maturity date; the date of the curve point this instrument pins.
    fn maturity(&self) -> NaiveDate;

    /// Market quote, normalized to a decimal.
    fn market_quote(&self) -> f64;

    /// The quote implied by the given curve.
    fn implied_quote(&self, curve: &dyn CurveView) -> CurveResult<f64>;

    /// Closed-form curve value at maturity, where the asset class has one.
    ///
    /// Returning `Some` lets the bootstrap seed this point analytically
    /// instead of invoking the solver.
    fn analytic_value(&self, curve: &dyn CurveView) -> Option<f64> {
        let _ = curve;
        None
    }
}

/// A cash deposit: simple interest from `start` to `maturity`.
#[derive(Debug, Clone)]
pub struct DepositQuote {
    id: String,
    start: NaiveDate,
    maturity: NaiveDate,
    rate: f64,
    basis: DayBasis,
}

impl DepositQuote {
    /// Creates a deposit on an ACT/365F basis.
    #[must_use]
    pub fn act365(id: impl Into<String>, start: NaiveDate, maturity: NaiveDate, rate: f64) -> Self {
        Self::new(id, start, maturity, rate, DayBasis::Act365)
    }

    /// Creates a deposit on an ACT/360 basis.
    #[must_use]
    pub fn act360(id: impl Into<String>, start: NaiveDate, maturity: NaiveDate, rate: f64) -> Self {
        Self::new(id, start, maturity, rate, DayBasis::Act360)
    }

    /// Creates a deposit with an explicit basis.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        start: NaiveDate,
        maturity: NaiveDate,
        rate: f64,
        basis: DayBasis,
    ) -> Self {
        Self {
            id: id.into(),
            start,
            maturity,
            rate,
            basis,
        }
    }

    fn accrual(&self) -> f64 {
        self.basis.year_fraction(self.start, self.maturity)
    }
}

impl PriceableInstrument for DepositQuote {
    fn id(&self) -> &str {
        &self.id
    }

    fn instrument_type(&self) -> InstrumentType {
        InstrumentType::Deposit
    }

    fn maturity(&self) -> NaiveDate {
        self.maturity
    }

    fn market_quote(&self) -> f64 {
        self.rate
    }

    fn implied_quote(&self, curve: &dyn CurveView) -> CurveResult<f64> {
        let df_start = curve.value(self.start)?;
        let df_end = curve.value(self.maturity)?;
        if df_end <= 0.0 {
            return Err(CurveError::invalid_value(format!(
                "non-positive discount factor at {}",
                self.maturity
            )));
        }
        Ok((df_start / df_end - 1.0) / self.accrual())
    }

    fn analytic_value(&self, curve: &dyn CurveView) -> Option<f64> {
        let df_start = curve.value(self.start).ok()?;
        Some(df_start / (1.0 + self.rate * self.accrual()))
    }
}

/// An interest rate future, quoted as the forward rate over its accrual
/// period.
#[derive(Debug, Clone)]
pub struct FutureQuote {
    id: String,
    start: NaiveDate,
    maturity: NaiveDate,
    rate: f64,
    basis: DayBasis,
}

impl FutureQuote {
    /// Creates a future with the given accrual period and forward rate.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        start: NaiveDate,
        maturity: NaiveDate,
        rate: f64,
        basis: DayBasis,
    ) -> Self {
        Self {
            id: id.into(),
            start,
            maturity,
            rate,
            basis,
        }
    }

    fn accrual(&self) -> f64 {
        self.basis.year_fraction(self.start, self.maturity)
    }
}

impl PriceableInstrument for FutureQuote {
    fn id(&self) -> &str {
        &self.id
    }

    fn instrument_type(&self) -> InstrumentType {
        InstrumentType::Future
    }

    fn maturity(&self) -> NaiveDate {
        self.maturity
    }

    fn market_quote(&self) -> f64 {
        self.rate
    }

    fn implied_quote(&self, curve: &dyn CurveView) -> CurveResult<f64> {
        let df_start = curve.value(self.start)?;
        let df_end = curve.value(self.maturity)?;
        if df_end <= 0.0 {
            return Err(CurveError::invalid_value(format!(
                "non-positive discount factor at {}",
                self.maturity
            )));
        }
        Ok((df_start / df_end - 1.0) / self.accrual())
    }

    fn analytic_value(&self, curve: &dyn CurveView) -> Option<f64> {
        let df_start = curve.value(self.start).ok()?;
        Some(df_start / (1.0 + self.rate * self.accrual()))
    }
}

/// A par interest rate swap on a single curve.
#[derive(Debug, Clone)]
pub struct SwapQuote {
    id: String,
    rate: f64,
    payment_dates: Vec<NaiveDate>,
}

impl SwapQuote {
    /// Creates a swap with annual fixed payments out to `years`.
    #[must_use]
    pub fn annual(id: impl Into<String>, base: NaiveDate, years: u32, rate: f64) -> Self {
        let payment_dates = (1..=years)
            .filter_map(|i| {
                base.with_year(base.year() + i as i32)
                    .or_else(|| base.with_day(28).and_then(|d| d.with_year(base.year() + i as i32)))
            })
            .collect();
        Self {
            id: id.into(),
            rate,
            payment_dates,
        }
    }

    /// Creates a swap with an explicit fixed-leg payment schedule.
    #[must_use]
    pub fn with_schedule(
        id: impl Into<String>,
        payment_dates: Vec<NaiveDate>,
        rate: f64,
    ) -> Self {
        Self {
            id: id.into(),
            rate,
            payment_dates,
        }
    }
}

impl PriceableInstrument for SwapQuote {
    fn id(&self) -> &str {
        &self.id
    }

    fn instrument_type(&self) -> InstrumentType {
        InstrumentType::Swap
    }

    fn maturity(&self) -> NaiveDate {
        self.payment_dates.last().copied().unwrap_or_default()
    }

    fn market_quote(&self) -> f64 {
        self.rate
    }

    fn implied_quote(&self, curve: &dyn CurveView) -> CurveResult<f64> {
        if self.payment_dates.is_empty() {
            return Err(CurveError::invalid_instrument(format!(
                "swap '{}' has no payment schedule",
                self.id
            )));
        }
        // Par rate: (1 - df(T)) / annuity
        let mut annuity = 0.0;
        let mut prev = curve.base_date();
        for &date in &self.payment_dates {
            let accrual = year_fraction_act365(prev, date);
            annuity += accrual * curve.value(date)?;
            prev = date;
        }
        if annuity <= 0.0 {
            return Err(CurveError::invalid_value(format!(
                "non-positive annuity for swap '{}'",
                self.id
            )));
        }
        let df_maturity = curve.value(self.maturity())?;
        Ok((1.0 - df_maturity) / annuity)
    }
}

/// A credit instrument quoting a flat hazard rate to maturity.
#[derive(Debug, Clone)]
pub struct CreditQuote {
    id: String,
    maturity: NaiveDate,
    hazard_rate: f64,
}

impl CreditQuote {
    /// Creates a credit quote.
    #[must_use]
    pub fn new(id: impl Into<String>, maturity: NaiveDate, hazard_rate: f64) -> Self {
        Self {
            id: id.into(),
            maturity,
            hazard_rate,
        }
    }
}

impl PriceableInstrument for CreditQuote {
    fn id(&self) -> &str {
        &self.id
    }

    fn instrument_type(&self) -> InstrumentType {
        InstrumentType::Credit
    }

    fn maturity(&self) -> NaiveDate {
        self.maturity
    }

    fn market_quote(&self) -> f64 {
        self.hazard_rate
    }

    fn implied_quote(&self, curve: &dyn CurveView) -> CurveResult<f64> {
        let t = year_fraction_act365(curve.base_date(), self.maturity);
        let survival = curve.value(self.maturity)?;
        if survival <= 0.0 {
            return Err(CurveError::invalid_value(format!(
                "non-positive survival probability at {}",
                self.maturity
            )));
        }
        Ok(-survival.ln() / t)
    }

    fn analytic_value(&self, curve: &dyn CurveView) -> Option<f64> {
        let t = year_fraction_act365(curve.base_date(), self.maturity);
        Some((-self.hazard_rate * t).exp())
    }
}

/// An FX forward repriced off the domestic discount curve.
///
/// The foreign leg is summarized by its discount factor to maturity, taken
/// from an already-built foreign curve.
#[derive(Debug, Clone)]
pub struct FxForwardQuote {
    id: String,
    maturity: NaiveDate,
    spot: f64,
    foreign_df: f64,
    forward: f64,
}

impl FxForwardQuote {
    /// Creates an FX forward quote.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        maturity: NaiveDate,
        spot: f64,
        foreign_df: f64,
        forward: f64,
    ) -> Self {
        Self {
            id: id.into(),
            maturity,
            spot,
            foreign_df,
            forward,
        }
    }
}

impl PriceableInstrument for FxForwardQuote {
    fn id(&self) -> &str {
        &self.id
    }

    fn instrument_type(&self) -> InstrumentType {
        InstrumentType::FxForward
    }

    fn maturity(&self) -> NaiveDate {
        self.maturity
    }

    fn market_quote(&self) -> f64 {
        self.forward
    }

    fn implied_quote(&self, curve: &dyn CurveView) -> CurveResult<f64> {
        let df = curve.value(self.maturity)?;
        if df <= 0.0 {
            return Err(CurveError::invalid_value(format!(
                "non-positive discount factor at {}",
                self.maturity
            )));
        }
        Ok(self.spot * self.foreign_df / df)
    }

    fn analytic_value(&self, _curve: &dyn CurveView) -> Option<f64> {
        if self.forward <= 0.0 {
            return None;
        }
        Some(self.spot * self.foreign_df / self.forward)
    }
}

/// A cap/floor volatility quote.
///
/// The quote is a flat volatility at the cap's risk maturity; repricing reads
/// the trial volatility curve at that maturity.
#[derive(Debug, Clone)]
pub struct CapFloorQuote {
    id: String,
    maturity: NaiveDate,
    volatility: f64,
    exchange_traded: bool,
}

impl CapFloorQuote {
    /// Creates a cap/floor volatility quote.
    #[must_use]
    pub fn cap(id: impl Into<String>, maturity: NaiveDate, volatility: f64) -> Self {
        Self {
            id: id.into(),
            maturity,
            volatility,
            exchange_traded: false,
        }
    }

    /// Creates an exchange-traded option volatility quote (e.g. a futures
    /// option), which needs no flat fill before it.
    #[must_use]
    pub fn exchange_traded(id: impl Into<String>, maturity: NaiveDate, volatility: f64) -> Self {
        Self {
            id: id.into(),
            maturity,
            volatility,
            exchange_traded: true,
        }
    }

    /// Whether this quote comes from an exchange-traded option.
    #[must_use]
    pub fn is_exchange_traded(&self) -> bool {
        self.exchange_traded
    }

    /// The quoted flat volatility.
    #[must_use]
    pub fn volatility(&self) -> f64 {
        self.volatility
    }
}

impl PriceableInstrument for CapFloorQuote {
    fn id(&self) -> &str {
        &self.id
    }

    fn instrument_type(&self) -> InstrumentType {
        InstrumentType::CapFloor
    }

    fn maturity(&self) -> NaiveDate {
        self.maturity
    }

    fn market_quote(&self) -> f64 {
        self.volatility
    }

    fn implied_quote(&self, curve: &dyn CurveView) -> CurveResult<f64> {
        curve.value(self.maturity)
    }
}

/// A quote whose value is the curve point itself, inserted without solving.
///
/// Covers bond quotes and exchange-index values, whose asset classes yield
/// the curve value in closed form.
#[derive(Debug, Clone)]
pub struct DirectQuote {
    id: String,
    maturity: NaiveDate,
    value: f64,
    instrument_type: InstrumentType,
}

impl DirectQuote {
    /// Creates a bond quote.
    #[must_use]
    pub fn bond(id: impl Into<String>, maturity: NaiveDate, value: f64) -> Self {
        Self {
            id: id.into(),
            maturity,
            value,
            instrument_type: InstrumentType::Bond,
        }
    }

    /// Creates an exchange-index quote.
    #[must_use]
    pub fn exchange_index(id: impl Into<String>, maturity: NaiveDate, value: f64) -> Self {
        Self {
            id: id.into(),
            maturity,
            value,
            instrument_type: InstrumentType::ExchangeIndex,
        }
    }
}

impl PriceableInstrument for DirectQuote {
    fn id(&self) -> &str {
        &self.id
    }

    fn instrument_type(&self) -> InstrumentType {
        self.instrument_type
    }

    fn maturity(&self) -> NaiveDate {
        self.maturity
    }

    fn market_quote(&self) -> f64 {
        self.value
    }

    fn implied_quote(&self, curve: &dyn CurveView) -> CurveResult<f64> {
        curve.value(self.maturity)
    }

    fn analytic_value(&self, _curve: &dyn CurveView) -> Option<f64> {
        Some(self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{CurveValueKind, TermCurve, TermPoint, TrialCurve};
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_deposit_analytic_reprices_to_quote() {
        let base = date(2010, 7, 20);
        let curve = TermCurve::new(base, CurveValueKind::DiscountFactor);
        let deposit = DepositQuote::act365("AUD-Deposit-3M", base, date(2010, 10, 20), 0.045);

        let df = deposit.analytic_value(&curve).unwrap();
        let trial = TrialCurve::new(&curve, deposit.maturity(), df).unwrap();
        let implied = deposit.implied_quote(&trial).unwrap();
        assert_relative_eq!(implied, 0.045, epsilon = 1e-12);
    }

    #[test]
    fn test_swap_par_rate_on_flat_curve() {
        // Flat 5% continuously compounded curve: par rate close to 5%
        let base = date(2025, 1, 1);
        let mut curve = TermCurve::new(base, CurveValueKind::DiscountFactor);
        for i in 1..=5u32 {
            let d = date(2025 + i as i32, 1, 1);
            let t = year_fraction_act365(base, d);
            curve
                .push(TermPoint::new(d, (-0.05 * t).exp()))
                .unwrap();
        }

        let swap = SwapQuote::annual("Swap-5Y", base, 5, 0.05);
        let par = swap.implied_quote(&curve).unwrap();
        assert_relative_eq!(par, 0.05, epsilon = 2e-3);
    }

    #[test]
    fn test_fx_forward_round_trip() {
        let base = date(2025, 1, 1);
        let curve = TermCurve::new(base, CurveValueKind::DiscountFactor);
        let fx = FxForwardQuote::new("AUDUSD-1Y", date(2026, 1, 1), 0.75, 0.96, 0.74);

        let df = fx.analytic_value(&curve).unwrap();
        let trial = TrialCurve::new(&curve, fx.maturity(), df).unwrap();
        assert_relative_eq!(fx.implied_quote(&trial).unwrap(), 0.74, epsilon = 1e-12);
    }

    #[test]
    fn test_credit_analytic_survival() {
        let base = date(2025, 1, 1);
        let curve = TermCurve::new(base, CurveValueKind::SurvivalProbability);
        let credit = CreditQuote::new("CDS-5Y", date(2030, 1, 1), 0.02);

        let survival = credit.analytic_value(&curve).unwrap();
        let trial = TrialCurve::new(&curve, credit.maturity(), survival).unwrap();
        assert_relative_eq!(credit.implied_quote(&trial).unwrap(), 0.02, epsilon = 1e-12);
    }

    #[test]
    fn test_instrument_type_display() {
        assert_eq!(format!("{}", InstrumentType::Deposit), "Deposit");
        assert_eq!(format!("{}", InstrumentType::FxForward), "FxForward");
    }
}
