//! Rate curve bootstrapper.

use chrono::NaiveDate;

use crate::bootstrap::sequential::{extend_curve, sort_by_maturity, standard_quote_error};
use crate::bootstrap::BootstrapConfig;
use crate::curve::{CurveValueKind, TermCurve};
use crate::error::CurveResult;
use crate::instruments::PriceableInstrument;

/// Bootstraps a discount factor curve from deposits, futures and swaps.
///
/// # Example
///
/// ```rust
/// use chrono::NaiveDate;
/// use meridian_curves::bootstrap::RateBootstrapper;
/// use meridian_curves::instruments::{DepositQuote, SwapQuote};
///
/// let base = NaiveDate::from_ymd_opt(2010, 7, 20).unwrap();
/// let curve = RateBootstrapper::new(base)
///     .add_instrument(Box::new(DepositQuote::act365(
///         "AUD-Deposit-3M",
///         base,
///         NaiveDate::from_ymd_opt(2010, 10, 20).unwrap(),
///         0.0450,
///     )))
///     .add_instrument(Box::new(SwapQuote::annual("AUD-IRSwap-2Y", base, 2, 0.0475)))
///     .bootstrap()
///     .unwrap();
/// assert_eq!(curve.points().len(), 3);
/// ```
pub struct RateBootstrapper {
    base_date: NaiveDate,
    instruments: Vec<Box<dyn PriceableInstrument>>,
    config: BootstrapConfig,
    name: Option<String>,
}

impl RateBootstrapper {
    /// Creates a bootstrapper anchored at the given base date.
    #[must_use]
    pub fn new(base_date: NaiveDate) -> Self {
        Self {
            base_date,
            instruments: Vec::new(),
            config: BootstrapConfig::default(),
            name: None,
        }
    }

    /// Sets the bootstrap configuration.
    #[must_use]
    pub fn with_config(mut self, config: BootstrapConfig) -> Self {
        self.config = config;
        self
    }

    /// Names the curve being built; see
    /// [`published_curve_name`](crate::curve::published_curve_name) for
    /// the canonical format.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Adds one instrument.
    #[must_use]
    pub fn add_instrument(mut self, instrument: Box<dyn PriceableInstrument>) -> Self {
        self.instruments.push(instrument);
        self
    }

    /// Adds a batch of instruments.
    #[must_use]
    pub fn add_instruments(mut self, instruments: Vec<Box<dyn PriceableInstrument>>) -> Self {
        self.instruments.extend(instruments);
        self
    }

    /// Runs the bootstrap, producing a discount factor curve.
    pub fn bootstrap(mut self) -> CurveResult<TermCurve> {
        sort_by_maturity(&mut self.instruments);
        let mut curve = TermCurve::new(self.base_date, CurveValueKind::DiscountFactor)
            .with_interpolation(self.config.interpolation);
        if let Some(name) = self.name.take() {
            curve = curve.with_name(name);
        }
        extend_curve(curve, &self.instruments, &self.config, standard_quote_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::CurveView;
    use crate::instruments::{DayBasis, DepositQuote, FutureQuote, SwapQuote};
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn aud_swap_instruments(base: NaiveDate) -> Vec<Box<dyn PriceableInstrument>> {
        vec![
            Box::new(DepositQuote::act365(
                "AUD-Deposit-1M",
                base,
                date(2010, 8, 20),
                0.0450,
            )),
            Box::new(DepositQuote::act365(
                "AUD-Deposit-3M",
                base,
                date(2010, 10, 20),
                0.0465,
            )),
            Box::new(DepositQuote::act365(
                "AUD-Deposit-6M",
                base,
                date(2011, 1, 20),
                0.0480,
            )),
            Box::new(FutureQuote::new(
                "AUD-IRFuture-IR-1",
                date(2010, 12, 9),
                date(2011, 3, 9),
                0.0492,
                DayBasis::Act365,
            )),
            Box::new(SwapQuote::annual("AUD-IRSwap-2Y", base, 2, 0.0500)),
            Box::new(SwapQuote::annual("AUD-IRSwap-3Y", base, 3, 0.0512)),
            Box::new(SwapQuote::annual("AUD-IRSwap-5Y", base, 5, 0.0525)),
            Box::new(SwapQuote::annual("AUD-IRSwap-10Y", base, 10, 0.0535)),
            Box::new(SwapQuote::annual("AUD-IRSwap-30Y", base, 30, 0.0539)),
        ]
    }

    #[test]
    fn test_round_trip_repricing() {
        // The defining property: every instrument reprices to its quote
        // against the finished curve.
        let base = date(2010, 7, 20);
        let instruments = aud_swap_instruments(base);
        let quotes: Vec<(String, f64)> = instruments
            .iter()
            .map(|i| (i.id().to_string(), i.market_quote()))
            .collect();

        let curve = RateBootstrapper::new(base)
            .add_instruments(aud_swap_instruments(base))
            .bootstrap()
            .unwrap();

        for (instrument, (id, quote)) in instruments.iter().zip(&quotes) {
            let implied = instrument.implied_quote(&curve).unwrap();
            assert!(
                (implied - quote).abs() < 1e-6,
                "{id}: implied {implied} vs quote {quote}"
            );
        }
    }

    /// The official AUD 6M swap curve snapped 20 July 2010: four deposits,
    /// eight 90-day bank bill futures (second-Friday settlement) and
    /// thirteen swaps, twenty-five quotes in all.
    fn aud_6m_official_quotes(base: NaiveDate) -> Vec<Box<dyn PriceableInstrument>> {
        fn bill(id: &str, settle: NaiveDate, rate: f64) -> Box<dyn PriceableInstrument> {
            Box::new(FutureQuote::new(
                id,
                settle,
                settle + chrono::Duration::days(90),
                rate,
                DayBasis::Act365,
            ))
        }
        fn swap(years: u32, base: NaiveDate, rate: f64) -> Box<dyn PriceableInstrument> {
            Box::new(SwapQuote::annual(format!("AUD-IRSwap-{years}Y"), base, years, rate))
        }

        vec![
            Box::new(DepositQuote::act365("AUD-Deposit-1D", base, date(2010, 7, 21), 0.045)),
            Box::new(DepositQuote::act365("AUD-Deposit-1M", base, date(2010, 8, 20), 0.0474)),
            Box::new(DepositQuote::act365("AUD-Deposit-2M", base, date(2010, 9, 20), 0.0482)),
            Box::new(DepositQuote::act365("AUD-Deposit-88D", base, date(2010, 10, 16), 0.0483)),
            bill("AUD-IRFuture-IR-U0", date(2010, 9, 10), 0.04815),
            bill("AUD-IRFuture-IR-Z0", date(2010, 12, 10), 0.04765),
            bill("AUD-IRFuture-IR-H1", date(2011, 3, 11), 0.04765),
            bill("AUD-IRFuture-IR-M1", date(2011, 6, 10), 0.0481),
            bill("AUD-IRFuture-IR-U1", date(2011, 9, 9), 0.0487),
            bill("AUD-IRFuture-IR-Z1", date(2011, 12, 9), 0.04945),
            bill("AUD-IRFuture-IR-H2", date(2012, 3, 9), 0.0498),
            bill("AUD-IRFuture-IR-M2", date(2012, 6, 8), 0.0499),
            swap(3, base, 0.049075),
            swap(4, base, 0.051225),
            swap(5, base, 0.05235),
            swap(7, base, 0.054475),
            swap(10, base, 0.05595),
            swap(15, base, 0.05715),
            swap(20, base, 0.05665),
            swap(25, base, 0.0554),
            swap(26, base, 0.0551),
            swap(27, base, 0.0548),
            swap(28, base, 0.0545),
            swap(29, base, 0.0542),
            swap(30, base, 0.0539),
        ]
    }

    #[test]
    fn test_aud_6m_official_curve() {
        let base = date(2010, 7, 20);
        let instruments = aud_6m_official_quotes(base);
        assert_eq!(instruments.len(), 25);

        let name = crate::curve::published_curve_name(
            "LiveTest",
            "AUDSwap",
            "6M",
            "Official",
            "SydSwapDesk",
            base,
        );
        let curve = RateBootstrapper::new(base)
            .with_config(BootstrapConfig::default().with_tolerance(1e-8))
            .with_name(name)
            .add_instruments(aud_6m_official_quotes(base))
            .bootstrap()
            .unwrap();

        assert_eq!(
            curve.name(),
            Some("LiveTest.AUDSwap.6M.Official.SydSwapDesk.20/07/2010")
        );
        // Base point plus one per quote
        assert_eq!(curve.points().len(), 26);

        // Every quote reprices against the finished curve within tolerance
        for instrument in &instruments {
            let implied = instrument.implied_quote(&curve).unwrap();
            assert!(
                (implied - instrument.market_quote()).abs() < 1e-8,
                "{}: implied {implied} vs quote {}",
                instrument.id(),
                instrument.market_quote()
            );
        }

        for pair in curve.points().windows(2) {
            assert!(pair[0].date < pair[1].date);
            assert!(pair[1].value < pair[0].value);
        }
    }

    #[test]
    fn test_dates_strictly_increasing() {
        let base = date(2010, 7, 20);
        let curve = RateBootstrapper::new(base)
            .add_instruments(aud_swap_instruments(base))
            .bootstrap()
            .unwrap();

        let points = curve.points();
        // Base point plus one per instrument
        assert_eq!(points.len(), 10);
        for pair in points.windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let base = date(2010, 7, 20);
        let curve = RateBootstrapper::new(base)
            .add_instrument(Box::new(SwapQuote::annual("AUD-IRSwap-5Y", base, 5, 0.0525)))
            .add_instrument(Box::new(DepositQuote::act365(
                "AUD-Deposit-3M",
                base,
                date(2010, 10, 20),
                0.0465,
            )))
            .bootstrap()
            .unwrap();

        assert_eq!(curve.points()[1].instrument_id.as_deref(), Some("AUD-Deposit-3M"));
    }

    #[test]
    fn test_duplicate_maturity_first_wins() {
        let base = date(2010, 7, 20);
        let maturity = date(2010, 10, 20);
        let curve = RateBootstrapper::new(base)
            .add_instrument(Box::new(DepositQuote::act365(
                "AUD-Deposit-3M",
                base,
                maturity,
                0.0465,
            )))
            .add_instrument(Box::new(DepositQuote::act365(
                "AUD-Deposit-3M-dup",
                base,
                maturity,
                0.0490,
            )))
            .bootstrap()
            .unwrap();

        assert_eq!(curve.points().len(), 2);
        assert_eq!(curve.points()[1].instrument_id.as_deref(), Some("AUD-Deposit-3M"));
    }

    #[test]
    fn test_maturity_before_base_rejected() {
        let base = date(2010, 7, 20);
        let result = RateBootstrapper::new(base)
            .add_instrument(Box::new(DepositQuote::act365(
                "stale",
                date(2010, 1, 1),
                date(2010, 4, 1),
                0.045,
            )))
            .bootstrap();
        assert!(matches!(
            result,
            Err(crate::error::CurveError::MaturityNotAfterBase { .. })
        ));
    }

    #[test]
    fn test_discount_factors_decreasing_for_positive_rates() {
        let base = date(2010, 7, 20);
        let curve = RateBootstrapper::new(base)
            .add_instruments(aud_swap_instruments(base))
            .bootstrap()
            .unwrap();

        for pair in curve.points().windows(2) {
            assert!(
                pair[1].value < pair[0].value,
                "discount factors should decrease with maturity"
            );
        }
    }

    #[test]
    fn test_deposit_seeds_analytically() {
        // A single deposit should never need the solver; the analytic seed
        // reprices exactly.
        let base = date(2010, 7, 20);
        let maturity = date(2010, 10, 20);
        let curve = RateBootstrapper::new(base)
            .add_instrument(Box::new(DepositQuote::act365(
                "AUD-Deposit-3M",
                base,
                maturity,
                0.0465,
            )))
            .bootstrap()
            .unwrap();

        let t = meridian_core::daycounts::year_fraction_act365(base, maturity);
        assert_relative_eq!(
            curve.value(maturity).unwrap(),
            1.0 / (1.0 + 0.0465 * t),
            epsilon = 1e-12
        );
    }
}
