//! Spread curve bootstrapper.

use crate::bootstrap::sequential::{extend_curve, sort_by_maturity};
use crate::bootstrap::BootstrapConfig;
use crate::curve::{CurveValueKind, TermCurve};
use crate::error::CurveResult;
use crate::instruments::PriceableInstrument;

/// Bootstraps a discount curve quoted as a spread over a base curve.
///
/// Instruments carry the quoted spread as their market quote; the solver
/// drives the difference between the spread-curve-implied quote and the
/// base-curve-implied quote to that spread. The base curve is read-only
/// throughout.
pub struct RateSpreadBootstrapper {
    base_curve: TermCurve,
    instruments: Vec<Box<dyn PriceableInstrument>>,
    config: BootstrapConfig,
}

impl RateSpreadBootstrapper {
    /// Creates a bootstrapper over an already-built base curve.
    ///
    /// The spread curve inherits the base curve's base date.
    #[must_use]
    pub fn new(base_curve: TermCurve) -> Self {
        Self {
            base_curve,
            instruments: Vec::new(),
            config: BootstrapConfig::default(),
        }
    }

    /// Sets the bootstrap configuration.
    #[must_use]
    pub fn with_config(mut self, config: BootstrapConfig) -> Self {
        self.config = config;
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

    /// Runs the bootstrap, producing the spread discount curve.
    pub fn bootstrap(mut self) -> CurveResult<TermCurve> {
        sort_by_maturity(&mut self.instruments);
        let curve = TermCurve::new(self.base_curve.base_date(), CurveValueKind::DiscountFactor)
            .with_interpolation(self.config.interpolation);
        let base_curve = &self.base_curve;
        extend_curve(curve, &self.instruments, &self.config, |instrument, trial| {
            let on_spread = instrument.implied_quote(trial)?;
            let on_base = instrument.implied_quote(base_curve)?;
            Ok(instrument.market_quote() - (on_spread - on_base))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::RateBootstrapper;
    use crate::curve::CurveView;
    use crate::instruments::{DepositQuote, SwapQuote};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn base_curve(base: NaiveDate) -> TermCurve {
        RateBootstrapper::new(base)
            .add_instrument(Box::new(DepositQuote::act365(
                "AUD-Deposit-6M",
                base,
                date(2025, 7, 1),
                0.0450,
            )))
            .add_instrument(Box::new(SwapQuote::annual("AUD-IRSwap-2Y", base, 2, 0.0475)))
            .add_instrument(Box::new(SwapQuote::annual("AUD-IRSwap-5Y", base, 5, 0.0500)))
            .bootstrap()
            .unwrap()
    }

    #[test]
    fn test_spreads_reprice_relative_to_base() {
        let base = date(2025, 1, 1);
        let base_curve = base_curve(base);

        // 20bp spread quotes at the 2Y and 5Y tenors
        let instruments: Vec<Box<dyn PriceableInstrument>> = vec![
            Box::new(SwapQuote::annual("AUD-BasisSwap-2Y", base, 2, 0.0020)),
            Box::new(SwapQuote::annual("AUD-BasisSwap-5Y", base, 5, 0.0020)),
        ];

        let spread_curve = RateSpreadBootstrapper::new(base_curve.clone())
            .add_instruments(vec![
                Box::new(SwapQuote::annual("AUD-BasisSwap-2Y", base, 2, 0.0020)),
                Box::new(SwapQuote::annual("AUD-BasisSwap-5Y", base, 5, 0.0020)),
            ])
            .bootstrap()
            .unwrap();

        for instrument in &instruments {
            let on_spread = instrument.implied_quote(&spread_curve).unwrap();
            let on_base = instrument.implied_quote(&base_curve).unwrap();
            assert!(
                (on_spread - on_base - 0.0020).abs() < 1e-8,
                "{}: spread {} vs quoted 20bp",
                instrument.id(),
                on_spread - on_base
            );
        }
    }

    #[test]
    fn test_positive_spread_lowers_discount_factors() {
        let base = date(2025, 1, 1);
        let base_curve = base_curve(base);
        let spread_curve = RateSpreadBootstrapper::new(base_curve.clone())
            .add_instrument(Box::new(SwapQuote::annual("AUD-BasisSwap-5Y", base, 5, 0.0020)))
            .bootstrap()
            .unwrap();

        let maturity = date(2030, 1, 1);
        assert!(spread_curve.value(maturity).unwrap() < base_curve.value(maturity).unwrap());
    }

    #[test]
    fn test_base_curve_left_untouched() {
        let base = date(2025, 1, 1);
        let base_curve = base_curve(base);
        let before = base_curve.points().to_vec();

        let _ = RateSpreadBootstrapper::new(base_curve.clone())
            .add_instrument(Box::new(SwapQuote::annual("AUD-BasisSwap-2Y", base, 2, 0.0020)))
            .bootstrap()
            .unwrap();

        assert_eq!(base_curve.points(), &before[..]);
    }
}
