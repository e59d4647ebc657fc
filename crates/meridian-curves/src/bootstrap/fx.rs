//! FX-implied discount curve bootstrapper.

use chrono::NaiveDate;

use crate::bootstrap::sequential::{extend_curve, sort_by_maturity, standard_quote_error};
use crate::bootstrap::BootstrapConfig;
use crate::curve::{CurveValueKind, TermCurve};
use crate::error::CurveResult;
use crate::instruments::PriceableInstrument;

/// Bootstraps a domestic discount curve implied by FX forwards.
///
/// Each forward pins the domestic discount factor at its maturity via
/// covered interest parity, with the foreign leg summarized by the foreign
/// discount factor carried on the quote.
pub struct FxBootstrapper {
    base_date: NaiveDate,
    instruments: Vec<Box<dyn PriceableInstrument>>,
    config: BootstrapConfig,
}

impl FxBootstrapper {
    /// Creates a bootstrapper anchored at the given base date.
    #[must_use]
    pub fn new(base_date: NaiveDate) -> Self {
        Self {
            base_date,
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

    /// Runs the bootstrap, producing a discount factor curve.
    pub fn bootstrap(mut self) -> CurveResult<TermCurve> {
        sort_by_maturity(&mut self.instruments);
        let curve = TermCurve::new(self.base_date, CurveValueKind::DiscountFactor)
            .with_interpolation(self.config.interpolation);
        extend_curve(curve, &self.instruments, &self.config, standard_quote_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::CurveView;
    use crate::instruments::FxForwardQuote;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_forwards_reprice() {
        let base = date(2025, 1, 1);
        let spot = 0.7500;
        let quotes = [
            ("AUDUSD-6M", date(2025, 7, 1), 0.9800, 0.7480),
            ("AUDUSD-1Y", date(2026, 1, 1), 0.9600, 0.7455),
            ("AUDUSD-2Y", date(2027, 1, 1), 0.9230, 0.7410),
        ];

        let mut builder = FxBootstrapper::new(base);
        for (id, maturity, foreign_df, forward) in quotes {
            builder = builder.add_instrument(Box::new(FxForwardQuote::new(
                id, maturity, spot, foreign_df, forward,
            )));
        }
        let curve = builder.bootstrap().unwrap();

        for (id, maturity, foreign_df, forward) in quotes {
            let quote = FxForwardQuote::new(id, maturity, spot, foreign_df, forward);
            assert_relative_eq!(quote.implied_quote(&curve).unwrap(), forward, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_analytic_seed_matches_parity() {
        // spot * foreign_df / forward gives the domestic discount factor
        // directly; the solver never needs to run.
        let base = date(2025, 1, 1);
        let maturity = date(2026, 1, 1);
        let curve = FxBootstrapper::new(base)
            .add_instrument(Box::new(FxForwardQuote::new(
                "AUDUSD-1Y", maturity, 0.75, 0.96, 0.74,
            )))
            .bootstrap()
            .unwrap();

        assert_relative_eq!(
            curve.value(maturity).unwrap(),
            0.75 * 0.96 / 0.74,
            epsilon = 1e-12
        );
    }
}
