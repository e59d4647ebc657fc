//! Survival probability curve bootstrapper.

use chrono::NaiveDate;

use crate::bootstrap::sequential::{extend_curve, sort_by_maturity, standard_quote_error};
use crate::bootstrap::BootstrapConfig;
use crate::curve::{CurveValueKind, TermCurve};
use crate::error::CurveResult;
use crate::instruments::PriceableInstrument;

/// Bootstraps a survival probability curve from credit quotes.
///
/// Survival points are seeded from the flat hazard rate closed form and
/// solved inside a rate-gap bracket around the extrapolated guess, which
/// keeps long-dated names well behaved even when quotes are noisy.
pub struct CreditBootstrapper {
    base_date: NaiveDate,
    instruments: Vec<Box<dyn PriceableInstrument>>,
    config: BootstrapConfig,
}

impl CreditBootstrapper {
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

    /// Runs the bootstrap, producing a survival probability curve.
    pub fn bootstrap(mut self) -> CurveResult<TermCurve> {
        sort_by_maturity(&mut self.instruments);
        let curve = TermCurve::new(self.base_date, CurveValueKind::SurvivalProbability)
            .with_interpolation(self.config.interpolation);
        extend_curve(curve, &self.instruments, &self.config, standard_quote_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::CurveView;
    use crate::instruments::CreditQuote;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_flat_hazard_rates_reprice() {
        let base = date(2025, 1, 1);
        let quotes = [
            ("CDS-1Y", date(2026, 1, 1), 0.0150),
            ("CDS-3Y", date(2028, 1, 1), 0.0185),
            ("CDS-5Y", date(2030, 1, 1), 0.0210),
            ("CDS-10Y", date(2035, 1, 1), 0.0230),
        ];

        let mut builder = CreditBootstrapper::new(base);
        for (id, maturity, hazard) in quotes {
            builder = builder.add_instrument(Box::new(CreditQuote::new(id, maturity, hazard)));
        }
        let curve = builder.bootstrap().unwrap();

        for (id, maturity, hazard) in quotes {
            let quote = CreditQuote::new(id, maturity, hazard);
            assert_relative_eq!(quote.implied_quote(&curve).unwrap(), hazard, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_survival_probabilities_in_unit_interval_and_decreasing() {
        let base = date(2025, 1, 1);
        let curve = CreditBootstrapper::new(base)
            .add_instrument(Box::new(CreditQuote::new("CDS-1Y", date(2026, 1, 1), 0.02)))
            .add_instrument(Box::new(CreditQuote::new("CDS-5Y", date(2030, 1, 1), 0.025)))
            .bootstrap()
            .unwrap();

        let mut prev = 1.0;
        for point in curve.points() {
            assert!(point.value > 0.0 && point.value <= 1.0);
            assert!(point.value <= prev);
            prev = point.value;
        }
    }

    #[test]
    fn test_base_point_is_unit_survival() {
        let base = date(2025, 1, 1);
        let curve = CreditBootstrapper::new(base)
            .add_instrument(Box::new(CreditQuote::new("CDS-1Y", date(2026, 1, 1), 0.02)))
            .bootstrap()
            .unwrap();
        assert_relative_eq!(curve.value(base).unwrap(), 1.0);
    }
}
