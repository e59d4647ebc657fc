//! Cap/floor volatility curve bootstrapper.

use chrono::{Days, NaiveDate};
use log::debug;

use crate::bootstrap::sequential::{extend_curve, standard_quote_error};
use crate::bootstrap::BootstrapConfig;
use crate::curve::{CurveInterpolation, CurveValueKind, TermCurve, TermPoint};
use crate::error::CurveResult;
use crate::instruments::{CapFloorQuote, PriceableInstrument};

/// Bootstraps a flat-volatility term curve from cap/floor quotes.
///
/// Volatility curves interpolate linearly on values rather than log-linearly,
/// and have no identity point at the base date.
///
/// When the shortest quote is an OTC cap, the stub between the base date and
/// its maturity is filled with weekly points at the first cap's volatility,
/// so short-expiry lookups do not extrapolate off a single pillar. Quotes
/// from exchange-traded options already cover the short end and suppress the
/// fill.
pub struct CapFloorBootstrapper {
    base_date: NaiveDate,
    quotes: Vec<CapFloorQuote>,
    config: BootstrapConfig,
}

impl CapFloorBootstrapper {
    /// Creates a bootstrapper anchored at the given base date.
    #[must_use]
    pub fn new(base_date: NaiveDate) -> Self {
        Self {
            base_date,
            quotes: Vec::new(),
            config: BootstrapConfig::default().with_interpolation(CurveInterpolation::Linear),
        }
    }

    /// Sets the bootstrap configuration.
    #[must_use]
    pub fn with_config(mut self, config: BootstrapConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds one quote.
    #[must_use]
    pub fn add_quote(mut self, quote: CapFloorQuote) -> Self {
        self.quotes.push(quote);
        self
    }

    /// Adds a batch of quotes.
    #[must_use]
    pub fn add_quotes(mut self, quotes: Vec<CapFloorQuote>) -> Self {
        self.quotes.extend(quotes);
        self
    }

    /// Runs the bootstrap, producing a volatility curve.
    pub fn bootstrap(mut self) -> CurveResult<TermCurve> {
        self.quotes.sort_by_key(|q| q.maturity());

        let mut curve = TermCurve::new(self.base_date, CurveValueKind::Volatility)
            .with_interpolation(self.config.interpolation);

        if let Some(first) = self.quotes.first() {
            if !first.is_exchange_traded() {
                let fill_vol = first.volatility();
                let mut date = self.base_date + Days::new(7);
                let mut filled = 0usize;
                while date < first.maturity() {
                    curve.push(TermPoint::new(date, fill_vol))?;
                    filled += 1;
                    date = date + Days::new(7);
                }
                debug!(
                    "filled {} weekly points at vol {} ahead of '{}'",
                    filled,
                    fill_vol,
                    first.id()
                );
            }
        }

        let instruments: Vec<Box<dyn PriceableInstrument>> = self
            .quotes
            .into_iter()
            .map(|q| Box::new(q) as Box<dyn PriceableInstrument>)
            .collect();
        extend_curve(curve, &instruments, &self.config, standard_quote_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::CurveView;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_otc_caps_get_weekly_fill() {
        let base = date(2025, 1, 1);
        let first_maturity = date(2026, 1, 1);
        let curve = CapFloorBootstrapper::new(base)
            .add_quote(CapFloorQuote::cap("Cap-1Y", first_maturity, 0.22))
            .add_quote(CapFloorQuote::cap("Cap-2Y", date(2027, 1, 1), 0.20))
            .bootstrap()
            .unwrap();

        // 2025 spans 365 days, so weeks 1..=52 all land before the 1Y
        // maturity, plus the two cap pillars themselves.
        assert_eq!(curve.points().len(), 54);
        // Every fill point carries the first cap's vol
        assert_relative_eq!(curve.value(date(2025, 6, 1)).unwrap(), 0.22);
    }

    #[test]
    fn test_exchange_traded_quotes_suppress_fill() {
        let base = date(2025, 1, 1);
        let curve = CapFloorBootstrapper::new(base)
            .add_quote(CapFloorQuote::exchange_traded(
                "IROption-3M",
                date(2025, 4, 1),
                0.25,
            ))
            .add_quote(CapFloorQuote::cap("Cap-1Y", date(2026, 1, 1), 0.22))
            .bootstrap()
            .unwrap();

        assert_eq!(curve.points().len(), 2);
    }

    #[test]
    fn test_quotes_reprice() {
        let base = date(2025, 1, 1);
        let quotes = [
            ("Cap-1Y", date(2026, 1, 1), 0.22),
            ("Cap-2Y", date(2027, 1, 1), 0.205),
            ("Cap-5Y", date(2030, 1, 1), 0.185),
        ];

        let mut builder = CapFloorBootstrapper::new(base);
        for (id, maturity, vol) in quotes {
            builder = builder.add_quote(CapFloorQuote::cap(id, maturity, vol));
        }
        let curve = builder.bootstrap().unwrap();

        for (_, maturity, vol) in quotes {
            assert_relative_eq!(curve.value(maturity).unwrap(), vol, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_linear_interpolation_between_pillars() {
        let base = date(2025, 1, 1);
        let curve = CapFloorBootstrapper::new(base)
            .add_quote(CapFloorQuote::exchange_traded("Opt-1Y", date(2026, 1, 1), 0.20))
            .add_quote(CapFloorQuote::exchange_traded("Opt-2Y", date(2027, 1, 1), 0.30))
            .bootstrap()
            .unwrap();

        let mid = curve.value(date(2026, 7, 2)).unwrap();
        assert_relative_eq!(mid, 0.25, epsilon = 1e-2);
    }
}
