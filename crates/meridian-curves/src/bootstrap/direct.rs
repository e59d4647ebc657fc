//! Direct-insertion bootstrappers.
//!
//! Bond and exchange-index quotes yield the curve value in closed form, so
//! these builders skip the solver entirely: sort, drop duplicate maturities,
//! insert.

use chrono::NaiveDate;
use log::debug;

use crate::bootstrap::BootstrapConfig;
use crate::curve::{CurveValueKind, TermCurve, TermPoint};
use crate::error::{CurveError, CurveResult};
use crate::instruments::PriceableInstrument;

fn insert_directly(
    mut curve: TermCurve,
    mut instruments: Vec<Box<dyn PriceableInstrument>>,
) -> CurveResult<TermCurve> {
    instruments.sort_by_key(|instrument| instrument.maturity());

    let base_date = curve.base_date();
    let mut last_maturity: Option<NaiveDate> = None;
    for instrument in instruments {
        let maturity = instrument.maturity();
        if maturity <= base_date {
            return Err(CurveError::MaturityNotAfterBase {
                id: instrument.id().to_string(),
                maturity,
                base: base_date,
            });
        }
        if last_maturity == Some(maturity) {
            debug!(
                "skipping '{}': duplicate maturity {}",
                instrument.id(),
                maturity
            );
            continue;
        }
        last_maturity = Some(maturity);

        let value = instrument
            .analytic_value(&curve)
            .unwrap_or_else(|| instrument.market_quote());
        curve.push(TermPoint::with_id(maturity, value, instrument.id()))?;
    }
    Ok(curve)
}

/// Builds a discount curve from bond quotes inserted directly.
pub struct BondBootstrapper {
    base_date: NaiveDate,
    instruments: Vec<Box<dyn PriceableInstrument>>,
    config: BootstrapConfig,
}

impl BondBootstrapper {
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

    /// Builds the curve.
    pub fn bootstrap(self) -> CurveResult<TermCurve> {
        let curve = TermCurve::new(self.base_date, CurveValueKind::DiscountFactor)
            .with_interpolation(self.config.interpolation);
        insert_directly(curve, self.instruments)
    }
}

/// Builds an index-value curve from exchange quotes inserted directly.
pub struct SimpleExchangeBootstrapper {
    base_date: NaiveDate,
    instruments: Vec<Box<dyn PriceableInstrument>>,
    config: BootstrapConfig,
}

impl SimpleExchangeBootstrapper {
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

    /// Builds the curve.
    pub fn bootstrap(self) -> CurveResult<TermCurve> {
        let curve = TermCurve::new(self.base_date, CurveValueKind::IndexValue)
            .with_interpolation(self.config.interpolation);
        insert_directly(curve, self.instruments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{CurveInterpolation, CurveView};
    use crate::instruments::DirectQuote;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_bond_values_inserted_verbatim() {
        let base = date(2025, 1, 1);
        let curve = BondBootstrapper::new(base)
            .add_instrument(Box::new(DirectQuote::bond("Bond-2Y", date(2027, 1, 1), 0.91)))
            .add_instrument(Box::new(DirectQuote::bond("Bond-1Y", date(2026, 1, 1), 0.955)))
            .bootstrap()
            .unwrap();

        assert_relative_eq!(curve.value(date(2026, 1, 1)).unwrap(), 0.955);
        assert_relative_eq!(curve.value(date(2027, 1, 1)).unwrap(), 0.91);
        // Sorted despite reversed insertion order
        assert_eq!(curve.points()[1].instrument_id.as_deref(), Some("Bond-1Y"));
    }

    #[test]
    fn test_exchange_index_curve_has_no_base_point() {
        let base = date(2025, 1, 1);
        let curve = SimpleExchangeBootstrapper::new(base)
            .with_config(
                BootstrapConfig::default().with_interpolation(CurveInterpolation::Linear),
            )
            .add_instrument(Box::new(DirectQuote::exchange_index(
                "XJO-Mar",
                date(2025, 3, 20),
                4550.0,
            )))
            .add_instrument(Box::new(DirectQuote::exchange_index(
                "XJO-Jun",
                date(2025, 6, 19),
                4580.0,
            )))
            .bootstrap()
            .unwrap();

        assert_eq!(curve.points().len(), 2);
        assert_relative_eq!(curve.value(date(2025, 3, 20)).unwrap(), 4550.0);
    }

    #[test]
    fn test_duplicate_maturities_skipped() {
        let base = date(2025, 1, 1);
        let maturity = date(2026, 1, 1);
        let curve = BondBootstrapper::new(base)
            .add_instrument(Box::new(DirectQuote::bond("Bond-1Y", maturity, 0.955)))
            .add_instrument(Box::new(DirectQuote::bond("Bond-1Y-dup", maturity, 0.960)))
            .bootstrap()
            .unwrap();

        assert_eq!(curve.points().len(), 2);
        assert_relative_eq!(curve.value(maturity).unwrap(), 0.955);
    }
}
