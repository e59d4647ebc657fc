//! The shared sequential bootstrap engine.

use chrono::NaiveDate;
use log::debug;

use meridian_core::daycounts::year_fraction_act365;
use meridian_math::solvers::brent_bracketed;

use crate::bootstrap::BootstrapConfig;
use crate::curve::{TermCurve, TermPoint, TrialCurve};
use crate::error::{CurveError, CurveResult};
use crate::instruments::PriceableInstrument;

/// Sorts instruments ascending by maturity, in place.
pub(crate) fn sort_by_maturity(instruments: &mut [Box<dyn PriceableInstrument>]) {
    instruments.sort_by_key(|instrument| instrument.maturity());
}

/// Extends `curve` with one point per instrument.
///
/// `quote_error` maps (instrument, trial view) to the scalar the solver
/// drives to zero; the plain variants use market quote minus implied quote,
/// the spread variant prices relative to a base curve.
///
/// Instruments must already be sorted by maturity; duplicates are skipped
/// with the first occurrence winning.
pub(crate) fn extend_curve<E>(
    mut curve: TermCurve,
    instruments: &[Box<dyn PriceableInstrument>],
    config: &BootstrapConfig,
    quote_error: E,
) -> CurveResult<TermCurve>
where
    E: Fn(&dyn PriceableInstrument, &TrialCurve<'_>) -> CurveResult<f64>,
{
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

        // Seed: analytic value under flat extrapolation where the asset
        // class has one, else carry the prior point forward.
        let kind = curve.kind();
        let mut guess = instrument
            .analytic_value(&curve)
            .or_else(|| curve.last_value())
            .unwrap_or_else(|| kind.default_seed());
        if !guess.is_finite() || guess <= 0.0 {
            guess = kind.default_seed();
        }

        let trial = TrialCurve::new(&curve, maturity, guess)?;
        let error_at_guess = quote_error(instrument.as_ref(), &trial)?;

        let value = if error_at_guess.abs() < config.tolerance {
            // Fast path: the guess already reprices the instrument
            guess
        } else {
            let t = year_fraction_act365(base_date, maturity);
            let (lo, hi) = kind.solver_bounds(guess, t);
            let objective = |v: f64| {
                let view = trial.with_value(v);
                quote_error(instrument.as_ref(), &view).unwrap_or(f64::NAN)
            };
            let result = brent_bracketed(objective, guess.clamp(lo, hi), lo, hi, &config.solver)
                .map_err(|e| CurveError::bootstrap_failed(instrument.id(), e.to_string()))?;
            debug!(
                "solved '{}' in {} evaluations (residual {:.2e})",
                instrument.id(),
                result.evaluations,
                result.residual
            );
            result.root
        };

        curve.push(TermPoint::with_id(maturity, value, instrument.id()))?;
    }

    Ok(curve)
}

/// The standard objective: market quote minus curve-implied quote.
pub(crate) fn standard_quote_error(
    instrument: &dyn PriceableInstrument,
    trial: &TrialCurve<'_>,
) -> CurveResult<f64> {
    Ok(instrument.market_quote() - instrument.implied_quote(trial)?)
}
