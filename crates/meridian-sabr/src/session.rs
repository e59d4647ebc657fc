//! Handle-keyed calibration session.
//!
//! A session owns three stores, each keyed by a caller-chosen handle:
//! calibration settings, engine collections, and the forward rate grid a
//! collection was calibrated against. Re-running a calibration under an
//! existing handle replaces what was stored there.
//!
//! Engine collections are ordered maps keyed by [`SabrKey`], so iteration
//! walks expiries and tenors in increasing year order regardless of the
//! label spelling the caller used.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use log::{debug, warn};

use meridian_core::tenor::Tenor;

use crate::engine::{CalibrationSettings, SabrEngine};
use crate::error::{SabrError, SabrResult};
use crate::grids::{ForwardRateGrid, VolatilityGrid};
use crate::model::implied_volatility;
use crate::surface::{NuRhoSurface, SurfaceSample};

/// Tenor label standing in for "no underlying" on ATM engines.
const ATM_DEFAULT_TENOR: &str = "0D";

/// An (expiry, tenor) key within an engine collection.
///
/// Keys order by year fraction first, so `"18M"` sorts between `"1Y"` and
/// `"2Y"`; labels only break exact year-fraction ties. Lookups normalize
/// the label spelling, so `" 2 y "` finds an engine stored under `"2Y"`.
#[derive(Debug, Clone)]
pub struct SabrKey {
    expiry: String,
    tenor: String,
    expiry_years: f64,
    tenor_years: f64,
}

impl SabrKey {
    /// Builds a key from expiry and tenor labels.
    pub fn new(expiry: &str, tenor: &str) -> SabrResult<Self> {
        let expiry = Tenor::parse(expiry)?;
        let tenor = Tenor::parse(tenor)?;
        Ok(Self {
            expiry_years: expiry.years(),
            tenor_years: tenor.years(),
            expiry: expiry.label(),
            tenor: tenor.label(),
        })
    }

    /// Normalized expiry label.
    #[must_use]
    pub fn expiry(&self) -> &str {
        &self.expiry
    }

    /// Normalized tenor label.
    #[must_use]
    pub fn tenor(&self) -> &str {
        &self.tenor
    }

    /// Expiry as a year fraction.
    #[must_use]
    pub fn expiry_years(&self) -> f64 {
        self.expiry_years
    }

    /// Tenor as a year fraction.
    #[must_use]
    pub fn tenor_years(&self) -> f64 {
        self.tenor_years
    }
}

impl Ord for SabrKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.expiry_years
            .total_cmp(&other.expiry_years)
            .then(self.tenor_years.total_cmp(&other.tenor_years))
            .then_with(|| self.expiry.cmp(&other.expiry))
            .then_with(|| self.tenor.cmp(&other.tenor))
    }
}

impl PartialOrd for SabrKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SabrKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SabrKey {}

/// Selects one of the four SABR parameters in queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SabrParameter {
    /// Overall volatility level.
    Alpha,
    /// CEV exponent.
    Beta,
    /// Volatility of volatility.
    Nu,
    /// Spot/volatility correlation.
    Rho,
}

/// Handle-keyed stores for settings, engine collections and forward grids.
#[derive(Debug, Default)]
pub struct SabrSession {
    settings: HashMap<String, CalibrationSettings>,
    engines: HashMap<String, BTreeMap<SabrKey, SabrEngine>>,
    forward_grids: HashMap<String, ForwardRateGrid>,
}

impl SabrSession {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores calibration settings under a handle, replacing any previous
    /// settings stored there.
    pub fn add_calibration_settings(
        &mut self,
        handle: impl Into<String>,
        settings: CalibrationSettings,
    ) {
        self.settings.insert(handle.into(), settings);
    }

    /// The settings stored under a handle.
    pub fn settings(&self, handle: &str) -> SabrResult<&CalibrationSettings> {
        self.settings
            .get(handle)
            .ok_or_else(|| SabrError::unknown_handle(handle))
    }

    /// Calibrates a full engine collection from a volatility grid and a
    /// forward rate grid, storing both under `engine_handle`.
    ///
    /// Each tenor row of the volatility grid yields one engine. Rows with
    /// a non-positive volatility are skipped, as are rows whose tenor has
    /// no forward level on the grid. Returns the number of engines built.
    pub fn calibrate_model(
        &mut self,
        engine_handle: &str,
        settings_handle: &str,
        volatility_grid: &VolatilityGrid,
        forward_grid: ForwardRateGrid,
    ) -> SabrResult<usize> {
        let settings = self.settings(settings_handle)?.clone();
        let expiry = volatility_grid.expiry().to_string();
        let exercise_time = Tenor::parse(&expiry)?.years();

        let mut collection = BTreeMap::new();
        for (row, tenor) in volatility_grid.tenors().iter().enumerate() {
            let volatilities = volatility_grid.volatilities(row);
            if volatilities.iter().any(|v| *v <= 0.0) {
                warn!(
                    "skipping ({}, {}): volatility row contains a non-positive quote",
                    expiry, tenor
                );
                continue;
            }
            let Some(asset_price) = forward_grid.asset_price(&expiry, tenor) else {
                warn!(
                    "skipping ({}, {}): no forward level on the grid",
                    expiry, tenor
                );
                continue;
            };

            let strikes: Vec<f64> = volatility_grid
                .strike_offsets()
                .iter()
                .map(|offset| asset_price + offset)
                .collect();
            let mut engine = SabrEngine::full(
                settings.clone(),
                strikes,
                volatilities.to_vec(),
                asset_price,
                exercise_time,
            )?;
            engine.calibrate()?;
            debug!(
                "calibrated ({}, {}): error {:.3e}, converged {}",
                expiry,
                tenor,
                engine.calibration_error(),
                engine.is_calibrated()
            );
            collection.insert(SabrKey::new(&expiry, tenor)?, engine);
        }

        let count = collection.len();
        self.engines.insert(engine_handle.to_string(), collection);
        self.forward_grids
            .insert(engine_handle.to_string(), forward_grid);
        Ok(count)
    }

    /// Calibrates a single ATM engine and stores it under `engine_handle`.
    ///
    /// Nu and rho are taken as given; only alpha is solved from the ATM
    /// volatility. When `asset_code` is `None` the engine is keyed under
    /// the `"0D"` tenor.
    pub fn calibrate_atm_model(
        &mut self,
        engine_handle: &str,
        settings_handle: &str,
        nu: f64,
        rho: f64,
        atm_volatility: f64,
        asset_price: f64,
        expiry: &str,
        asset_code: Option<&str>,
    ) -> SabrResult<()> {
        let settings = self.settings(settings_handle)?.clone();
        let exercise_time = Tenor::parse(expiry)?.years();
        let tenor = asset_code.unwrap_or(ATM_DEFAULT_TENOR);

        let mut engine = SabrEngine::atm(
            settings,
            nu,
            rho,
            atm_volatility,
            asset_price,
            exercise_time,
        )?;
        engine.calibrate()?;

        let mut collection = BTreeMap::new();
        collection.insert(SabrKey::new(expiry, tenor)?, engine);
        self.engines.insert(engine_handle.to_string(), collection);
        self.forward_grids.remove(engine_handle);
        Ok(())
    }

    /// Calibrates an engine whose nu and rho are interpolated from the
    /// calibrated engines stored under `source_handles`.
    ///
    /// Only fitted engines contribute: an engine is used when it is
    /// calibrated, was not itself interpolated, and carries the same beta
    /// as the target settings.
    #[allow(clippy::too_many_arguments)]
    pub fn calibrate_interpolated_model(
        &mut self,
        engine_handle: &str,
        source_handles: &[&str],
        settings_handle: &str,
        expiry: &str,
        tenor: &str,
        atm_volatility: f64,
        asset_price: f64,
    ) -> SabrResult<()> {
        let settings = self.settings(settings_handle)?.clone();
        let key = SabrKey::new(expiry, tenor)?;

        let mut samples = Vec::new();
        for handle in source_handles {
            let collection = self
                .engines
                .get(*handle)
                .ok_or_else(|| SabrError::unknown_handle(*handle))?;
            for (source_key, engine) in collection {
                if !engine.is_calibrated() || engine.is_interpolated() {
                    continue;
                }
                if (engine.settings().beta - settings.beta).abs() > f64::EPSILON {
                    continue;
                }
                let params = engine.parameters();
                samples.push(SurfaceSample {
                    expiry: source_key.expiry_years(),
                    tenor: source_key.tenor_years(),
                    nu: params.nu,
                    rho: params.rho,
                });
            }
        }
        debug!(
            "interpolated calibration for ({}, {}) from {} source engines",
            key.expiry(),
            key.tenor(),
            samples.len()
        );

        let surface = NuRhoSurface::build(&samples)?;
        let mut engine = SabrEngine::interpolated(
            settings,
            surface,
            atm_volatility,
            asset_price,
            key.expiry_years(),
            key.tenor_years(),
        )?;
        engine.calibrate()?;

        let mut collection = BTreeMap::new();
        collection.insert(key, engine);
        self.engines.insert(engine_handle.to_string(), collection);
        self.forward_grids.remove(engine_handle);
        Ok(())
    }

    /// Volatility at a strike from the engine stored under a handle and
    /// (expiry, tenor) key.
    ///
    /// The forward level comes from the forward grid stored with the
    /// collection when the grid covers the key, otherwise from the engine
    /// itself.
    pub fn interpolate_volatility(
        &self,
        handle: &str,
        expiry: &str,
        tenor: &str,
        strike: f64,
    ) -> SabrResult<f64> {
        let key = SabrKey::new(expiry, tenor)?;
        let engine = self.engine(handle, &key)?;
        if !engine.is_calibrated() {
            return Err(SabrError::not_calibrated(key.expiry(), key.tenor()));
        }

        let asset_price = self
            .forward_grids
            .get(handle)
            .and_then(|grid| grid.asset_price(key.expiry(), key.tenor()))
            .unwrap_or_else(|| engine.asset_price());
        implied_volatility(engine.parameters(), asset_price, engine.exercise_time(), strike)
    }

    /// Volatilities at several strikes from one engine.
    pub fn interpolate_volatilities(
        &self,
        handle: &str,
        expiry: &str,
        tenor: &str,
        strikes: &[f64],
    ) -> SabrResult<Vec<f64>> {
        strikes
            .iter()
            .map(|strike| self.interpolate_volatility(handle, expiry, tenor, *strike))
            .collect()
    }

    /// One calibrated parameter of the engine under a handle and key.
    pub fn parameter(
        &self,
        handle: &str,
        expiry: &str,
        tenor: &str,
        which: SabrParameter,
    ) -> SabrResult<f64> {
        let key = SabrKey::new(expiry, tenor)?;
        let params = self.engine(handle, &key)?.parameters();
        Ok(match which {
            SabrParameter::Alpha => params.alpha,
            SabrParameter::Beta => params.beta,
            SabrParameter::Nu => params.nu,
            SabrParameter::Rho => params.rho,
        })
    }

    /// Whether the engine under a handle and key calibrated successfully.
    pub fn is_calibrated(&self, handle: &str, expiry: &str, tenor: &str) -> SabrResult<bool> {
        let key = SabrKey::new(expiry, tenor)?;
        Ok(self.engine(handle, &key)?.is_calibrated())
    }

    /// Objective value of the engine's last fit.
    pub fn calibration_error(&self, handle: &str, expiry: &str, tenor: &str) -> SabrResult<f64> {
        let key = SabrKey::new(expiry, tenor)?;
        Ok(self.engine(handle, &key)?.calibration_error())
    }

    /// Number of engines stored under a handle.
    pub fn engine_count(&self, handle: &str) -> SabrResult<usize> {
        self.engines
            .get(handle)
            .map(BTreeMap::len)
            .ok_or_else(|| SabrError::unknown_handle(handle))
    }

    fn engine(&self, handle: &str, key: &SabrKey) -> SabrResult<&SabrEngine> {
        self.engines
            .get(handle)
            .ok_or_else(|| SabrError::unknown_handle(handle))?
            .get(key)
            .ok_or_else(|| SabrError::engine_not_found(key.expiry(), key.tenor()))
    }
}
