//! Nu/rho surfaces assembled from calibrated engines.
//!
//! Interpolated calibration borrows nu and rho from engines that were
//! fitted to data at nearby (expiry, tenor) cells. The borrowed values form
//! two sparse grids; gaps are filled per tenor column by linear
//! interpolation in expiry with flat extrapolation, after which any
//! (tenor, expiry) query resolves bilinearly with edge clamping.

use meridian_math::interpolation::{
    BilinearInterpolator, Extrapolation, Interpolator, LinearInterpolator,
};

use crate::error::{SabrError, SabrResult};

/// One calibrated (expiry, tenor, nu, rho) sample.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceSample {
    /// Option expiry in years.
    pub expiry: f64,
    /// Underlying tenor in years.
    pub tenor: f64,
    /// Calibrated nu.
    pub nu: f64,
    /// Calibrated rho.
    pub rho: f64,
}

/// Filled nu and rho grids over an (expiry, tenor) lattice.
#[derive(Debug, Clone)]
pub struct NuRhoSurface {
    nu: BilinearInterpolator,
    rho: BilinearInterpolator,
    entries: usize,
}

impl NuRhoSurface {
    /// Builds the surface from calibrated samples.
    ///
    /// The expiry and tenor axes are the sorted distinct values occurring in
    /// the samples; cells no sample covers are filled column by column.
    pub fn build(samples: &[SurfaceSample]) -> SabrResult<Self> {
        if samples.is_empty() {
            return Err(SabrError::calibration_failed(
                "no valid engines available for interpolated calibration",
            ));
        }

        let expiries = sorted_distinct(samples.iter().map(|s| s.expiry));
        let tenors = sorted_distinct(samples.iter().map(|s| s.tenor));

        // Sparse grids with NaN marking the uncovered cells
        let mut nu = vec![vec![f64::NAN; tenors.len()]; expiries.len()];
        let mut rho = vec![vec![f64::NAN; tenors.len()]; expiries.len()];
        for sample in samples {
            let row = index_of(&expiries, sample.expiry);
            let col = index_of(&tenors, sample.tenor);
            nu[row][col] = sample.nu;
            rho[row][col] = sample.rho;
        }

        fill_columns(&expiries, &mut nu)?;
        fill_columns(&expiries, &mut rho)?;

        Ok(Self {
            nu: BilinearInterpolator::new(expiries.clone(), tenors.clone(), nu)?,
            rho: BilinearInterpolator::new(expiries, tenors, rho)?,
            entries: samples.len(),
        })
    }

    /// Number of samples the surface was built from.
    #[must_use]
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Interpolated `(nu, rho)` at a tenor and expiry, both in years.
    #[must_use]
    pub fn interpolate(&self, tenor: f64, expiry: f64) -> (f64, f64) {
        (
            self.nu.interpolate(expiry, tenor),
            self.rho.interpolate(expiry, tenor),
        )
    }
}

fn sorted_distinct(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut out: Vec<f64> = values.collect();
    out.sort_by(f64::total_cmp);
    out.dedup();
    out
}

fn index_of(axis: &[f64], value: f64) -> usize {
    axis.iter()
        .position(|&v| v == value)
        .unwrap_or_else(|| unreachable!("axis was built from the sample values"))
}

/// Fills the NaN cells of each tenor column by linear interpolation over
/// the known expiries, flat beyond them.
fn fill_columns(expiries: &[f64], grid: &mut [Vec<f64>]) -> SabrResult<()> {
    let columns = grid.first().map_or(0, Vec::len);
    for col in 0..columns {
        let mut known_expiries = Vec::new();
        let mut known_values = Vec::new();
        for (row, expiry) in expiries.iter().enumerate() {
            let v = grid[row][col];
            if v.is_finite() {
                known_expiries.push(*expiry);
                known_values.push(v);
            }
        }
        // Every tenor on the axis comes from at least one sample
        if known_values.is_empty() {
            return Err(SabrError::calibration_failed(
                "surface column has no calibrated entries",
            ));
        }

        if known_values.len() == 1 {
            let value = known_values[0];
            for row in grid.iter_mut() {
                if !row[col].is_finite() {
                    row[col] = value;
                }
            }
            continue;
        }

        let interp = LinearInterpolator::new(known_expiries, known_values)?
            .with_extrapolation(Extrapolation::Flat);
        for (row, expiry) in expiries.iter().enumerate() {
            if !grid[row][col].is_finite() {
                grid[row][col] = interp.interpolate(*expiry)?;
            }
        }
    }
    Ok(())
}
