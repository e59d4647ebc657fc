//! Market data grids feeding the SABR calibration.
//!
//! Volatility grids arrive with tenor row labels and strike column labels
//! quoted as basis-point offsets around the ATM level ("ATM", "ATM+25",
//! "-50"). Forward rate grids arrive with expiry rows and tenor columns;
//! tenors inside the grid range that are not quoted are filled by linear
//! interpolation so that any whole-year tenor resolves directly.

use log::warn;

use meridian_core::tenor::Tenor;
use meridian_math::interpolation::{Interpolator, LinearInterpolator};

use crate::error::{SabrError, SabrResult};

/// A single-expiry swaption volatility grid: tenor rows by strike-offset
/// columns.
#[derive(Debug, Clone)]
pub struct VolatilityGrid {
    expiry: String,
    tenors: Vec<String>,
    strike_offsets: Vec<f64>,
    values: Vec<Vec<f64>>,
}

impl VolatilityGrid {
    /// Creates a grid from labels and a row-per-tenor value matrix.
    ///
    /// Strike labels are parsed as basis-point offsets relative to the ATM
    /// level: `"ATM"` is zero, `"ATM+25"` and `"ATM-50"` carry the signed
    /// offset, and a bare number is the offset itself. Offsets are scaled
    /// by 1/10000 into absolute rate terms.
    pub fn new(
        expiry: &str,
        tenor_labels: &[&str],
        strike_labels: &[&str],
        values: Vec<Vec<f64>>,
    ) -> SabrResult<Self> {
        if values.len() != tenor_labels.len() {
            return Err(SabrError::invalid_grid(format!(
                "{} value rows for {} tenors",
                values.len(),
                tenor_labels.len()
            )));
        }
        for row in &values {
            if row.len() != strike_labels.len() {
                return Err(SabrError::invalid_grid(format!(
                    "value row has {} entries for {} strikes",
                    row.len(),
                    strike_labels.len()
                )));
            }
        }

        let tenors = tenor_labels
            .iter()
            .map(|label| Ok(Tenor::parse(label)?.label()))
            .collect::<SabrResult<Vec<_>>>()?;
        let strike_offsets = strike_labels
            .iter()
            .map(|label| parse_strike_offset(label))
            .collect::<SabrResult<Vec<_>>>()?;

        Ok(Self {
            expiry: Tenor::parse(expiry)?.label(),
            tenors,
            strike_offsets,
            values,
        })
    }

    /// The normalized expiry label of this grid.
    #[must_use]
    pub fn expiry(&self) -> &str {
        &self.expiry
    }

    /// Normalized tenor row labels.
    #[must_use]
    pub fn tenors(&self) -> &[String] {
        &self.tenors
    }

    /// Absolute strike offsets from the ATM level.
    #[must_use]
    pub fn strike_offsets(&self) -> &[f64] {
        &self.strike_offsets
    }

    /// The volatility row for a tenor index.
    #[must_use]
    pub fn volatilities(&self, tenor_index: usize) -> &[f64] {
        &self.values[tenor_index]
    }
}

/// Parses a strike column label into an absolute offset from ATM.
fn parse_strike_offset(label: &str) -> SabrResult<f64> {
    let stripped: String = label.chars().filter(|c| !c.is_whitespace()).collect();
    let upper = stripped.to_ascii_uppercase();
    let numeric = if let Some(rest) = upper.strip_prefix("ATM") {
        if rest.is_empty() {
            return Ok(0.0);
        }
        rest
    } else {
        upper.as_str()
    };
    let basis_points: f64 = numeric.parse().map_err(|_| {
        SabrError::invalid_grid(format!("unparseable strike label '{label}'"))
    })?;
    Ok(basis_points / 10_000.0)
}

/// Year-fraction slack below which two tenor labels address the same
/// grid line ("24M" and "2Y" are the same tenor).
const TENOR_MATCH_TOLERANCE: f64 = 1e-9;

/// A forward rate grid: expiry rows by tenor columns.
#[derive(Debug, Clone)]
pub struct ForwardRateGrid {
    expiries: Vec<String>,
    expiry_years: Vec<f64>,
    tenors: Vec<String>,
    tenor_years: Vec<f64>,
    values: Vec<Vec<f64>>,
}

impl ForwardRateGrid {
    /// Creates a grid, filling whole-year tenors inside the quoted range
    /// by linear interpolation across the tenor axis.
    ///
    /// Tenor labels must be in ascending order.
    pub fn new(
        expiry_labels: &[&str],
        tenor_labels: &[&str],
        values: Vec<Vec<f64>>,
    ) -> SabrResult<Self> {
        if values.len() != expiry_labels.len() {
            return Err(SabrError::invalid_grid(format!(
                "{} value rows for {} expiries",
                values.len(),
                expiry_labels.len()
            )));
        }
        let tenor_years = tenor_labels
            .iter()
            .map(|label| Ok(Tenor::parse(label)?.years()))
            .collect::<SabrResult<Vec<f64>>>()?;
        if tenor_years.windows(2).any(|w| w[1] <= w[0]) {
            return Err(SabrError::invalid_grid(
                "tenor labels must be in ascending order",
            ));
        }
        for row in &values {
            if row.len() != tenor_labels.len() {
                return Err(SabrError::invalid_grid(format!(
                    "value row has {} entries for {} tenors",
                    row.len(),
                    tenor_labels.len()
                )));
            }
        }

        let parsed_expiries = expiry_labels
            .iter()
            .map(|label| Ok(Tenor::parse(label)?))
            .collect::<SabrResult<Vec<_>>>()?;
        let expiries = parsed_expiries.iter().map(Tenor::label).collect();
        let expiry_years = parsed_expiries.iter().map(Tenor::years).collect();

        // The filled tenor axis: every whole year inside the quoted range
        let min = tenor_years.first().copied().unwrap_or(0.0).ceil() as i64;
        let max = tenor_years.last().copied().unwrap_or(0.0).floor() as i64;
        let mut full_tenors = Vec::new();
        let mut full_tenor_years = Vec::new();
        let mut full_values: Vec<Vec<f64>> = vec![Vec::new(); values.len()];
        for year in min..=max {
            full_tenors.push(format!("{year}Y"));
            full_tenor_years.push(year as f64);
        }
        if full_tenors.is_empty() {
            return Err(SabrError::invalid_grid(
                "tenor range covers no whole-year tenor",
            ));
        }

        for (row, quoted) in values.iter().enumerate() {
            if quoted.len() == 1 {
                full_values[row] = vec![quoted[0]; full_tenors.len()];
                continue;
            }
            let interp = LinearInterpolator::new(tenor_years.clone(), quoted.clone())?;
            for year in min..=max {
                full_values[row].push(interp.interpolate(year as f64)?);
            }
        }

        Ok(Self {
            expiries,
            expiry_years,
            tenors: full_tenors,
            tenor_years: full_tenor_years,
            values: full_values,
        })
    }

    /// Normalized expiry row labels.
    #[must_use]
    pub fn expiries(&self) -> &[String] {
        &self.expiries
    }

    /// Tenor column labels after whole-year fill.
    #[must_use]
    pub fn tenors(&self) -> &[String] {
        &self.tenors
    }

    /// Forward level at an (expiry, tenor) label pair, if the pair is on
    /// the grid. Lines are matched by parsed year fraction, so equivalent
    /// labels in different units ("24M", "2Y") address the same cell.
    #[must_use]
    pub fn asset_price(&self, expiry: &str, tenor: &str) -> Option<f64> {
        let expiry = parse_years(expiry)?;
        let tenor = parse_years(tenor)?;
        let row = line_at(&self.expiry_years, expiry)?;
        let col = line_at(&self.tenor_years, tenor)?;
        Some(self.values[row][col])
    }
}

fn parse_years(label: &str) -> Option<f64> {
    match Tenor::parse(label) {
        Ok(tenor) => Some(tenor.years()),
        Err(err) => {
            warn!("unusable tenor label '{}': {}", label, err);
            None
        }
    }
}

fn line_at(years: &[f64], query: f64) -> Option<usize> {
    years
        .iter()
        .position(|y| (y - query).abs() < TENOR_MATCH_TOLERANCE)
}
