//! Tenor label parsing and year-fraction conversion.
//!
//! Market data grids key rows and columns by period labels such as `"1D"`,
//! `"3M"` or `"10Y"`. Labels arrive in inconsistent shapes (embedded spaces,
//! lower-case units, bare numbers), so parsing normalizes before keying:
//! whitespace is stripped, the unit letter is upper-cased, and a bare number
//! is taken to mean years. An unrecognized unit letter is an error rather
//! than a silent fallback.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

static ALPHA_PART: Lazy<Regex> = Lazy::new(|| Regex::new("[a-zA-Z]+").unwrap());
static NUMERIC_PART: Lazy<Regex> = Lazy::new(|| Regex::new("-*[0-9.]+").unwrap());

/// Unit of a tenor label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TenorUnit {
    /// Calendar days.
    Day,
    /// Calendar weeks.
    Week,
    /// Calendar months.
    Month,
    /// Calendar years.
    Year,
}

impl TenorUnit {
    /// Number of periods of this unit in one year.
    #[must_use]
    pub fn periods_per_year(self) -> f64 {
        match self {
            Self::Day => 365.0,
            Self::Week => 52.0,
            Self::Month => 12.0,
            Self::Year => 1.0,
        }
    }

    /// Single-letter market convention for this unit.
    #[must_use]
    pub fn letter(self) -> char {
        match self {
            Self::Day => 'D',
            Self::Week => 'W',
            Self::Month => 'M',
            Self::Year => 'Y',
        }
    }
}

/// A parsed tenor: a period count and a unit.
///
/// # Example
///
/// ```rust
/// use meridian_core::tenor::Tenor;
///
/// let tenor = Tenor::parse(" 10 Y ").unwrap();
/// assert_eq!(tenor.label(), "10Y");
/// assert_eq!(tenor.years(), 10.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tenor {
    /// Number of periods. May be fractional (e.g. `"0.5Y"`).
    pub value: f64,
    /// Period unit.
    pub unit: TenorUnit,
}

impl Tenor {
    /// Creates a tenor from a value and unit.
    #[must_use]
    pub fn new(value: f64, unit: TenorUnit) -> Self {
        Self { value, unit }
    }

    /// Parses a raw tenor label.
    ///
    /// The label is split into a numeric part and an alpha part. Embedded
    /// whitespace is ignored and the unit letter is case-insensitive. A label
    /// with no alpha part defaults to years, so `"3"` parses as three years.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTenor`] when the numeric part is missing
    /// or unparseable, or when the unit letter is not one of D/W/M/Y.
    pub fn parse(label: &str) -> CoreResult<Self> {
        let stripped: String = label.chars().filter(|c| !c.is_whitespace()).collect();
        if stripped.is_empty() {
            return Err(CoreError::invalid_tenor(label, "empty label"));
        }

        let numeric = NUMERIC_PART
            .find(&stripped)
            .ok_or_else(|| CoreError::invalid_tenor(label, "no numeric part"))?;
        let value: f64 = numeric
            .as_str()
            .parse()
            .map_err(|_| CoreError::invalid_tenor(label, "unparseable numeric part"))?;

        let unit = match ALPHA_PART.find(&stripped) {
            None => TenorUnit::Year,
            Some(alpha) => {
                let first = alpha
                    .as_str()
                    .chars()
                    .next()
                    .unwrap_or('Y')
                    .to_ascii_uppercase();
                match first {
                    'D' => TenorUnit::Day,
                    'W' => TenorUnit::Week,
                    'M' => TenorUnit::Month,
                    'Y' => TenorUnit::Year,
                    other => {
                        return Err(CoreError::invalid_tenor(
                            label,
                            format!("unrecognized unit '{}'", other),
                        ))
                    }
                }
            }
        };

        Ok(Self { value, unit })
    }

    /// Converts this tenor to a year fraction (D/365, W/52, M/12, Y as-is).
    #[must_use]
    pub fn years(&self) -> f64 {
        self.value / self.unit.periods_per_year()
    }

    /// Canonical label for this tenor, e.g. `"10Y"`.
    #[must_use]
    pub fn label(&self) -> String {
        if (self.value - self.value.round()).abs() < 1e-12 {
            format!("{}{}", self.value.round() as i64, self.unit.letter())
        } else {
            format!("{}{}", self.value, self.unit.letter())
        }
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for Tenor {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_standard_labels() {
        assert_eq!(Tenor::parse("1D").unwrap().unit, TenorUnit::Day);
        assert_eq!(Tenor::parse("2W").unwrap().unit, TenorUnit::Week);
        assert_eq!(Tenor::parse("6M").unwrap().unit, TenorUnit::Month);
        assert_eq!(Tenor::parse("10Y").unwrap().unit, TenorUnit::Year);
    }

    #[test]
    fn test_bare_number_defaults_to_years() {
        let tenor = Tenor::parse("3").unwrap();
        assert_eq!(tenor.unit, TenorUnit::Year);
        assert_eq!(tenor.label(), "3Y");
    }

    #[test]
    fn test_whitespace_and_case_normalized() {
        assert_eq!(Tenor::parse(" 10 Y ").unwrap().label(), "10Y");
        assert_eq!(Tenor::parse("6m").unwrap().label(), "6M");
    }

    #[test]
    fn test_round_trip_label() {
        assert_eq!(Tenor::parse("6M").unwrap().label(), "6M");
        assert_eq!(Tenor::parse("1D").unwrap().label(), "1D");
    }

    #[test]
    fn test_year_fractions() {
        assert_relative_eq!(Tenor::parse("365D").unwrap().years(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(Tenor::parse("26W").unwrap().years(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(Tenor::parse("6M").unwrap().years(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(Tenor::parse("10Y").unwrap().years(), 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_fractional_value() {
        let tenor = Tenor::parse("0.5Y").unwrap();
        assert_relative_eq!(tenor.years(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_unrecognized_unit_rejected() {
        // The historical parser silently treated unknown letters as months;
        // that masked malformed labels, so unknown units are now an error.
        let err = Tenor::parse("10Q").unwrap_err();
        assert!(format!("{}", err).contains("unrecognized unit"));
    }

    #[test]
    fn test_empty_and_garbage_rejected() {
        assert!(Tenor::parse("").is_err());
        assert!(Tenor::parse("   ").is_err());
        assert!(Tenor::parse("M").is_err());
    }
}
