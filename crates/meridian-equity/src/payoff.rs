//! Payoff and exercise conventions shared by the pricers.

use serde::{Deserialize, Serialize};

/// Vanilla option kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionKind {
    /// Right to buy at the strike.
    Call,
    /// Right to sell at the strike.
    Put,
}

impl OptionKind {
    /// Intrinsic value of the option at an asset level.
    #[must_use]
    pub fn intrinsic(self, asset: f64, strike: f64) -> f64 {
        match self {
            Self::Call => (asset - strike).max(0.0),
            Self::Put => (strike - asset).max(0.0),
        }
    }

    /// Signed moneyness direction: `+1` for calls, `-1` for puts.
    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            Self::Call => 1.0,
            Self::Put => -1.0,
        }
    }
}

/// Exercise style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExerciseStyle {
    /// Exercise only at expiry.
    European,
    /// Exercise at any time up to expiry.
    American,
}

/// Payoff shapes handled by the finite-difference pricer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PdePayoff {
    /// Vanilla call.
    Call,
    /// Vanilla put.
    Put,
    /// Pays one unit when the asset finishes above the strike.
    DigitalCall,
    /// Pays one unit when the asset finishes below the strike.
    DigitalPut,
    /// Pays one unit at expiry regardless of the asset level.
    OneTouch,
}

impl PdePayoff {
    /// Terminal value of the payoff at an asset level.
    #[must_use]
    pub fn terminal(self, asset: f64, strike: f64) -> f64 {
        match self {
            Self::Call => (asset - strike).max(0.0),
            Self::Put => (strike - asset).max(0.0),
            Self::DigitalCall => f64::from(asset > strike),
            Self::DigitalPut => f64::from(asset <= strike),
            Self::OneTouch => 1.0,
        }
    }

    /// Early-exercise value used by the American projection. Non-vanilla
    /// payoffs carry no exercise premium here.
    #[must_use]
    pub fn intrinsic(self, asset: f64, strike: f64) -> f64 {
        match self {
            Self::Call => asset - strike,
            Self::Put => strike - asset,
            _ => f64::MIN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_vanilla_intrinsics() {
        assert_relative_eq!(OptionKind::Call.intrinsic(110.0, 100.0), 10.0);
        assert_relative_eq!(OptionKind::Call.intrinsic(90.0, 100.0), 0.0);
        assert_relative_eq!(OptionKind::Put.intrinsic(90.0, 100.0), 10.0);
    }

    #[test]
    fn test_pde_terminal_values() {
        assert_relative_eq!(PdePayoff::Call.terminal(110.0, 100.0), 10.0);
        assert_relative_eq!(PdePayoff::DigitalCall.terminal(110.0, 100.0), 1.0);
        assert_relative_eq!(PdePayoff::DigitalCall.terminal(90.0, 100.0), 0.0);
        assert_relative_eq!(PdePayoff::DigitalPut.terminal(90.0, 100.0), 1.0);
        assert_relative_eq!(PdePayoff::OneTouch.terminal(90.0, 100.0), 1.0);
    }
}
