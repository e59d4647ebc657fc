//! Binomial lattice pricer for vanilla equity options.
//!
//! The lattice carries discrete dividends in escrow: the root is seeded
//! with spot less the present value of all dividends before expiry, and
//! each level adds back the present value of the dividends still to come.
//! Up and down factors solve the standard moment-matching condition per
//! step, so the tree prices correctly under a sloped zero curve.
//!
//! Smoothing replaces the three pre-terminal nodes nearest the strike
//! with closed-form forward prices. This barely moves the price but
//! removes most of the oscillation in gamma and vega caused by the
//! strike's position between adjacent nodes.

use statrs::function::erf::erfc;

use crate::error::{EquityError, EquityResult};
use crate::market::{DividendSchedule, ZeroRateCurve};
use crate::payoff::{ExerciseStyle, OptionKind};

/// Inputs for one binomial pricing run.
#[derive(Debug, Clone, Copy)]
pub struct BinomialSpec {
    /// Spot price of the underlying.
    pub spot: f64,
    /// Option strike.
    pub strike: f64,
    /// Time to expiry in years.
    pub expiry: f64,
    /// Lognormal volatility.
    pub volatility: f64,
    /// Call or put.
    pub kind: OptionKind,
    /// European or American exercise.
    pub style: ExerciseStyle,
    /// Number of tree steps.
    pub steps: usize,
    /// Use one flat forward rate across the tree instead of per-step
    /// forwards.
    pub flat_rate: bool,
    /// Apply pre-terminal smoothing.
    pub smoothing: bool,
}

impl BinomialSpec {
    /// Creates a spec with 100 steps, flat rate and smoothing enabled.
    #[must_use]
    pub fn new(
        spot: f64,
        strike: f64,
        kind: OptionKind,
        style: ExerciseStyle,
        expiry: f64,
        volatility: f64,
    ) -> Self {
        Self {
            spot,
            strike,
            expiry,
            volatility,
            kind,
            style,
            steps: 100,
            flat_rate: true,
            smoothing: true,
        }
    }

    /// Sets the number of tree steps.
    #[must_use]
    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    /// Sets the flat-rate flag.
    #[must_use]
    pub fn with_flat_rate(mut self, flat_rate: bool) -> Self {
        self.flat_rate = flat_rate;
        self
    }

    /// Sets the smoothing flag.
    #[must_use]
    pub fn with_smoothing(mut self, smoothing: bool) -> Self {
        self.smoothing = smoothing;
        self
    }
}

/// A recombining asset-price lattice with escrowed discrete dividends.
#[derive(Debug, Clone)]
pub struct EquityTree {
    steps: usize,
    time: f64,
    volatility: f64,
    asset: Vec<Vec<f64>>,
    up: Vec<f64>,
    down: Vec<f64>,
    rates: Vec<f64>,
    div_pv: Vec<f64>,
}

impl EquityTree {
    /// Builds the lattice.
    pub fn build(
        spot: f64,
        expiry: f64,
        volatility: f64,
        steps: usize,
        flat_rate: bool,
        curve: &ZeroRateCurve,
        dividends: &DividendSchedule,
    ) -> EquityResult<Self> {
        if steps < 2 {
            return Err(EquityError::grid_too_coarse(format!(
                "binomial tree needs at least 2 steps, got {steps}"
            )));
        }
        let dt = expiry / steps as f64;

        // Escrow: strip the PV of all dividends before expiry off the spot
        let mut spot_star = spot;
        for (time, amount) in dividends.times() {
            if time > 0.0 && time <= expiry {
                let fwd = curve.forward_rate(0.0, time)?;
                spot_star -= amount * (-fwd * time).exp();
            }
        }

        // PV at each level of the dividends still to be paid
        let mut div_pv = vec![0.0; steps];
        for (i, pv) in div_pv.iter_mut().enumerate() {
            let t0 = i as f64 * dt;
            for (time, amount) in dividends.times() {
                if time > t0 && time <= expiry {
                    let fwd = curve.forward_rate(t0, time)?;
                    *pv += amount * (-fwd * (time - t0)).exp();
                }
            }
        }

        let mut rates = vec![0.0; steps];
        if flat_rate {
            let flat = curve.forward_rate(0.0, expiry)?;
            rates.fill(flat);
        } else {
            for (i, rate) in rates.iter_mut().enumerate() {
                *rate = curve.forward_rate(i as f64 * dt, (i + 1) as f64 * dt)?;
            }
        }

        let mut up = vec![0.0; steps];
        let mut down = vec![0.0; steps];
        for i in 0..steps {
            let r = rates[i];
            let a = 1.0 + ((2.0 * r + volatility * volatility) * dt).exp();
            let u = (a + (a * a - 4.0 * (2.0 * r * dt).exp()).sqrt()) / (2.0 * (r * dt).exp());
            up[i] = u;
            down[i] = 1.0 / u;
        }

        let mut asset = Vec::with_capacity(steps + 1);
        asset.push(vec![spot_star + div_pv[0]]);
        for i in 1..=steps {
            let mut level = Vec::with_capacity(i + 1);
            for j in 0..=i {
                let mut value =
                    spot_star * up[i - 1].powi(j as i32) * down[i - 1].powi((i - j) as i32);
                if i < steps {
                    value += div_pv[i];
                }
                level.push(value);
            }
            asset.push(level);
        }

        Ok(Self {
            steps,
            time: expiry,
            volatility,
            asset,
            up,
            down,
            rates,
            div_pv,
        })
    }

    /// Number of time steps.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Time to expiry in years.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Time step size.
    #[must_use]
    pub fn dt(&self) -> f64 {
        self.time / self.steps as f64
    }

    /// Asset level at a node; `node` counts up-moves.
    #[must_use]
    pub fn asset_value(&self, step: usize, node: usize) -> f64 {
        self.asset[step][node]
    }

    /// Forward rate over one step, zero beyond the last.
    #[must_use]
    pub fn rate(&self, step: usize) -> f64 {
        if step < self.steps {
            self.rates[step]
        } else {
            0.0
        }
    }

    /// Risk-neutral up probability for a step.
    #[must_use]
    pub fn probability_up(&self, step: usize) -> f64 {
        if step >= self.steps {
            return 0.0;
        }
        let growth = (self.rate(step) * self.dt()).exp();
        (growth - self.down[step]) / (self.up[step] - self.down[step])
    }

    /// PV at a level of the dividends still to be paid.
    #[must_use]
    pub fn dividend_pv(&self, step: usize) -> f64 {
        self.div_pv.get(step).copied().unwrap_or(0.0)
    }
}

/// Binomial pricer with backward induction and finite-difference Greeks.
#[derive(Debug, Clone)]
pub struct BinomialPricer {
    spec: BinomialSpec,
    curve: ZeroRateCurve,
    dividends: DividendSchedule,
    tree: EquityTree,
    prices: Vec<Vec<f64>>,
}

impl BinomialPricer {
    /// Builds the lattice and runs the backward induction.
    pub fn build(
        spec: BinomialSpec,
        curve: &ZeroRateCurve,
        dividends: &DividendSchedule,
    ) -> EquityResult<Self> {
        if spec.spot <= 0.0 || spec.strike <= 0.0 {
            return Err(EquityError::invalid_parameter(format!(
                "spot {} and strike {} must be positive",
                spec.spot, spec.strike
            )));
        }
        if spec.expiry <= 0.0 || spec.volatility < 0.0 {
            return Err(EquityError::invalid_parameter(format!(
                "expiry {} must be positive and volatility {} non-negative",
                spec.expiry, spec.volatility
            )));
        }
        if spec.steps < 4 {
            return Err(EquityError::grid_too_coarse(format!(
                "pricer needs at least 4 steps, got {}",
                spec.steps
            )));
        }

        let tree = EquityTree::build(
            spec.spot,
            spec.expiry,
            spec.volatility,
            spec.steps,
            spec.flat_rate,
            curve,
            dividends,
        )?;

        let mut pricer = Self {
            spec,
            curve: curve.clone(),
            dividends: dividends.clone(),
            prices: (0..=tree.steps()).map(|i| vec![0.0; i + 1]).collect(),
            tree,
        };
        pricer.induct();
        Ok(pricer)
    }

    /// Option value at the root.
    #[must_use]
    pub fn price(&self) -> f64 {
        self.prices[0][0]
    }

    /// Option value at an interior node.
    #[must_use]
    pub fn node_price(&self, step: usize, node: usize) -> f64 {
        self.prices[step][node]
    }

    /// The underlying lattice.
    #[must_use]
    pub fn tree(&self) -> &EquityTree {
        &self.tree
    }

    fn induct(&mut self) {
        let n = self.tree.steps();

        for j in 0..=n {
            self.prices[n][j] = self
                .spec
                .kind
                .intrinsic(self.tree.asset_value(n, j), self.spec.strike);
        }

        self.step_back(n - 1);
        if self.spec.smoothing {
            self.smooth();
        }
        for i in (0..n.saturating_sub(1)).rev() {
            self.step_back(i);
        }
    }

    /// One backward-induction sweep at a level.
    fn step_back(&mut self, step: usize) {
        let dt = self.tree.dt();
        let p = self.tree.probability_up(step);
        let discount = (-self.tree.rate(step) * dt).exp();
        for j in 0..=step {
            let continuation =
                discount * (p * self.prices[step + 1][j + 1] + (1.0 - p) * self.prices[step + 1][j]);
            self.prices[step][j] = match self.spec.style {
                ExerciseStyle::European => continuation,
                ExerciseStyle::American => continuation.max(
                    self.spec.kind.sign() * (self.tree.asset_value(step, j) - self.spec.strike),
                ),
            };
        }
    }

    /// Replaces the three pre-terminal nodes nearest the strike with
    /// closed-form forward prices over the final step.
    fn smooth(&mut self) {
        let n = self.tree.steps();
        let idx = n - 1;
        let dt = self.tree.dt();
        let strike = self.spec.strike;

        let mut k = 1;
        while k <= n - 1
            && self.tree.asset_value(idx, k - 1) <= strike
            && self.tree.asset_value(idx, k) <= strike
        {
            k += 1;
        }
        let centre = if k == 1 {
            2
        } else if k >= n - 1 {
            n - 2
        } else if (self.tree.asset_value(idx, k - 2) / strike - 1.0).abs()
            > (self.tree.asset_value(idx, k + 1) / strike - 1.0).abs()
        {
            k
        } else {
            k - 1
        };

        let rate = self.tree.rate(idx);
        for j in centre - 1..=centre + 1 {
            let forward = (self.tree.asset_value(idx, j) - self.tree.dividend_pv(idx))
                * (rate * dt).exp();
            if forward > 0.0 {
                self.prices[idx][j] = black_scholes_forward(
                    forward,
                    dt,
                    strike,
                    rate,
                    self.tree.volatility,
                    self.spec.kind,
                );
            }
        }
    }

    /// Rebuilds the pricer with two extra steps for the spatial Greeks.
    fn expanded(&self) -> EquityResult<Self> {
        let steps = self.spec.steps + 2;
        let spec = BinomialSpec {
            steps,
            expiry: self.spec.expiry * (1.0 + 2.0 / steps as f64),
            ..self.spec
        };
        Self::build(spec, &self.curve, &self.dividends)
    }

    /// Spatial node values two steps into the expanded tree.
    fn greek_nodes(&self) -> EquityResult<([f64; 3], [f64; 3])> {
        let clone = self.expanded()?;
        let mut s = [0.0; 3];
        let mut c = [0.0; 3];
        for i in 0..3 {
            s[i] = clone.tree.asset_value(2, i);
            c[i] = clone.node_price(2, i);
        }
        Ok((s, c))
    }

    /// Delta by a 3-point fit through the expanded tree's second level.
    pub fn delta(&self) -> EquityResult<f64> {
        let (s, c) = self.greek_nodes()?;
        Ok((s[0] * (2.0 * s[1] - s[0]) * (c[1] - c[2])
            + s[1] * s[1] * (c[2] - c[0])
            + s[2] * (2.0 * s[1] - s[2]) * (c[0] - c[1]))
            / (s[1] - s[0])
            / (s[2] - s[0])
            / (s[2] - s[1]))
    }

    /// Gamma by the same 3-point fit as [`BinomialPricer::delta`].
    pub fn gamma(&self) -> EquityResult<f64> {
        let (s, c) = self.greek_nodes()?;
        Ok(
            2.0 * (s[0] * (c[1] - c[2]) + s[1] * (c[2] - c[0]) + s[2] * (c[0] - c[1]))
                / (s[1] - s[0])
                / (s[2] - s[0])
                / (s[2] - s[1]),
        )
    }

    /// Vega by repricing at a one-percent relative volatility bump either
    /// side. Zero when the volatility is zero.
    pub fn vega(&self) -> EquityResult<f64> {
        let vol = self.spec.volatility;
        if vol == 0.0 {
            return Ok(0.0);
        }
        let down = Self::build(
            BinomialSpec {
                volatility: 0.99 * vol,
                ..self.spec
            },
            &self.curve,
            &self.dividends,
        )?;
        let up = Self::build(
            BinomialSpec {
                volatility: 1.01 * vol,
                ..self.spec
            },
            &self.curve,
            &self.dividends,
        )?;
        Ok(0.01 * (up.price() - down.price()) / (2.0 * 0.01 * vol))
    }

    /// One-day theta: the price change from rolling expiry, the rate
    /// pillars and the dividend days forward by one day.
    pub fn theta(&self) -> EquityResult<f64> {
        let shifted = Self::build(
            BinomialSpec {
                expiry: self.spec.expiry - 1.0 / 365.0,
                ..self.spec
            },
            &self.curve.shifted_back_one_day(),
            &self.dividends.shifted_back_one_day(),
        )?;
        Ok(shifted.price() - self.price())
    }
}

/// Standard normal cumulative distribution.
fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / std::f64::consts::SQRT_2)
}

/// Black-Scholes price of a vanilla option on a forward over a short
/// horizon, discounted at the given rate.
fn black_scholes_forward(
    forward: f64,
    tau: f64,
    strike: f64,
    rate: f64,
    volatility: f64,
    kind: OptionKind,
) -> f64 {
    let sign = kind.sign();
    let sigma_root_t = volatility * tau.sqrt();
    if sigma_root_t <= 0.0 {
        return (-rate * tau).exp() * kind.intrinsic(forward, strike);
    }
    let d1 = ((forward / strike).ln() + 0.5 * volatility * volatility * tau) / sigma_root_t;
    let d2 = d1 - sigma_root_t;
    sign * (forward * norm_cdf(sign * d1) - strike * norm_cdf(sign * d2)) * (-rate * tau).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SPOT: f64 = 100.0;
    const STRIKE: f64 = 100.0;
    const RATE: f64 = 0.05;
    const VOL: f64 = 0.2;
    const EXPIRY: f64 = 1.0;

    fn curve() -> ZeroRateCurve {
        ZeroRateCurve::flat(RATE)
    }

    fn spec(kind: OptionKind, style: ExerciseStyle) -> BinomialSpec {
        BinomialSpec::new(SPOT, STRIKE, kind, style, EXPIRY, VOL).with_steps(200)
    }

    /// Closed-form vanilla price on a spot with continuous discounting.
    fn black_scholes_spot(kind: OptionKind) -> f64 {
        let forward = SPOT * (RATE * EXPIRY).exp();
        black_scholes_forward(forward, EXPIRY, STRIKE, RATE, VOL, kind)
    }

    #[test]
    fn test_european_call_converges_to_black_scholes() {
        let pricer = BinomialPricer::build(
            spec(OptionKind::Call, ExerciseStyle::European),
            &curve(),
            &DividendSchedule::none(),
        )
        .unwrap();
        assert_relative_eq!(pricer.price(), black_scholes_spot(OptionKind::Call), epsilon = 0.05);
    }

    #[test]
    fn test_price_bounds() {
        let pricer = BinomialPricer::build(
            spec(OptionKind::Call, ExerciseStyle::European),
            &curve(),
            &DividendSchedule::none(),
        )
        .unwrap();
        assert!(pricer.price() >= 0.0);
        assert!(pricer.price() <= SPOT);
    }

    #[test]
    fn test_put_call_parity() {
        let call = BinomialPricer::build(
            spec(OptionKind::Call, ExerciseStyle::European),
            &curve(),
            &DividendSchedule::none(),
        )
        .unwrap();
        let put = BinomialPricer::build(
            spec(OptionKind::Put, ExerciseStyle::European),
            &curve(),
            &DividendSchedule::none(),
        )
        .unwrap();
        let parity = SPOT - STRIKE * (-RATE * EXPIRY).exp();
        assert_relative_eq!(call.price() - put.price(), parity, epsilon = 0.05);
    }

    #[test]
    fn test_american_put_premium() {
        let european = BinomialPricer::build(
            spec(OptionKind::Put, ExerciseStyle::European),
            &curve(),
            &DividendSchedule::none(),
        )
        .unwrap();
        let american = BinomialPricer::build(
            spec(OptionKind::Put, ExerciseStyle::American),
            &curve(),
            &DividendSchedule::none(),
        )
        .unwrap();
        assert!(american.price() >= european.price());
    }

    #[test]
    fn test_deep_itm_american_put_at_least_intrinsic() {
        let deep = BinomialSpec::new(
            SPOT,
            150.0,
            OptionKind::Put,
            ExerciseStyle::American,
            EXPIRY,
            VOL,
        )
        .with_steps(200);
        let pricer = BinomialPricer::build(deep, &curve(), &DividendSchedule::none()).unwrap();
        assert!(pricer.price() >= 50.0 - 1e-9);
    }

    #[test]
    fn test_dividend_lowers_call_price() {
        let divs = DividendSchedule::new(&[182], &[3.0]).unwrap();
        let with_div = BinomialPricer::build(
            spec(OptionKind::Call, ExerciseStyle::European),
            &curve(),
            &divs,
        )
        .unwrap();
        let without = BinomialPricer::build(
            spec(OptionKind::Call, ExerciseStyle::European),
            &curve(),
            &DividendSchedule::none(),
        )
        .unwrap();
        assert!(with_div.price() < without.price());
    }

    #[test]
    fn test_greeks_have_expected_signs() {
        let pricer = BinomialPricer::build(
            spec(OptionKind::Call, ExerciseStyle::European),
            &curve(),
            &DividendSchedule::none(),
        )
        .unwrap();

        let delta = pricer.delta().unwrap();
        assert!(delta > 0.0 && delta < 1.0);
        assert!(pricer.gamma().unwrap() > 0.0);
        assert!(pricer.vega().unwrap() > 0.0);
        assert!(pricer.theta().unwrap() < 0.0);
    }

    #[test]
    fn test_put_delta_negative() {
        let pricer = BinomialPricer::build(
            spec(OptionKind::Put, ExerciseStyle::European),
            &curve(),
            &DividendSchedule::none(),
        )
        .unwrap();
        let delta = pricer.delta().unwrap();
        assert!(delta < 0.0 && delta > -1.0);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let bad = BinomialSpec::new(
            -1.0,
            STRIKE,
            OptionKind::Call,
            ExerciseStyle::European,
            EXPIRY,
            VOL,
        );
        assert!(BinomialPricer::build(bad, &curve(), &DividendSchedule::none()).is_err());

        let coarse = spec(OptionKind::Call, ExerciseStyle::European).with_steps(2);
        assert!(BinomialPricer::build(coarse, &curve(), &DividendSchedule::none()).is_err());
    }

    #[test]
    fn test_tree_probabilities_in_unit_interval() {
        let tree = EquityTree::build(
            SPOT,
            EXPIRY,
            VOL,
            50,
            true,
            &curve(),
            &DividendSchedule::none(),
        )
        .unwrap();
        for step in 0..50 {
            let p = tree.probability_up(step);
            assert!(p > 0.0 && p < 1.0);
        }
    }
}
