//! Power analysis for the two-sided paired (one-sample) t-test.
//!
//! For `n` pairs and standardized effect size `dz`, the test statistic follows
//! a noncentral t distribution with `n - 1` degrees of freedom and
//! noncentrality `dz * sqrt(n)`. Power is the probability that it lands in
//! either rejection region:
//!
//! ```text
//! power(n) = P(T' > t_{1-alpha/2, n-1}) + P(T' < t_{alpha/2, n-1})
//! ```
//!
//! Sample sizes are treated as real numbers so that the solver can report
//! the exact crossing point (e.g. `127.5` pairs) before rounding up.
//!
//! # Examples
//!
//! ```
//! use typewise_stats::power::PairedTTestPower;
//!
//! let analysis = PairedTTestPower::new(0.05).unwrap();
//! let n = analysis.solve_sample_size(0.25, 0.80).unwrap();
//! assert!((n - 127.5).abs() < 0.5);
//! assert!((analysis.power(0.25, n) - 0.80).abs() < 1e-6);
//! ```

use crate::{
    distribution::{NoncentralT, students_t, t_quantile},
    solve,
};

/// Smallest sample size the solver considers (one degree of freedom).
pub const MIN_SAMPLE_SIZE: f64 = 2.0;

const MAX_SAMPLE_SIZE: f64 = 1e7;
const SOLVER_TOLERANCE: f64 = 1e-10;

/// Error raised when a sample size cannot be solved for.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum PowerError {
    /// Significance level outside `(0, 1)`.
    #[display("significance level must be in (0, 1), got {alpha}")]
    InvalidAlpha { alpha: f64 },
    /// Target power outside `(alpha, 1)`.
    #[display("target power must be in (alpha, 1), got {power}")]
    InvalidPower { power: f64 },
    /// The target power is not reached by any sample size the solver tries
    /// (for example when the effect size is zero).
    #[display("power {power} is unreachable for effect size {effect_size}")]
    Unreachable { effect_size: f64, power: f64 },
}

/// Power calculator for the two-sided paired t-test at a fixed significance level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairedTTestPower {
    alpha: f64,
}

impl PairedTTestPower {
    pub fn new(alpha: f64) -> Result<Self, PowerError> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(PowerError::InvalidAlpha { alpha });
        }
        Ok(Self { alpha })
    }

    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Probability of rejecting the null hypothesis with `n` pairs when the
    /// true standardized effect is `effect_size`.
    ///
    /// Returns `NaN` for `n <= 1` (no degrees of freedom).
    #[must_use]
    pub fn power(&self, effect_size: f64, n: f64) -> f64 {
        let df = n - 1.0;
        let (Some(t), Some(nct)) = (
            students_t(df),
            NoncentralT::new(df, effect_size * n.sqrt()),
        ) else {
            return f64::NAN;
        };
        let crit_upper = t_quantile(&t, 1.0 - self.alpha / 2.0);
        let crit_lower = t_quantile(&t, self.alpha / 2.0);
        (nct.sf(crit_upper) + nct.cdf(crit_lower)).clamp(0.0, 1.0)
    }

    /// Smallest (real-valued) number of pairs at which power reaches `target_power`.
    ///
    /// The search starts from [`MIN_SAMPLE_SIZE`]; if power there already
    /// meets the target, that lower bound is returned. Otherwise the upper
    /// bound is doubled until the target is bracketed and the crossing point
    /// is found by bisection.
    pub fn solve_sample_size(&self, effect_size: f64, target_power: f64) -> Result<f64, PowerError> {
        if !(target_power > self.alpha && target_power < 1.0) {
            return Err(PowerError::InvalidPower {
                power: target_power,
            });
        }
        let unreachable = PowerError::Unreachable {
            effect_size,
            power: target_power,
        };
        if !effect_size.is_finite() || effect_size == 0.0 {
            return Err(unreachable);
        }

        let shortfall = |n: f64| self.power(effect_size, n) - target_power;

        let lo = MIN_SAMPLE_SIZE;
        if shortfall(lo) >= 0.0 {
            return Ok(lo);
        }
        let mut hi = lo * 2.0;
        while shortfall(hi) < 0.0 {
            hi *= 2.0;
            if hi > MAX_SAMPLE_SIZE {
                return Err(unreachable);
            }
        }
        solve::bisect(shortfall, lo, hi, SOLVER_TOLERANCE).ok_or(unreachable)
    }

    /// Power at each sample size, for plotting a power curve.
    #[must_use]
    pub fn power_curve<I>(&self, effect_size: f64, sample_sizes: I) -> Vec<(f64, f64)>
    where
        I: IntoIterator<Item = f64>,
    {
        sample_sizes
            .into_iter()
            .map(|n| (n, self.power(effect_size, n)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameters() {
        assert_eq!(
            PairedTTestPower::new(0.0),
            Err(PowerError::InvalidAlpha { alpha: 0.0 })
        );
        assert!(PairedTTestPower::new(1.5).is_err());

        let analysis = PairedTTestPower::new(0.05).unwrap();
        assert_eq!(
            analysis.solve_sample_size(0.25, 0.01),
            Err(PowerError::InvalidPower { power: 0.01 })
        );
        assert!(analysis.solve_sample_size(0.25, 1.0).is_err());
    }

    #[test]
    fn test_zero_effect_is_unreachable() {
        let analysis = PairedTTestPower::new(0.05).unwrap();
        assert!(matches!(
            analysis.solve_sample_size(0.0, 0.8),
            Err(PowerError::Unreachable { .. })
        ));
        // With no effect, power equals the significance level
        assert!((analysis.power(0.0, 30.0) - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_solved_sample_size_reproduces_target() {
        let analysis = PairedTTestPower::new(0.05).unwrap();
        for effect_size in [0.25, 0.27, 0.5, 0.8] {
            let n = analysis.solve_sample_size(effect_size, 0.80).unwrap();
            assert!(n.is_finite() && n > 0.0);
            assert!((analysis.power(effect_size, n) - 0.80).abs() < 1e-6);
        }
    }

    #[test]
    fn test_reference_sample_sizes() {
        let analysis = PairedTTestPower::new(0.05).unwrap();
        // Known reference points for a paired design at 80% power
        let n_small = analysis.solve_sample_size(0.25, 0.80).unwrap();
        assert!((n_small - 127.51).abs() < 0.05, "got {n_small}");
        let n_medium = analysis.solve_sample_size(0.5, 0.80).unwrap();
        assert!((n_medium - 33.37).abs() < 0.05, "got {n_medium}");
        let n_alt = analysis.solve_sample_size(0.27, 0.80).unwrap();
        assert!((n_alt - 109.60).abs() < 0.05, "got {n_alt}");
    }

    #[test]
    fn test_negative_effect_is_symmetric() {
        let analysis = PairedTTestPower::new(0.05).unwrap();
        for n in [10.0, 40.0, 150.0] {
            assert!((analysis.power(0.3, n) - analysis.power(-0.3, n)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_power_curve_is_monotone() {
        let analysis = PairedTTestPower::new(0.05).unwrap();
        let curve = analysis.power_curve(0.25, (20..300).step_by(5).map(f64::from));
        assert_eq!(curve.len(), 56);
        for window in curve.windows(2) {
            assert!(window[1].0 > window[0].0);
            assert!(window[1].1 >= window[0].1);
        }
        assert!(curve[0].1 > 0.05 && curve[0].1 < 0.80);
        assert!(curve[curve.len() - 1].1 > 0.80);
    }

    #[test]
    fn test_power_undefined_without_degrees_of_freedom() {
        let analysis = PairedTTestPower::new(0.05).unwrap();
        assert!(analysis.power(0.5, 1.0).is_nan());
    }
}
