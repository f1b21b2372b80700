//! Continuous probability distributions used for hypothesis testing.
//!
//! The central distributions come from [`statrs`]; this module adds the
//! guarded helpers the tests need and the noncentral t distribution that
//! `statrs` does not provide.
//!
//! - [`students_t`], [`two_sided_p`], [`t_quantile`]: Student's t (tests and confidence intervals)
//! - [`f_sf`]: F distribution survival function (overall regression significance)
//! - [`NoncentralT`]: noncentral t distribution (power of the t-test)
//!
//! Degrees of freedom are real-valued, which the power solver relies on
//! when it searches over non-integer sample sizes.

use std::f64::consts::{LN_2, PI};

pub use statrs::distribution::{ContinuousCDF, FisherSnedecor, Normal, StudentsT};
use statrs::function::{beta::checked_beta_reg, gamma::ln_gamma};

/// Standard Student's t distribution with `df` degrees of freedom.
///
/// Returns `None` if `df` is not positive.
#[must_use]
pub fn students_t(df: f64) -> Option<StudentsT> {
    StudentsT::new(0.0, 1.0, df).ok()
}

/// Two-sided p-value `P(|T| >= |t|)`.
///
/// Infinite statistics give `0.0`; `NaN` propagates.
///
/// ```
/// # use typewise_stats::distribution::{students_t, two_sided_p};
/// let t = students_t(10.0).unwrap();
/// assert!((two_sided_p(&t, 2.0) - 0.073_388_034_771_948).abs() < 1e-9);
/// assert_eq!(two_sided_p(&t, f64::NEG_INFINITY), 0.0);
/// ```
#[must_use]
pub fn two_sided_p(dist: &StudentsT, t: f64) -> f64 {
    if t.is_nan() {
        return f64::NAN;
    }
    (2.0 * dist.sf(t.abs())).min(1.0)
}

/// Quantile function of `dist`, or `NaN` for `p` outside `(0, 1)`.
///
/// ```
/// # use typewise_stats::distribution::{students_t, t_quantile};
/// let t = students_t(10.0).unwrap();
/// assert!((t_quantile(&t, 0.975) - 2.228_138_851_986_273).abs() < 1e-6);
/// assert!(t_quantile(&t, 1.0).is_nan());
/// ```
#[must_use]
pub fn t_quantile(dist: &StudentsT, p: f64) -> f64 {
    if p > 0.0 && p < 1.0 {
        dist.inverse_cdf(p)
    } else {
        f64::NAN
    }
}

/// Survival function `P(F > f)` of the F distribution with `(d1, d2)` degrees of freedom.
///
/// Returns `NaN` for invalid degrees of freedom or a `NaN` statistic.
#[must_use]
pub fn f_sf(d1: f64, d2: f64, f: f64) -> f64 {
    if f.is_nan() {
        return f64::NAN;
    }
    FisherSnedecor::new(d1, d2).map_or(f64::NAN, |dist| dist.sf(f))
}

/// Noncentral t distribution with `df` degrees of freedom and noncentrality `nc`.
///
/// The CDF is evaluated with Lenth's algorithm (AS 243), which sums the
/// Poisson-weighted incomplete beta series until the truncation error bound
/// drops below `1e-12`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoncentralT {
    df: f64,
    nc: f64,
}

const NCT_MAX_ITERATIONS: usize = 1000;
const NCT_ERROR_MAX: f64 = 1e-12;

impl NoncentralT {
    #[must_use]
    pub fn new(df: f64, nc: f64) -> Option<Self> {
        (df.is_finite() && df > 0.0 && nc.is_finite()).then_some(Self { df, nc })
    }

    /// Cumulative distribution function `P(T' <= t)`.
    ///
    /// With `nc = 0` this coincides with the central t distribution:
    ///
    /// ```
    /// # use typewise_stats::distribution::{students_t, ContinuousCDF, NoncentralT};
    /// let nct = NoncentralT::new(10.0, 0.0).unwrap();
    /// let t = students_t(10.0).unwrap();
    /// assert!((nct.cdf(1.7) - t.cdf(1.7)).abs() < 1e-10);
    /// ```
    #[must_use]
    pub fn cdf(&self, t: f64) -> f64 {
        if t.is_nan() {
            return f64::NAN;
        }
        if t == f64::INFINITY {
            return 1.0;
        }
        if t == f64::NEG_INFINITY {
            return 0.0;
        }

        let (tt, del, negdel) = if t >= 0.0 {
            (t, self.nc, false)
        } else {
            (-t, -self.nc, true)
        };

        let normal = Normal::standard();
        let lower = if self.df > 4e5 || del * del > 2.0 * LN_2 * 1021.0 {
            // Normal approximation when the series would underflow
            let s = 1.0 / (4.0 * self.df);
            let z = (tt * (1.0 - s) - del) / (1.0 + tt * tt * 2.0 * s).sqrt();
            normal.cdf(z)
        } else {
            self.series(tt, del) + normal.cdf(-del)
        };

        let value = if negdel { 1.0 - lower } else { lower };
        value.clamp(0.0, 1.0)
    }

    /// Survival function `P(T' > t)`.
    #[must_use]
    pub fn sf(&self, t: f64) -> f64 {
        1.0 - self.cdf(t)
    }

    fn series(&self, tt: f64, del: f64) -> f64 {
        let x = tt * tt / (tt * tt + self.df);
        if x <= 0.0 {
            return 0.0;
        }

        let lambda = del * del;
        let mut p = 0.5 * (-0.5 * lambda).exp();
        if p == 0.0 {
            return 0.0;
        }
        let mut q = (2.0 / PI).sqrt() * p * del;
        let mut s = 0.5 - p;
        if s < 1e-7 {
            s = -0.5 * (-0.5 * lambda).exp_m1();
        }
        let mut a = 0.5;
        let b = 0.5 * self.df;
        let rxb = (1.0 - x).powf(b);
        let albeta = 0.5 * PI.ln() + ln_gamma(b) - ln_gamma(0.5 + b);
        let Ok(mut xodd) = checked_beta_reg(a, b, x) else {
            return f64::NAN;
        };
        let mut godd = 2.0 * rxb * (a * x.ln() - albeta).exp();
        let bx = b * x;
        let mut xeven = if bx < f64::EPSILON { bx } else { 1.0 - rxb };
        let mut geven = bx * rxb;
        let mut tnc = p * xodd + q * xeven;

        for it in 1..=NCT_MAX_ITERATIONS {
            let it = f64_from(it);
            a += 1.0;
            xodd -= godd;
            xeven -= geven;
            godd *= x * (a + b - 1.0) / a;
            geven *= x * (a + b - 0.5) / (a + 0.5);
            p *= lambda / (2.0 * it);
            q *= lambda / (2.0 * it + 1.0);
            tnc += p * xodd + q * xeven;
            s -= p;
            if s < -1e-10 || (s <= 0.0 && it > 1.0) {
                break;
            }
            let error_bound = 2.0 * s * (xodd - godd);
            if error_bound.abs() < NCT_ERROR_MAX {
                break;
            }
        }
        tnc
    }
}

#[expect(clippy::cast_precision_loss)]
fn f64_from(n: usize) -> f64 {
    n as f64
}
