use crate::{
    descriptive::{mean, sample_std_dev},
    distribution::{students_t, t_quantile, two_sided_p},
};

/// Denominator guard for the standardized effect size.
///
/// Keeps `dz` finite when every difference is identical.
pub const EFFECT_SIZE_EPSILON: f64 = 1e-12;

/// Confidence level of [`PairedTTest::ci`].
pub const CONFIDENCE_LEVEL: f64 = 0.95;

/// Result of a two-sided paired t-test on matched observations `(a, b)`.
///
/// Differences are taken as `a - b`. All dispersion measures use the
/// sample (`n - 1`) correction.
#[derive(Debug, Clone, PartialEq)]
pub struct PairedTTest {
    /// Number of pairs.
    pub n: usize,
    /// Mean of the first members.
    pub mean_a: f64,
    /// Mean of the second members.
    pub mean_b: f64,
    /// Mean of the differences `a - b`.
    pub mean_diff: f64,
    /// Sample standard deviation of the differences.
    pub sd_diff: f64,
    /// Paired t statistic with `n - 1` degrees of freedom.
    pub t: f64,
    /// Two-sided p-value.
    pub p: f64,
    /// Cohen's `dz`: mean difference over the standard deviation of differences.
    pub dz: f64,
    /// 95% confidence interval for the mean difference.
    pub ci: (f64, f64),
}

impl PairedTTest {
    /// Runs the paired t-test.
    ///
    /// # Returns
    ///
    /// * `Some(PairedTTest)` - if there are at least two pairs
    /// * `None` - if there are fewer than two pairs (the variance of the
    ///   differences is undefined)
    ///
    /// When all differences are identical the standard error is zero: `t`
    /// becomes infinite (`p = 0`) for a nonzero mean difference or `NaN`
    /// for a zero one, while `dz` stays finite.
    ///
    /// # Examples
    ///
    /// ```
    /// # use typewise_stats::paired::PairedTTest;
    /// let pairs = [(52.0, 48.0), (61.0, 55.0), (47.0, 46.0), (58.0, 51.0), (50.0, 49.0)];
    /// let test = PairedTTest::new(pairs).unwrap();
    /// assert_eq!(test.n, 5);
    /// assert!((test.mean_diff - 3.8).abs() < 1e-12);
    /// assert!(test.ci.0 < test.mean_diff && test.mean_diff < test.ci.1);
    ///
    /// assert!(PairedTTest::new([(1.0, 2.0)]).is_none());
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new<I>(pairs: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let (a, b): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        let n = a.len();
        if n < 2 {
            return None;
        }

        let diff = a.iter().zip(&b).map(|(a, b)| a - b).collect::<Vec<_>>();
        let mean_a = mean(&a)?;
        let mean_b = mean(&b)?;
        let mean_diff = mean(&diff)?;
        let sd_diff = sample_std_dev(&diff)?;

        let dist = students_t((n - 1) as f64)?;
        let se = sd_diff / (n as f64).sqrt();
        let t = mean_diff / se;
        let p = two_sided_p(&dist, t);
        let dz = mean_diff / (sd_diff + EFFECT_SIZE_EPSILON);

        let t_crit = t_quantile(&dist, 0.5 + CONFIDENCE_LEVEL / 2.0);
        let margin = t_crit * se;
        let ci = (mean_diff - margin, mean_diff + margin);

        Some(Self {
            n,
            mean_a,
            mean_b,
            mean_diff,
            sd_diff,
            t,
            p,
            dz,
            ci,
        })
    }
}
