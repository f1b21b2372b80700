//! Ordinary least squares regression.
//!
//! [`OlsFit::fit`] estimates a model with an intercept and any number of
//! named regressors through the SVD pseudo-inverse of the design matrix, then
//! derives the usual inference quantities: coefficient standard errors, t
//! statistics, two-sided p-values and 95% confidence intervals, R-squared,
//! the overall F test, and the Gaussian log-likelihood with AIC/BIC.
//!
//! A rank-deficient design still produces a fit: aliased directions get the
//! minimum-norm solution, and the model and residual degrees of freedom are
//! taken from the numerical rank.
//!
//! # Examples
//!
//! ```
//! use typewise_stats::regression::OlsFit;
//!
//! // y = 1 + 2x with a little noise
//! let x = [[0.0], [1.0], [2.0], [3.0], [4.0]];
//! let y = [1.1, 2.9, 5.2, 6.8, 9.1];
//! let fit = OlsFit::fit(&["x"], &x, &y).unwrap();
//!
//! assert_eq!(fit.coefficients[0].name, "Intercept");
//! assert!((fit.coefficients[1].estimate - 1.99).abs() < 1e-9);
//! assert!(fit.r_squared > 0.99);
//! assert!(!fit.is_rank_deficient());
//! ```

use nalgebra::{DMatrix, DVector};

use crate::distribution::{f_sf, students_t, t_quantile, two_sided_p};

/// Name given to the constant term.
pub const INTERCEPT: &str = "Intercept";

/// Error raised when a model cannot be fitted.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum OlsError {
    /// A design row does not have one value per regressor, or `y` has a different length.
    #[display("design matrix and response have inconsistent dimensions")]
    DimensionMismatch,
    /// Not enough observations to estimate the residual variance.
    #[display("{observations} observations are not enough to fit {parameters} parameters")]
    TooFewObservations {
        observations: usize,
        parameters: usize,
    },
    /// The singular value decomposition could not be inverted.
    #[display("pseudo-inverse failed: {reason}")]
    Decomposition { reason: &'static str },
}

/// One estimated coefficient with its inference statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Coefficient {
    pub name: String,
    pub estimate: f64,
    pub std_err: f64,
    pub t: f64,
    pub p: f64,
    /// 95% confidence interval.
    pub ci: (f64, f64),
}

/// Fitted ordinary least squares model.
#[derive(Debug, Clone, PartialEq)]
pub struct OlsFit {
    /// Intercept first, then regressors in the order they were given.
    pub coefficients: Vec<Coefficient>,
    pub n_obs: usize,
    /// Numerical rank of the design matrix, intercept included.
    pub rank: usize,
    /// Rank minus one for the intercept.
    pub df_model: usize,
    pub df_resid: usize,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub f_statistic: f64,
    pub f_p_value: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    /// Sum of squared residuals.
    pub ssr: f64,
}

impl OlsFit {
    /// Fits `y ~ 1 + x_1 + ... + x_k`.
    ///
    /// # Arguments
    ///
    /// * `names` - Regressor names, one per column of `rows`
    /// * `rows` - Design rows without the intercept column
    /// * `y` - Response values, one per row
    #[expect(clippy::cast_precision_loss)]
    pub fn fit<R>(names: &[&str], rows: &[R], y: &[f64]) -> Result<Self, OlsError>
    where
        R: AsRef<[f64]>,
    {
        let k = names.len();
        let p = k + 1;
        let n = rows.len();
        if y.len() != n || rows.iter().any(|row| row.as_ref().len() != k) {
            return Err(OlsError::DimensionMismatch);
        }
        if n <= p {
            return Err(OlsError::TooFewObservations {
                observations: n,
                parameters: p,
            });
        }

        let x = DMatrix::from_fn(n, p, |i, j| {
            if j == 0 { 1.0 } else { rows[i].as_ref()[j - 1] }
        });
        let y = DVector::from_column_slice(y);

        let svd = x.clone().svd(true, true);
        let tolerance = svd.singular_values.max() * n.max(p) as f64 * f64::EPSILON;
        let rank = svd.rank(tolerance);
        let pinv = svd
            .pseudo_inverse(tolerance)
            .map_err(|reason| OlsError::Decomposition { reason })?;
        let beta = &pinv * &y;
        let cov_unscaled = &pinv * pinv.transpose();

        let residuals = &y - &x * &beta;
        let ssr = residuals.norm_squared();
        let y_mean = y.mean();
        let tss = y.iter().map(|yi| (yi - y_mean).powi(2)).sum::<f64>();

        let df_model = rank.saturating_sub(1);
        let df_resid = n - rank;
        let nf = n as f64;
        let sigma2 = ssr / df_resid as f64;
        let r_squared = 1.0 - ssr / tss;
        let adj_r_squared = 1.0 - (nf - 1.0) / df_resid as f64 * (1.0 - r_squared);
        let (f_statistic, f_p_value) = if df_model == 0 {
            (f64::NAN, f64::NAN)
        } else {
            let f = ((tss - ssr) / df_model as f64) / sigma2;
            (f, f_sf(df_model as f64, df_resid as f64, f))
        };

        let t_dist = students_t(df_resid as f64).ok_or(OlsError::TooFewObservations {
            observations: n,
            parameters: rank,
        })?;
        let t_crit = t_quantile(&t_dist, 0.975);

        let coefficients = std::iter::once(INTERCEPT)
            .chain(names.iter().copied())
            .enumerate()
            .map(|(i, name)| {
                let estimate = beta[i];
                let std_err = (sigma2 * cov_unscaled[(i, i)]).max(0.0).sqrt();
                let t = estimate / std_err;
                Coefficient {
                    name: name.to_owned(),
                    estimate,
                    std_err,
                    t,
                    p: two_sided_p(&t_dist, t),
                    ci: (estimate - t_crit * std_err, estimate + t_crit * std_err),
                }
            })
            .collect();

        let log_likelihood =
            -nf / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (ssr / nf).ln() + 1.0);
        let aic = -2.0 * log_likelihood + 2.0 * rank as f64;
        let bic = -2.0 * log_likelihood + rank as f64 * nf.ln();

        Ok(Self {
            coefficients,
            n_obs: n,
            rank,
            df_model,
            df_resid,
            r_squared,
            adj_r_squared,
            f_statistic,
            f_p_value,
            log_likelihood,
            aic,
            bic,
            ssr,
        })
    }

    /// Whether some coefficients are not separately identifiable.
    #[must_use]
    pub fn is_rank_deficient(&self) -> bool {
        self.rank < self.coefficients.len()
    }

    /// Looks up a coefficient by name.
    #[must_use]
    pub fn coefficient(&self, name: &str) -> Option<&Coefficient> {
        self.coefficients.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_recovery_of_coefficients() {
        // y = 3 + 2 a - 1 b + 0.5 a b, every cell observed twice with symmetric noise
        let mut rows = vec![];
        let mut y = vec![];
        for &(a, b) in &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)] {
            for noise in [-0.1, 0.1] {
                rows.push([a, b, a * b]);
                y.push(3.0 + 2.0 * a - b + 0.5 * a * b + noise);
            }
        }
        let fit = OlsFit::fit(&["a", "b", "ab"], &rows, &y).unwrap();

        let expected = [3.0, 2.0, -1.0, 0.5];
        for (coef, expected) in fit.coefficients.iter().zip(expected) {
            assert!((coef.estimate - expected).abs() < 1e-10, "{}", coef.name);
            assert!(coef.ci.0 < coef.estimate && coef.estimate < coef.ci.1);
        }
        assert_eq!(fit.n_obs, 8);
        assert_eq!(fit.rank, 4);
        assert_eq!(fit.df_model, 3);
        assert_eq!(fit.df_resid, 4);
        // Residuals are +/- 0.1 everywhere
        assert!((fit.ssr - 0.08).abs() < 1e-10);
        // Each coefficient's standard error follows from sigma^2 = 0.02
        let intercept = fit.coefficient(INTERCEPT).unwrap();
        assert!((intercept.std_err - (0.02_f64 / 2.0).sqrt()).abs() < 1e-10);
    }

    #[test]
    fn test_simple_regression_statistics() {
        let rows = [[1.0], [2.0], [3.0], [4.0], [5.0], [6.0]];
        let y = [2.0, 4.1, 5.9, 8.2, 9.8, 12.1];
        let fit = OlsFit::fit(&["x"], &rows, &y).unwrap();

        // For a single regressor F equals t^2
        let slope = fit.coefficient("x").unwrap();
        assert!((fit.f_statistic - slope.t * slope.t).abs() < 1e-6 * fit.f_statistic);
        assert!((fit.f_p_value - slope.p).abs() < 1e-10);
        assert!(fit.r_squared > 0.99 && fit.r_squared <= 1.0);
        assert!(fit.adj_r_squared < fit.r_squared);
        assert!((fit.aic - (-2.0 * fit.log_likelihood + 4.0)).abs() < 1e-12);
    }

    #[test]
    fn test_rank_deficient_design_uses_minimum_norm_solution() {
        // Second regressor is constant zero
        let rows = [[0.0, 0.0], [1.0, 0.0], [0.0, 0.0], [1.0, 0.0], [1.0, 0.0]];
        let y = [1.0, 2.0, 1.5, 2.5, 2.0];
        let fit = OlsFit::fit(&["a", "b"], &rows, &y).unwrap();

        assert!(fit.is_rank_deficient());
        assert_eq!(fit.rank, 2);
        assert_eq!(fit.df_model, 1);
        assert_eq!(fit.df_resid, 3);
        // Identifiable part matches the reduced model y ~ 1 + a
        let intercept = fit.coefficient(INTERCEPT).unwrap();
        let a = fit.coefficient("a").unwrap();
        assert!((intercept.estimate - 1.25).abs() < 1e-10);
        assert!((a.estimate - (6.5 / 3.0 - 1.25)).abs() < 1e-10);
        // The aliased column gets zero weight
        let b = fit.coefficient("b").unwrap();
        assert!(b.estimate.abs() < 1e-10);
        assert!(b.std_err.abs() < 1e-10);
    }

    #[test]
    fn test_too_few_observations() {
        let rows = [[0.0], [1.0]];
        let y = [1.0, 2.0];
        assert_eq!(
            OlsFit::fit(&["x"], &rows, &y),
            Err(OlsError::TooFewObservations {
                observations: 2,
                parameters: 2
            })
        );
    }

    #[test]
    fn test_dimension_mismatch() {
        let rows = [[0.0], [1.0], [2.0]];
        assert_eq!(
            OlsFit::fit(&["x"], &rows, &[1.0, 2.0]),
            Err(OlsError::DimensionMismatch)
        );
    }
}
