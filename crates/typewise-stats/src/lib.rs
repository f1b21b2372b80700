//! Statistical routines for the typewise typing-study toolkit.
//!
//! This crate provides the numerical core of the analysis on top of
//! [`statrs`] distributions and [`nalgebra`] linear algebra:
//!
//! - **Descriptive statistics**: Sample mean, median, variance, standard deviation
//! - **Distributions**: Normal, Student's t, F and noncentral t distributions
//! - **Paired t-test**: Mean difference, t statistic, p-value, Cohen's dz and confidence interval
//! - **Z-scores**: Standard scores and outlier flags
//! - **Regression**: Ordinary least squares with inference statistics
//! - **Power analysis**: Power and required sample size for the paired t-test
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing samples
//! - [`distribution`]: Probability distributions used for hypothesis testing
//! - [`paired`]: Paired t-test on matched observations
//! - [`zscore`]: Standard scores and z-score outlier detection
//! - [`regression`]: Ordinary least squares
//! - [`power`]: Power analysis for the paired t-test
//! - [`solve`]: One-dimensional root finding
//!
//! # Examples
//!
//! ## Comparing matched observations
//!
//! ```
//! use typewise_stats::paired::PairedTTest;
//!
//! let pairs = [(41.0, 38.0), (45.0, 44.0), (39.5, 35.0), (50.0, 47.5)];
//! let test = PairedTTest::new(pairs).unwrap();
//! assert!(test.mean_diff > 0.0);
//! assert!(test.p > 0.0 && test.p < 1.0);
//! ```
//!
//! ## Planning a sample size
//!
//! ```
//! use typewise_stats::power::PairedTTestPower;
//!
//! let analysis = PairedTTestPower::new(0.05).unwrap();
//! let n = analysis.solve_sample_size(0.5, 0.80).unwrap();
//! assert!(n > 30.0 && n < 35.0);
//! ```

pub mod descriptive;
pub mod distribution;
pub mod paired;
pub mod power;
pub mod regression;
pub mod solve;
pub mod zscore;
