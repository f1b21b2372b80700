use crate::descriptive::{mean, sample_std_dev};

/// Standard scores `(x - mean) / sd` using the sample standard deviation.
///
/// # Returns
///
/// * `Some(scores)` - one score per input value, in input order. A sample
///   without spread (zero standard deviation) scores `0.0` everywhere.
/// * `None` - if there are fewer than two values
///
/// # Examples
///
/// ```
/// # use typewise_stats::zscore::z_scores;
/// let scores = z_scores(&[1.0, 2.0, 3.0]).unwrap();
/// assert_eq!(scores, vec![-1.0, 0.0, 1.0]);
///
/// assert_eq!(z_scores(&[5.0, 5.0]), Some(vec![0.0, 0.0]));
/// assert_eq!(z_scores(&[5.0]), None);
/// ```
#[must_use]
pub fn z_scores(values: &[f64]) -> Option<Vec<f64>> {
    let mean = mean(values)?;
    let sd = sample_std_dev(values)?;
    if sd == 0.0 {
        return Some(vec![0.0; values.len()]);
    }
    Some(values.iter().map(|v| (v - mean) / sd).collect())
}

/// Flags values whose absolute z-score is strictly greater than `threshold`.
///
/// Values exactly at the threshold are not flagged. Samples with fewer than
/// two values are never flagged.
///
/// ```
/// # use typewise_stats::zscore::outlier_mask;
/// let mut values = vec![10.0; 20];
/// values.push(100.0);
/// let mask = outlier_mask(&values, 3.0);
/// assert!(mask[20]);
/// assert!(mask[..20].iter().all(|flag| !flag));
/// ```
#[must_use]
pub fn outlier_mask(values: &[f64], threshold: f64) -> Vec<bool> {
    match z_scores(values) {
        Some(scores) => scores.iter().map(|z| z.abs() > threshold).collect(),
        None => vec![false; values.len()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scores_have_unit_sample_variance() {
        let values = [3.0, 7.0, 7.0, 19.0, 24.0];
        let scores = z_scores(&values).unwrap();
        let sum = scores.iter().sum::<f64>();
        let ss = scores.iter().map(|z| z * z).sum::<f64>();
        assert!(sum.abs() < 1e-12);
        assert!((ss / 4.0 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_threshold_is_strict() {
        // [-1, 1] has sample sd sqrt(2), so both scores are +/- 1/sqrt(2)
        let values = [-1.0, 1.0];
        let z = 1.0 / 2.0_f64.sqrt();
        let scores = z_scores(&values).unwrap();
        assert!((scores[1] - z).abs() < 1e-15);

        let at_threshold = outlier_mask(&values, scores[1]);
        assert_eq!(at_threshold, vec![false, false]);
        let below_threshold = outlier_mask(&values, scores[1] - 1e-9);
        assert_eq!(below_threshold, vec![true, true]);
    }

    #[test]
    fn test_small_samples_pass_through() {
        assert_eq!(outlier_mask(&[], 3.0), Vec::<bool>::new());
        assert_eq!(outlier_mask(&[1e9], 0.0), vec![false]);
    }

    #[test]
    fn test_constant_sample_has_no_outliers() {
        assert_eq!(outlier_mask(&[4.0; 6], 0.5), vec![false; 6]);
    }
}
