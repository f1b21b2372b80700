//! One-dimensional root finding.

const MAX_ITERATIONS: usize = 200;

/// Finds a root of `f` in `[lo, hi]` by bisection.
///
/// `f(lo)` and `f(hi)` must have opposite signs (or one of them must be
/// zero). Iterates until the bracket is narrower than `tolerance` or the
/// iteration limit is reached, and returns the midpoint of the final
/// bracket.
///
/// # Returns
///
/// * `Some(root)` - if the interval brackets a sign change
/// * `None` - if `f(lo)` and `f(hi)` have the same sign or either is `NaN`
///
/// # Examples
///
/// ```
/// # use typewise_stats::solve::bisect;
/// let root = bisect(|x| x * x - 2.0, 0.0, 2.0, 1e-12).unwrap();
/// assert!((root - 2.0_f64.sqrt()).abs() < 1e-11);
///
/// assert!(bisect(|x| x * x + 1.0, -1.0, 1.0, 1e-12).is_none());
/// ```
pub fn bisect<F>(f: F, mut lo: f64, mut hi: f64, tolerance: f64) -> Option<f64>
where
    F: Fn(f64) -> f64,
{
    let mut f_lo = f(lo);
    let f_hi = f(hi);
    if f_lo.is_nan() || f_hi.is_nan() {
        return None;
    }
    if f_lo == 0.0 {
        return Some(lo);
    }
    if f_hi == 0.0 {
        return Some(hi);
    }
    if f_lo.signum() == f_hi.signum() {
        return None;
    }

    for _ in 0..MAX_ITERATIONS {
        let mid = f64::midpoint(lo, hi);
        if (hi - lo).abs() <= tolerance {
            return Some(mid);
        }
        let f_mid = f(mid);
        if f_mid == 0.0 {
            return Some(mid);
        }
        if f_mid.signum() == f_lo.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }
    Some(f64::midpoint(lo, hi))
}
