//! Descriptive statistics over `f64` slices.
//!
//! Every function returns `None` instead of a NaN when the input cannot
//! support the statistic, so callers decide which error to raise.

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Variance with `ddof` delta degrees of freedom (0 = population, 1 = sample).
pub fn variance(values: &[f64], ddof: usize) -> Option<f64> {
    let n = values.len();
    if n <= ddof {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some(ss / (n - ddof) as f64)
}

pub fn std_dev(values: &[f64], ddof: usize) -> Option<f64> {
    variance(values, ddof).map(f64::sqrt)
}

/// Covariance of two equal-length slices with `ddof` delta degrees of freedom.
pub fn covariance(x: &[f64], y: &[f64], ddof: usize) -> Option<f64> {
    let n = x.len();
    if n != y.len() || n <= ddof {
        return None;
    }
    let mx = mean(x)?;
    let my = mean(y)?;
    let s: f64 = x.iter().zip(y).map(|(a, b)| (a - mx) * (b - my)).sum();
    Some(s / (n - ddof) as f64)
}

/// Percentile `p` (0..=100) with linear interpolation between closest ranks.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=100.0).contains(&p) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    Some(percentile_sorted(&sorted, p))
}

/// Percentile from an already **sorted**, non-empty slice.
fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = rank - lower as f64;
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

/// Single-period percentage change `p_t / p_{t-1} - 1`, leading value dropped.
pub fn pct_change(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

/// First differences `x_t - x_{t-1}`.
pub fn diff(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_mean_and_variance() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&v).unwrap() - 5.0).abs() < EPS);
        assert!((variance(&v, 0).unwrap() - 4.0).abs() < EPS);
        assert!((std_dev(&v, 0).unwrap() - 2.0).abs() < EPS);
        assert!((variance(&v, 1).unwrap() - 32.0 / 7.0).abs() < EPS);
    }

    #[test]
    fn test_empty_inputs_yield_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(variance(&[1.0], 1), None);
        assert_eq!(percentile(&[], 5.0), None);
        assert_eq!(covariance(&[1.0, 2.0], &[1.0], 0), None);
    }

    #[test]
    fn test_covariance_matches_variance_on_self() {
        let v = [1.0, 3.0, 2.0, 8.0, 5.0];
        let cov = covariance(&v, &v, 1).unwrap();
        assert!((cov - variance(&v, 1).unwrap()).abs() < EPS);
    }

    #[test]
    fn test_percentile_interpolates() {
        // numpy.percentile([1, 2, 3, 4, 5], 5) == 1.2
        let v = [5.0, 3.0, 1.0, 4.0, 2.0];
        assert!((percentile(&v, 5.0).unwrap() - 1.2).abs() < EPS);
        assert!((percentile(&v, 50.0).unwrap() - 3.0).abs() < EPS);
        assert!((percentile(&v, 100.0).unwrap() - 5.0).abs() < EPS);
        assert_eq!(percentile(&v, 101.0), None);
    }

    #[test]
    fn test_pct_change_drops_leading_value() {
        let r = pct_change(&[100.0, 110.0, 99.0]);
        assert_eq!(r.len(), 2);
        assert!((r[0] - 0.1).abs() < EPS);
        assert!((r[1] + 0.1).abs() < EPS);
    }

    #[test]
    fn test_diff() {
        assert_eq!(diff(&[1.0, 4.0, 2.0]), vec![3.0, -2.0]);
        assert!(diff(&[1.0]).is_empty());
    }
}
