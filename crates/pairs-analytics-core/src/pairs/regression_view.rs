use serde::{Deserialize, Serialize};

use crate::pairs::evaluation::{PairMetrics, ReturnsRegression};

/// Points drawn along the fitted line unless the caller asks otherwise.
pub const DEFAULT_LINE_POINTS: usize = 100;

/// Scatter of returns B (x) against returns A (y) with the fitted line and
/// the statistics shown next to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionView {
    pub scatter: Vec<(f64, f64)>,
    pub line: Vec<(f64, f64)>,
    pub regression: ReturnsRegression,
    pub correlation: f64,
    pub p_value: f64,
}

impl PairMetrics {
    /// `points` evenly spaced `(x, ŷ)` pairs spanning the observed range of
    /// returns B, inclusive of both ends.
    pub fn regression_line(&self, points: usize) -> Vec<(f64, f64)> {
        let (lo, hi) = match min_max(&self.returns_b) {
            Some(range) => range,
            None => return Vec::new(),
        };
        linspace(lo, hi, points)
            .into_iter()
            .map(|x| (x, self.returns_regression.predict(x)))
            .collect()
    }

    pub fn regression_view(&self) -> RegressionView {
        RegressionView {
            scatter: self
                .returns_b
                .iter()
                .copied()
                .zip(self.returns_a.iter().copied())
                .collect(),
            line: self.regression_line(DEFAULT_LINE_POINTS),
            regression: self.returns_regression,
            correlation: self.correlation,
            p_value: self.correlation_pvalue,
        }
    }
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let mut finite = values.iter().copied().filter(|v| v.is_finite());
    let first = finite.next()?;
    Some(finite.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
}

fn linspace(lo: f64, hi: f64, points: usize) -> Vec<f64> {
    match points {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (points - 1) as f64;
            (0..points)
                .map(|i| if i == points - 1 { hi } else { lo + step * i as f64 })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::config::EvaluationConfig;
    use crate::pairs::alignment::align;
    use crate::pairs::evaluation::evaluate_pair;
    use crate::types::TimeSeries;

    fn evaluated_pair() -> PairMetrics {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut rng = StdRng::seed_from_u64(12);
        let mut level = 80.0;
        let mut noise = 0.0;
        let mut a = Vec::new();
        let mut b = Vec::new();
        for i in 0..200 {
            let date = start + chrono::Duration::days(i);
            level += rng.gen_range(-0.5..0.5);
            noise = 0.6 * noise + rng.gen_range(-0.5..0.5);
            a.push((date, 1.2 * level + noise));
            b.push((date, level));
        }
        let a = TimeSeries::from_pairs(a).unwrap();
        let b = TimeSeries::from_pairs(b).unwrap();
        let aligned = align(Some(&a), Some(&b)).unwrap();
        evaluate_pair(&aligned, "A-B", &EvaluationConfig::default()).unwrap()
    }

    #[test]
    fn test_regression_line_spans_returns_range() {
        let m = evaluated_pair();
        let line = m.regression_line(DEFAULT_LINE_POINTS);
        assert_eq!(line.len(), 100);

        let lo = m.returns_b.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = m.returns_b.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(line[0].0, lo);
        assert_eq!(line[99].0, hi);
        for (x, y) in &line {
            let expected = m.returns_regression.intercept + m.returns_regression.slope * x;
            assert!((y - expected).abs() < 1e-15);
        }
        assert!(line.windows(2).all(|w| w[0].0 <= w[1].0));
    }

    #[test]
    fn test_regression_view_matches_metrics() {
        let m = evaluated_pair();
        let view = m.regression_view();
        assert_eq!(view.scatter.len(), m.returns_a.len());
        assert_eq!(view.scatter[0], (m.returns_b[0], m.returns_a[0]));
        assert_eq!(view.line.len(), DEFAULT_LINE_POINTS);
        assert_eq!(view.regression, m.returns_regression);
        assert_eq!(view.correlation, m.correlation);
        assert_eq!(view.p_value, m.correlation_pvalue);
    }

    #[test]
    fn test_regression_line_without_returns() {
        let mut m = evaluated_pair();
        m.returns_b.clear();
        assert!(m.regression_line(10).is_empty());
    }

    #[test]
    fn test_linspace_endpoints() {
        let xs = linspace(-0.02, 0.03, 6);
        assert_eq!(xs.len(), 6);
        assert_eq!(xs[0], -0.02);
        assert_eq!(xs[5], 0.03);
        assert!((xs[1] - (-0.01)).abs() < 1e-15);
    }

    #[test]
    fn test_linspace_degenerate() {
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(0.5, 1.0, 1), vec![0.5]);
    }

    #[test]
    fn test_min_max_skips_nan() {
        assert_eq!(min_max(&[f64::NAN, 2.0, -1.0, 3.0]), Some((-1.0, 3.0)));
        assert_eq!(min_max(&[]), None);
    }
}
