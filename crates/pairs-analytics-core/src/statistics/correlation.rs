use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::error::{Metric, PairsError};
use crate::PairsResult;

/// Pearson correlation with its two-sided significance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PearsonTest {
    pub correlation: f64,
    /// p-value under the null of zero correlation
    pub p_value: f64,
}

/// Pearson correlation coefficient.
///
/// Returns `None` for mismatched lengths, fewer than two points, or a
/// zero-variance input.
///
/// r = Σ[(xi - x̄)(yi - ȳ)] / √[Σ(xi - x̄)² × Σ(yi - ȳ)²]
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len();
    if n < 2 || n != y.len() {
        return None;
    }
    let n_f = n as f64;
    let mean_x = x.iter().sum::<f64>() / n_f;
    let mean_y = y.iter().sum::<f64>() / n_f;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    let r = cov / (var_x.sqrt() * var_y.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Pearson correlation and its two-sided p-value from the Student-t
/// distribution with `n - 2` degrees of freedom.
pub fn pearson_test(x: &[f64], y: &[f64]) -> PairsResult<PearsonTest> {
    let n = x.len().min(y.len());
    if n < 3 {
        return Err(PairsError::InsufficientData {
            metric: Metric::Correlation,
            required: 3,
            actual: n,
        });
    }
    let r = pearson(x, y).ok_or_else(|| {
        PairsError::computation(Metric::Correlation, "returns series have zero variance")
    })?;

    let dof = (n - 2) as f64;
    let one_minus_r2 = 1.0 - r * r;
    let p_value = if one_minus_r2 <= 0.0 {
        0.0
    } else {
        let t = r * (dof / one_minus_r2).sqrt();
        let dist = StudentsT::new(0.0, 1.0, dof)
            .map_err(|e| PairsError::computation(Metric::Correlation, e.to_string()))?;
        (2.0 * dist.sf(t.abs())).clamp(0.0, 1.0)
    };

    Ok(PearsonTest {
        correlation: r,
        p_value,
    })
}

/// Rolling Pearson correlation over a trailing window.
///
/// Position `i` holds the correlation of `x[i+1-window..=i]` and the same
/// slice of `y`; the first `window - 1` positions, and windows where either
/// side is constant, are NaN.
pub fn rolling_correlation(x: &[f64], y: &[f64], window: usize) -> Vec<f64> {
    let n = x.len().min(y.len());
    (0..n)
        .map(|i| {
            if window < 2 || i + 1 < window {
                return f64::NAN;
            }
            let start = i + 1 - window;
            pearson(&x[start..=i], &y[start..=i]).unwrap_or(f64::NAN)
        })
        .collect()
}
