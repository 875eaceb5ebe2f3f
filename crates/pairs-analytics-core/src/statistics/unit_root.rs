//! Augmented Dickey-Fuller unit-root test.
//!
//! Regression: Δx_t = [c] + γ x_{t-1} + Σ_{i=1..p} δ_i Δx_{t-i} + e_t
//!
//! The lag order p is chosen by minimising AIC over 0..=maxlag on a common
//! sample, with maxlag = ceil(12 (n/100)^{1/4}) capped by the sample size.
//! The test statistic is the t-value of γ; p-values come from the MacKinnon
//! (1994) response surfaces and critical values from MacKinnon (2010).

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

use super::descriptive::diff;
use super::regression::{ols, OlsFit};
use crate::error::{Metric, PairsError};
use crate::PairsResult;

/// Deterministic terms included in the test regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Deterministic {
    /// No constant, no trend
    None,
    /// Constant only
    Constant,
}

impl Deterministic {
    fn n_terms(self) -> usize {
        match self {
            Deterministic::None => 0,
            Deterministic::Constant => 1,
        }
    }
}

/// Critical values at the 1%, 5% and 10% levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalValues {
    pub one_pct: f64,
    pub five_pct: f64,
    pub ten_pct: f64,
}

/// Result of an ADF test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdfTest {
    /// t-statistic of the lagged level coefficient
    #[serde(with = "crate::serde_f64")]
    pub statistic: f64,
    /// MacKinnon approximate p-value
    pub p_value: f64,
    /// Number of lagged differences selected by AIC
    pub used_lag: usize,
    /// Observations used in the final regression
    pub nobs: usize,
    pub critical_values: CriticalValues,
    pub regression: Deterministic,
    /// Best AIC found during lag selection
    #[serde(with = "crate::serde_f64")]
    pub ic_best: f64,
}

// ---------------------------------------------------------------------------
// MacKinnon tables
// ---------------------------------------------------------------------------

/// Response-surface coefficients for one (deterministic terms, N) cell.
struct Surface {
    max_stat: f64,
    min_stat: f64,
    star_stat: f64,
    /// Quadratic in tau, used at or below `star_stat`
    small_p: [f64; 3],
    /// Cubic in tau, used above `star_stat`
    large_p: [f64; 4],
    /// Rows for 1%, 5%, 10%: cubic in 1/nobs
    crit: [[f64; 4]; 3],
}

const SURFACE_N_1: Surface = Surface {
    max_stat: 1.51,
    min_stat: -19.04,
    star_stat: -1.04,
    small_p: [0.6344, 1.2378, 3.2496e-2],
    large_p: [0.4797, 9.3557e-1, -6.999e-2, 3.3066e-2],
    crit: [
        [-2.56574, -2.2358, -3.627, 0.0],
        [-1.94100, -0.2686, -3.365, 31.223],
        [-1.61682, 0.2656, -2.714, 25.364],
    ],
};

const SURFACE_C_1: Surface = Surface {
    max_stat: 2.74,
    min_stat: -18.83,
    star_stat: -1.61,
    small_p: [2.1659, 1.4412, 3.8269e-2],
    large_p: [1.7339, 9.3202e-1, -1.2745e-1, -1.0368e-2],
    crit: [
        [-3.43035, -6.5393, -16.786, -79.433],
        [-2.86154, -2.8903, -4.234, -40.040],
        [-2.56677, -1.5384, -2.809, 0.0],
    ],
};

const SURFACE_C_2: Surface = Surface {
    max_stat: 0.92,
    min_stat: -18.86,
    star_stat: -2.62,
    small_p: [2.92, 1.5012, 3.9796e-2],
    large_p: [2.1945, 6.4695e-1, -2.9198e-1, -4.2377e-2],
    crit: [
        [-3.89644, -10.9519, -33.527, 0.0],
        [-3.33613, -6.1101, -6.823, 0.0],
        [-3.04445, -4.2412, -2.720, 0.0],
    ],
};

fn surface(regression: Deterministic, n_series: usize) -> Option<&'static Surface> {
    match (regression, n_series) {
        (Deterministic::None, 1) => Some(&SURFACE_N_1),
        (Deterministic::Constant, 1) => Some(&SURFACE_C_1),
        (Deterministic::Constant, 2) => Some(&SURFACE_C_2),
        _ => None,
    }
}

fn polyval(coefs: &[f64], x: f64) -> f64 {
    coefs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// MacKinnon (1994) approximate asymptotic p-value for a Dickey-Fuller
/// type statistic with `n_series` integrated variables.
///
/// Supported cells: no constant with one series, constant with one or two.
pub fn mackinnon_p(stat: f64, regression: Deterministic, n_series: usize) -> Option<f64> {
    let s = surface(regression, n_series)?;
    if stat.is_nan() {
        return None;
    }
    if stat > s.max_stat {
        return Some(1.0);
    }
    if stat < s.min_stat {
        return Some(0.0);
    }
    let z = if stat <= s.star_stat {
        polyval(&s.small_p, stat)
    } else {
        polyval(&s.large_p, stat)
    };
    let normal = Normal::new(0.0, 1.0).ok()?;
    Some(normal.cdf(z))
}

/// MacKinnon (2010) finite-sample critical values for `nobs` observations.
pub fn mackinnon_crit(
    regression: Deterministic,
    n_series: usize,
    nobs: usize,
) -> Option<CriticalValues> {
    let s = surface(regression, n_series)?;
    let inv = 1.0 / nobs as f64;
    Some(CriticalValues {
        one_pct: polyval(&s.crit[0], inv),
        five_pct: polyval(&s.crit[1], inv),
        ten_pct: polyval(&s.crit[2], inv),
    })
}

// ---------------------------------------------------------------------------
// Test
// ---------------------------------------------------------------------------

/// ADF test with AIC lag selection, reported against a single series.
pub fn adf(series: &[f64], regression: Deterministic) -> PairsResult<AdfTest> {
    let core = adf_core(series, regression, Metric::Stationarity)?;
    let p_value = mackinnon_p(core.statistic, regression, 1)
        .ok_or_else(|| PairsError::computation(Metric::Stationarity, "p-value undefined"))?;
    let critical_values = mackinnon_crit(regression, 1, core.nobs).ok_or_else(|| {
        PairsError::computation(Metric::Stationarity, "no critical values for regression")
    })?;
    Ok(AdfTest {
        statistic: core.statistic,
        p_value,
        used_lag: core.used_lag,
        nobs: core.nobs,
        critical_values,
        regression,
        ic_best: core.ic_best,
    })
}

/// Statistic, lag and sample size of an ADF regression, before any
/// p-value lookup (the caller knows how many series are involved).
#[derive(Debug, Clone, Copy)]
pub(crate) struct AdfCore {
    pub statistic: f64,
    pub used_lag: usize,
    pub nobs: usize,
    pub ic_best: f64,
}

/// Default maximum lag: ceil(12 (n/100)^{1/4}), capped at n/2 - terms - 1.
pub fn default_max_lag(nobs: usize, regression: Deterministic) -> Option<usize> {
    let schwert = (12.0 * (nobs as f64 / 100.0).powf(0.25)).ceil() as usize;
    let cap = (nobs / 2).checked_sub(regression.n_terms() + 1)?;
    Some(schwert.min(cap))
}

pub(crate) fn adf_core(
    series: &[f64],
    regression: Deterministic,
    metric: Metric,
) -> PairsResult<AdfCore> {
    let n = series.len();
    let required = 2 * (regression.n_terms() + 1) + 2;
    if n < required {
        return Err(PairsError::InsufficientData {
            metric,
            required,
            actual: n,
        });
    }
    if series.iter().any(|v| !v.is_finite()) {
        return Err(PairsError::computation(metric, "series contains non-finite values"));
    }
    if series.iter().all(|v| *v == series[0]) {
        return Err(PairsError::computation(metric, "series is constant"));
    }

    let max_lag = default_max_lag(n, regression).ok_or(PairsError::InsufficientData {
        metric,
        required,
        actual: n,
    })?;
    let xdiff = diff(series);

    // Lag selection on the sample that the largest lag allows.
    let mut best: Option<(f64, usize)> = None;
    for lag in 0..=max_lag {
        let (y, x) = design(series, &xdiff, lag, max_lag, regression);
        let Some(fit) = ols(&y, &x, regression != Deterministic::None) else {
            continue;
        };
        let aic = fit.aic();
        if aic.is_nan() {
            continue;
        }
        if best.map_or(true, |(b, _)| aic < b) {
            best = Some((aic, lag));
        }
    }
    let (ic_best, used_lag) =
        best.ok_or_else(|| PairsError::computation(metric, "lag selection regressions are singular"))?;

    // Refit on the longest sample available for the chosen lag.
    let (y, x) = design(series, &xdiff, used_lag, used_lag, regression);
    let fit: OlsFit = ols(&y, &x, regression != Deterministic::None)
        .ok_or_else(|| PairsError::computation(metric, "test regression is singular"))?;
    let statistic = fit.t_value(0);
    if statistic.is_nan() {
        return Err(PairsError::computation(metric, "test statistic is undefined"));
    }

    debug!(
        %metric,
        statistic,
        used_lag,
        max_lag,
        nobs = fit.nobs,
        "ADF regression fitted"
    );

    Ok(AdfCore {
        statistic,
        used_lag,
        nobs: fit.nobs,
        ic_best,
    })
}

/// Dependent vector and regressors for lag order `lag`, dropping the first
/// `skip` differences so that fits with different lags share a sample.
/// Column 0 is the lagged level, then `lag` lagged differences, then the
/// constant (if any).
fn design(
    series: &[f64],
    xdiff: &[f64],
    lag: usize,
    skip: usize,
    regression: Deterministic,
) -> (Vec<f64>, DMatrix<f64>) {
    let rows: Vec<usize> = (skip..xdiff.len()).collect();
    let ncols = 1 + lag + regression.n_terms();
    let y: Vec<f64> = rows.iter().map(|&t| xdiff[t]).collect();
    let x = DMatrix::from_fn(rows.len(), ncols, |r, c| {
        let t = rows[r];
        if c == 0 {
            series[t]
        } else if c <= lag {
            xdiff[t - c]
        } else {
            1.0
        }
    });
    (y, x)
}
