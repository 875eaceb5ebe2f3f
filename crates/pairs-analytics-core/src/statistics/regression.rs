//! Ordinary least squares.
//!
//! `ols` solves the normal equations for an arbitrary design matrix and
//! exposes what the unit-root tests need (t-values, AIC, residuals).
//! `simple_linear` and `through_origin` are the closed-form single-regressor
//! fits used by the half-life and hedge-ratio steps.

use nalgebra::{DMatrix, DVector};

/// Result of a multiple OLS regression.
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// Coefficients, in design-matrix column order
    pub params: Vec<f64>,
    /// Standard errors of the coefficients
    pub std_errors: Vec<f64>,
    pub residuals: Vec<f64>,
    /// Sum of squared residuals
    pub ssr: f64,
    pub nobs: usize,
    /// Centered R² when the design has a constant column, uncentered otherwise
    pub r_squared: f64,
}

impl OlsFit {
    pub fn n_params(&self) -> usize {
        self.params.len()
    }

    /// t-statistic of coefficient `i`.
    pub fn t_value(&self, i: usize) -> f64 {
        self.params[i] / self.std_errors[i]
    }

    /// Akaike information criterion of the Gaussian log-likelihood:
    /// `-2 llf + 2k` with `llf = -n/2 (ln 2π + ln(ssr/n) + 1)`.
    pub fn aic(&self) -> f64 {
        let n = self.nobs as f64;
        let llf = -n / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (self.ssr / n).ln() + 1.0);
        -2.0 * llf + 2.0 * self.n_params() as f64
    }
}

/// Fit `y = X b + e` by OLS.
///
/// Returns `None` when there are no residual degrees of freedom or `X'X`
/// is singular.
pub fn ols(y: &[f64], x: &DMatrix<f64>, has_constant: bool) -> Option<OlsFit> {
    let n = y.len();
    let k = x.ncols();
    if x.nrows() != n || k == 0 || n <= k {
        return None;
    }

    let y_vec = DVector::from_column_slice(y);
    let xt = x.transpose();
    let xtx_inv = (&xt * x).try_inverse()?;
    let beta = &xtx_inv * (&xt * &y_vec);

    let fitted = x * &beta;
    let residuals: Vec<f64> = (&y_vec - fitted).iter().copied().collect();
    let ssr: f64 = residuals.iter().map(|r| r * r).sum();

    let sigma2 = ssr / (n - k) as f64;
    let std_errors: Vec<f64> = (0..k)
        .map(|i| (sigma2 * xtx_inv[(i, i)]).max(0.0).sqrt())
        .collect();

    let tss = if has_constant {
        let m = y.iter().sum::<f64>() / n as f64;
        y.iter().map(|v| (v - m) * (v - m)).sum::<f64>()
    } else {
        y.iter().map(|v| v * v).sum::<f64>()
    };
    let r_squared = if tss > 0.0 { 1.0 - ssr / tss } else { f64::NAN };

    if beta.iter().any(|b| !b.is_finite()) {
        return None;
    }

    Some(OlsFit {
        params: beta.iter().copied().collect(),
        std_errors,
        residuals,
        ssr,
        nobs: n,
        r_squared,
    })
}

/// Slope and intercept of `y = a + b x` (a first-degree polynomial fit).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

/// Closed-form OLS with intercept. `None` when `x` has no variance.
pub fn simple_linear(x: &[f64], y: &[f64]) -> Option<LinearFit> {
    let n = x.len();
    if n < 2 || n != y.len() {
        return None;
    }
    let n_f = n as f64;
    let mx = x.iter().sum::<f64>() / n_f;
    let my = y.iter().sum::<f64>() / n_f;
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (a, b) in x.iter().zip(y) {
        sxy += (a - mx) * (b - my);
        sxx += (a - mx) * (a - mx);
    }
    if sxx == 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    Some(LinearFit {
        slope,
        intercept: my - slope * mx,
    })
}

/// Slope of `y = b x` with no intercept. `None` when `x` is identically zero.
pub fn through_origin(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.is_empty() || x.len() != y.len() {
        return None;
    }
    let sxx: f64 = x.iter().map(|v| v * v).sum();
    if sxx == 0.0 {
        return None;
    }
    let sxy: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();
    Some(sxy / sxx)
}

/// Coefficient of determination of `fit` against `(x, y)`.
pub fn r_squared(fit: &LinearFit, x: &[f64], y: &[f64]) -> Option<f64> {
    let n = y.len();
    if n == 0 || n != x.len() {
        return None;
    }
    let my = y.iter().sum::<f64>() / n as f64;
    let tss: f64 = y.iter().map(|v| (v - my) * (v - my)).sum();
    if tss == 0.0 {
        return None;
    }
    let ssr: f64 = x
        .iter()
        .zip(y)
        .map(|(a, b)| {
            let e = b - (fit.intercept + fit.slope * a);
            e * e
        })
        .sum();
    Some(1.0 - ssr / tss)
}
