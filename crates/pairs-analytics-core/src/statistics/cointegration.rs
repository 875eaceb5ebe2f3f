//! Engle-Granger two-step cointegration test.
//!
//! 1. Cointegrating regression y0 = a + b y1 + u by OLS.
//! 2. ADF (no deterministic terms, AIC lag selection) on the residuals u.
//!
//! The statistic is compared against the MacKinnon surfaces for two
//! integrated series with a constant. When y0 is (almost) an exact linear
//! function of y1 the residuals carry no information, the statistic is
//! reported as -inf and the result is flagged `collinear`.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::regression::ols;
use super::unit_root::{adf_core, mackinnon_crit, mackinnon_p, CriticalValues, Deterministic};
use crate::error::{Metric, PairsError};
use crate::PairsResult;

/// R² at or above `1 - COLLINEAR_TOLERANCE` counts as an exact linear relation.
const COLLINEAR_TOLERANCE: f64 = 100.0 * 1.490_116_119_384_765_6e-8;

/// Number of integrated series in a pairwise test.
const N_SERIES: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CointegrationTest {
    /// ADF t-statistic on the cointegrating residuals (more negative = stronger)
    #[serde(with = "crate::serde_f64")]
    pub statistic: f64,
    /// MacKinnon asymptotic p-value
    #[serde(with = "crate::serde_f64")]
    pub p_value: f64,
    pub critical_values: CriticalValues,
    /// Intercept of the cointegrating regression
    pub intercept: f64,
    /// Slope of the cointegrating regression
    pub slope: f64,
    /// Lagged differences used in the residual ADF regression
    pub used_lag: Option<usize>,
    /// The two series are an exact linear function of each other
    pub collinear: bool,
}

/// Test whether `y0` and `y1` are cointegrated.
pub fn engle_granger(y0: &[f64], y1: &[f64]) -> PairsResult<CointegrationTest> {
    let n = y0.len();
    if n != y1.len() {
        return Err(PairsError::InvalidInput {
            field: "y1".into(),
            reason: format!("length {} does not match y0 length {}", y1.len(), n),
        });
    }
    if n < 4 {
        return Err(PairsError::InsufficientData {
            metric: Metric::Cointegration,
            required: 4,
            actual: n,
        });
    }

    let design = DMatrix::from_fn(n, 2, |r, c| if c == 0 { 1.0 } else { y1[r] });
    let fit = ols(y0, &design, true).ok_or_else(|| {
        PairsError::computation(Metric::Cointegration, "cointegrating regression is singular")
    })?;
    let intercept = fit.params[0];
    let slope = fit.params[1];

    let critical_values = mackinnon_crit(Deterministic::Constant, N_SERIES, n - 1)
        .ok_or_else(|| PairsError::computation(Metric::Cointegration, "no critical values"))?;

    if fit.r_squared >= 1.0 - COLLINEAR_TOLERANCE {
        warn!(
            r_squared = fit.r_squared,
            "Series are (almost) perfectly collinear; cointegration test is not reliable"
        );
        return Ok(CointegrationTest {
            statistic: f64::NEG_INFINITY,
            p_value: 0.0,
            critical_values,
            intercept,
            slope,
            used_lag: None,
            collinear: true,
        });
    }

    let core = adf_core(&fit.residuals, Deterministic::None, Metric::Cointegration)?;
    let p_value = mackinnon_p(core.statistic, Deterministic::Constant, N_SERIES)
        .ok_or_else(|| PairsError::computation(Metric::Cointegration, "p-value undefined"))?;

    debug!(
        statistic = core.statistic,
        p_value,
        slope,
        "Engle-Granger test complete"
    );

    Ok(CointegrationTest {
        statistic: core.statistic,
        p_value,
        critical_values,
        intercept,
        slope,
        used_lag: Some(core.used_lag),
        collinear: false,
    })
}
