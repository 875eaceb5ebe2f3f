use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::EvaluationConfig;
use crate::error::{Metric, PairsError};
use crate::pairs::alignment::{align, AlignedPair};
use crate::pairs::suitability::{check_suitability, ScreeningStatistics, Verdict};
use crate::statistics::cointegration::{engle_granger, CointegrationTest};
use crate::statistics::correlation::{pearson_test, rolling_correlation};
use crate::statistics::descriptive::{covariance, diff, mean, percentile, std_dev, variance};
use crate::statistics::regression::{r_squared, simple_linear, through_origin};
use crate::statistics::unit_root::{adf, AdfTest, Deterministic};
use crate::types::TimeSeries;
use crate::PairsResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Fewest aligned prices the evaluator accepts.
pub const MIN_OBSERVATIONS: usize = 3;

/// A spread whose std is at or below this fraction of the mean price of
/// the first leg is rounding noise and counts as flat.
const FLAT_SPREAD_TOLERANCE: f64 = 1e-10;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Mean-reversion speed of the spread from `Δs_t = α + φ s_{t-1}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HalfLife {
    /// `-ln 2 / φ`; negative or infinite when the spread does not revert
    #[serde(with = "crate::serde_f64")]
    pub periods: f64,
    /// φ
    pub decay_coefficient: f64,
    pub mean_reverting: bool,
}

/// Largest relative fall of the spread from its running maximum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpreadDrawdown {
    pub max_drawdown: f64,
    /// The running maximum was zero or changed sign, so the ratios mix
    /// denominators of different sign
    pub unstable: bool,
}

/// OLS with intercept of returns A on returns B.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnsRegression {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl ReturnsRegression {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Everything measured about one pair, plus the verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairMetrics {
    pub pair: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Aligned price observations
    pub observations: usize,

    pub returns_a: Vec<f64>,
    pub returns_b: Vec<f64>,

    pub correlation: f64,
    pub correlation_pvalue: f64,

    pub cointegration: CointegrationTest,

    /// `p_a - p_b * scale_factor`
    pub spread: Vec<f64>,
    pub spread_mean: f64,
    /// Sample standard deviation (ddof 1)
    pub spread_std: f64,
    pub spread_zscore: Vec<f64>,
    /// Index shared by `spread` and `spread_zscore`
    pub spread_dates: Vec<NaiveDate>,
    /// `mean(p_a) / mean(p_b)`
    pub scale_factor: f64,

    pub half_life: HalfLife,
    pub adf: AdfTest,

    /// Population covariance over population variance of returns B
    pub beta: f64,
    /// Intercept-free OLS slope of returns A on returns B
    pub hedge_ratio: f64,
    pub returns_regression: ReturnsRegression,

    pub vol_ratio: f64,
    pub rolling_corr_std: f64,
    /// Largest absolute z-score
    pub max_deviation: f64,
    /// Lower-tail percentile of the spread
    pub var_95: f64,
    /// Mean of the spread at or below `var_95`
    pub cvar_95: f64,
    pub drawdown: SpreadDrawdown,

    pub verdict: Verdict,
}

impl PairMetrics {
    /// The statistics read by the suitability rules.
    pub fn screening_statistics(&self) -> ScreeningStatistics {
        ScreeningStatistics {
            correlation: self.correlation,
            correlation_pvalue: self.correlation_pvalue,
            coint_stat: self.cointegration.statistic,
            coint_pvalue: self.cointegration.p_value,
            adf_stat: self.adf.statistic,
            adf_pvalue: self.adf.p_value,
            half_life: self.half_life.periods,
        }
    }

    pub fn is_suitable(&self) -> bool {
        self.verdict.suitable
    }
}

/// Two symbols, their (possibly missing) price histories and an optional
/// inclusive date window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairAnalysisInput {
    pub symbol_a: String,
    pub symbol_b: String,
    pub series_a: Option<TimeSeries>,
    pub series_b: Option<TimeSeries>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub config: EvaluationConfig,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Restrict both series to the date window, align them and evaluate.
pub fn analyze_pair(input: &PairAnalysisInput) -> PairsResult<PairMetrics> {
    if let (Some(start), Some(end)) = (input.start_date, input.end_date) {
        if start > end {
            return Err(PairsError::InvalidInput {
                field: "start_date".into(),
                reason: format!("{start} is after end date {end}"),
            });
        }
    }

    let window = |series: &TimeSeries| series.restrict(input.start_date, input.end_date);
    let series_a = input.series_a.as_ref().map(window);
    let series_b = input.series_b.as_ref().map(window);

    let aligned = align(series_a.as_ref(), series_b.as_ref())?;
    let label = format!("{}-{}", input.symbol_a, input.symbol_b);
    evaluate_pair(&aligned, &label, &input.config)
}

/// Compute every pair metric and the suitability verdict.
///
/// Steps run in a fixed order and the first failing step aborts the
/// evaluation with an error naming its metric.
pub fn evaluate_pair(
    aligned: &AlignedPair,
    label: &str,
    config: &EvaluationConfig,
) -> PairsResult<PairMetrics> {
    config.validate()?;

    let n = aligned.observations();
    let (start_date, end_date) = match (aligned.start_date(), aligned.end_date()) {
        (Some(start), Some(end)) if n >= MIN_OBSERVATIONS => (start, end),
        _ => {
            return Err(PairsError::InsufficientData {
                metric: Metric::Observations,
                required: MIN_OBSERVATIONS,
                actual: n,
            })
        }
    };

    let p1 = aligned.prices_a();
    let p2 = aligned.prices_b();
    let r1 = aligned.returns_a();
    let r2 = aligned.returns_b();

    debug!(pair = label, observations = n, %start_date, %end_date, "Evaluating pair");

    // ------------------------------------------------------------------
    // 1. Correlation of returns
    // ------------------------------------------------------------------
    let pearson = pearson_test(r1, r2)?;

    // ------------------------------------------------------------------
    // 2. Cointegration of prices
    // ------------------------------------------------------------------
    let cointegration = engle_granger(p1, p2)?;

    // ------------------------------------------------------------------
    // 3. Spread with fixed mean-ratio scaling
    // ------------------------------------------------------------------
    let mean_a = mean(p1).ok_or_else(|| PairsError::computation(Metric::Spread, "no prices"))?;
    let mean_b = mean(p2).ok_or_else(|| PairsError::computation(Metric::Spread, "no prices"))?;
    if mean_b == 0.0 {
        return Err(PairsError::computation(
            Metric::Spread,
            "mean price of the second series is zero",
        ));
    }
    let scale_factor = mean_a / mean_b;
    let spread: Vec<f64> = p1
        .iter()
        .zip(p2)
        .map(|(a, b)| a - b * scale_factor)
        .collect();

    // ------------------------------------------------------------------
    // 4. Spread moments and z-scores
    // ------------------------------------------------------------------
    let spread_mean =
        mean(&spread).ok_or_else(|| PairsError::computation(Metric::Spread, "empty spread"))?;
    let spread_std = std_dev(&spread, 1)
        .ok_or_else(|| PairsError::computation(Metric::Spread, "spread too short"))?;
    if !spread_std.is_finite() || spread_std <= FLAT_SPREAD_TOLERANCE * mean_a.abs() {
        return Err(PairsError::computation(
            Metric::Spread,
            format!("spread is flat (std {spread_std:e})"),
        ));
    }
    let spread_zscore: Vec<f64> = spread
        .iter()
        .map(|s| (s - spread_mean) / spread_std)
        .collect();
    debug!(scale_factor, spread_mean, spread_std, "Spread computed");

    // ------------------------------------------------------------------
    // 5. Half-life of mean reversion
    // ------------------------------------------------------------------
    let half_life = estimate_half_life(&spread)?;

    // ------------------------------------------------------------------
    // 6. Stationarity of the spread
    // ------------------------------------------------------------------
    let adf = adf(&spread, Deterministic::Constant)?;

    // ------------------------------------------------------------------
    // 7. Beta, hedge ratio and returns regression
    // ------------------------------------------------------------------
    let beta = population_beta(r1, r2)?;
    let hedge_ratio = through_origin(r2, r1).ok_or_else(|| {
        PairsError::computation(Metric::HedgeRatio, "second returns series is all zero")
    })?;
    let returns_regression = regress_returns(r1, r2)?;
    debug!(beta, hedge_ratio, "Relationship estimated");

    // ------------------------------------------------------------------
    // 8. Volatility ratio
    // ------------------------------------------------------------------
    let vol_ratio = volatility_ratio(r1, r2)?;

    // ------------------------------------------------------------------
    // 9. Rolling correlation dispersion
    // ------------------------------------------------------------------
    let rolling_corr_std = rolling_correlation_dispersion(r1, r2, config.rolling_window)?;

    // ------------------------------------------------------------------
    // 10. Risk
    // ------------------------------------------------------------------
    let max_deviation = spread_zscore.iter().fold(0.0_f64, |acc, z| acc.max(z.abs()));
    let (var_95, cvar_95) = tail_risk(&spread, config.var_percentile)?;
    let drawdown = spread_drawdown(&spread)?;
    debug!(max_deviation, var_95, cvar_95, max_drawdown = drawdown.max_drawdown, "Risk computed");

    let mut metrics = PairMetrics {
        pair: label.to_string(),
        start_date,
        end_date,
        observations: n,
        returns_a: r1.to_vec(),
        returns_b: r2.to_vec(),
        correlation: pearson.correlation,
        correlation_pvalue: pearson.p_value,
        cointegration,
        spread,
        spread_mean,
        spread_std,
        spread_zscore,
        spread_dates: aligned.dates().to_vec(),
        scale_factor,
        half_life,
        adf,
        beta,
        hedge_ratio,
        returns_regression,
        vol_ratio,
        rolling_corr_std,
        max_deviation,
        var_95,
        cvar_95,
        drawdown,
        verdict: Verdict {
            suitable: false,
            rejection_reasons: Vec::new(),
        },
    };

    // ------------------------------------------------------------------
    // 11. Verdict
    // ------------------------------------------------------------------
    metrics.verdict = check_suitability(&metrics.screening_statistics(), &config.rules);
    debug!(
        pair = label,
        suitable = metrics.verdict.suitable,
        rejections = metrics.verdict.rejection_reasons.len(),
        "Pair evaluated"
    );

    Ok(metrics)
}

/// Half-life from the first-degree fit of `Δs_t` on `s_{t-1}`.
pub fn estimate_half_life(spread: &[f64]) -> PairsResult<HalfLife> {
    if spread.len() < 3 {
        return Err(PairsError::InsufficientData {
            metric: Metric::HalfLife,
            required: 3,
            actual: spread.len(),
        });
    }
    let lagged = &spread[..spread.len() - 1];
    let delta = diff(spread);
    let fit = simple_linear(lagged, &delta).ok_or_else(|| {
        PairsError::computation(Metric::HalfLife, "lagged spread has no variance")
    })?;

    let decay_coefficient = fit.slope;
    let periods = -std::f64::consts::LN_2 / decay_coefficient;
    let mean_reverting = decay_coefficient < 0.0;
    if !mean_reverting {
        warn!(
            decay_coefficient,
            periods, "Spread is not mean-reverting; half-life is not meaningful"
        );
    }
    Ok(HalfLife {
        periods,
        decay_coefficient,
        mean_reverting,
    })
}

/// Returns `(VaR, CVaR)` of the spread at `pct` (0-100, lower tail).
pub fn tail_risk(spread: &[f64], pct: f64) -> PairsResult<(f64, f64)> {
    let var = percentile(spread, pct)
        .ok_or_else(|| PairsError::computation(Metric::TailRisk, "percentile undefined"))?;
    let tail: Vec<f64> = spread.iter().copied().filter(|s| *s <= var).collect();
    let cvar = mean(&tail)
        .ok_or_else(|| PairsError::computation(Metric::TailRisk, "empty tail"))?;
    Ok((var, cvar))
}

/// Minimum of `(s_t - M_t) / M_t` with `M_t` the running maximum.
///
/// Points where `M_t` is zero are skipped and mark the result unstable,
/// as does any change in the sign of `M_t`.
pub fn spread_drawdown(spread: &[f64]) -> PairsResult<SpreadDrawdown> {
    let mut running_max = f64::NEG_INFINITY;
    let mut previous_sign: Option<bool> = None;
    let mut unstable = false;
    let mut max_drawdown: Option<f64> = None;

    for &s in spread {
        running_max = running_max.max(s);
        if running_max == 0.0 {
            unstable = true;
            continue;
        }
        let positive = running_max > 0.0;
        if previous_sign.is_some_and(|p| p != positive) {
            unstable = true;
        }
        previous_sign = Some(positive);

        let dd = (s - running_max) / running_max;
        max_drawdown = Some(max_drawdown.map_or(dd, |m: f64| m.min(dd)));
    }

    let max_drawdown = max_drawdown.ok_or_else(|| {
        PairsError::computation(Metric::Drawdown, "running maximum is zero everywhere")
    })?;
    if unstable {
        warn!(max_drawdown, "Spread running maximum crossed zero; drawdown is unstable");
    }
    Ok(SpreadDrawdown {
        max_drawdown,
        unstable,
    })
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn population_beta(r1: &[f64], r2: &[f64]) -> PairsResult<f64> {
    let cov = covariance(r1, r2, 0)
        .ok_or_else(|| PairsError::computation(Metric::Beta, "returns too short"))?;
    let var = variance(r2, 0)
        .ok_or_else(|| PairsError::computation(Metric::Beta, "returns too short"))?;
    if var == 0.0 {
        return Err(PairsError::computation(
            Metric::Beta,
            "second returns series has zero variance",
        ));
    }
    Ok(cov / var)
}

fn regress_returns(r1: &[f64], r2: &[f64]) -> PairsResult<ReturnsRegression> {
    let fit = simple_linear(r2, r1).ok_or_else(|| {
        PairsError::computation(Metric::Regression, "second returns series has zero variance")
    })?;
    let r_squared = r_squared(&fit, r2, r1).ok_or_else(|| {
        PairsError::computation(Metric::Regression, "first returns series has zero variance")
    })?;
    Ok(ReturnsRegression {
        slope: fit.slope,
        intercept: fit.intercept,
        r_squared,
    })
}

fn volatility_ratio(r1: &[f64], r2: &[f64]) -> PairsResult<f64> {
    let too_short = || PairsError::InsufficientData {
        metric: Metric::VolatilityRatio,
        required: 2,
        actual: r1.len().min(r2.len()),
    };
    let sd1 = std_dev(r1, 1).ok_or_else(too_short)?;
    let sd2 = std_dev(r2, 1).ok_or_else(too_short)?;
    if sd2 == 0.0 {
        return Err(PairsError::computation(
            Metric::VolatilityRatio,
            "second returns series has zero volatility",
        ));
    }
    Ok(sd1 / sd2)
}

fn rolling_correlation_dispersion(r1: &[f64], r2: &[f64], window: usize) -> PairsResult<f64> {
    let defined: Vec<f64> = rolling_correlation(r1, r2, window)
        .into_iter()
        .filter(|c| !c.is_nan())
        .collect();
    if defined.len() < 2 {
        return Err(PairsError::InsufficientData {
            metric: Metric::RollingCorrelation,
            required: window + 1,
            actual: r1.len(),
        });
    }
    std_dev(&defined, 1).ok_or_else(|| {
        PairsError::computation(Metric::RollingCorrelation, "dispersion undefined")
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
