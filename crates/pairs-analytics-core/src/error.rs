use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The statistic (or pipeline stage) an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Observations,
    Returns,
    Correlation,
    Cointegration,
    Spread,
    HalfLife,
    Stationarity,
    Beta,
    HedgeRatio,
    VolatilityRatio,
    RollingCorrelation,
    TailRisk,
    Drawdown,
    Regression,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::Observations => "observations",
            Metric::Returns => "returns",
            Metric::Correlation => "correlation",
            Metric::Cointegration => "cointegration",
            Metric::Spread => "spread",
            Metric::HalfLife => "half-life",
            Metric::Stationarity => "ADF stationarity",
            Metric::Beta => "beta",
            Metric::HedgeRatio => "hedge ratio",
            Metric::VolatilityRatio => "volatility ratio",
            Metric::RollingCorrelation => "rolling correlation",
            Metric::TailRisk => "tail risk",
            Metric::Drawdown => "drawdown",
            Metric::Regression => "regression",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum PairsError {
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Insufficient data for {metric}: need at least {required} observations, got {actual}")]
    InsufficientData {
        metric: Metric,
        required: usize,
        actual: usize,
    },

    #[error("Computation error in {metric}: {reason}")]
    Computation { metric: Metric, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl PairsError {
    /// The metric this error names, if any.
    pub fn metric(&self) -> Option<Metric> {
        match self {
            PairsError::InsufficientData { metric, .. } | PairsError::Computation { metric, .. } => {
                Some(*metric)
            }
            _ => None,
        }
    }

    pub(crate) fn computation(metric: Metric, reason: impl Into<String>) -> Self {
        PairsError::Computation {
            metric,
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for PairsError {
    fn from(e: serde_json::Error) -> Self {
        PairsError::SerializationError(e.to_string())
    }
}
