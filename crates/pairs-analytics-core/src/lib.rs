pub mod error;
mod serde_f64;
pub mod statistics;
pub mod types;

#[cfg(feature = "evaluation")]
pub mod config;

#[cfg(feature = "evaluation")]
pub mod pairs;

pub use error::{Metric, PairsError};
pub use types::*;

#[cfg(feature = "evaluation")]
pub use config::EvaluationConfig;

#[cfg(feature = "evaluation")]
pub use pairs::{
    alignment::{align, AlignedPair},
    evaluation::{
        analyze_pair, evaluate_pair, HalfLife, PairAnalysisInput, PairMetrics, ReturnsRegression,
        SpreadDrawdown, MIN_OBSERVATIONS,
    },
    suitability::{
        check_suitability, default_rules, RuleCondition, RuleMetric, ScreeningStatistics,
        SuitabilityRule, Verdict, SUITABLE_MARKER,
    },
};

#[cfg(feature = "report")]
pub use pairs::regression_view::{RegressionView, DEFAULT_LINE_POINTS};

/// Standard result type for all pairs-analytics operations
pub type PairsResult<T> = Result<T, PairsError>;
