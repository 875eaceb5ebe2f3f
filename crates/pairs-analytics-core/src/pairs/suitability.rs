use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Summary shown when no rule fails.
pub const SUITABLE_MARKER: &str = "Pair suitable";

const MIN_CORRELATION: f64 = 0.5;
const SIGNIFICANCE_LEVEL: f64 = 0.05;
/// Fixed critical values, not recomputed from the sample size.
const COINTEGRATION_CRITICAL: f64 = -3.3377;
const ADF_CRITICAL: f64 = -1.94;
const HALF_LIFE_MIN: f64 = 1.0;
const HALF_LIFE_MAX: f64 = 30.0;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Statistic a suitability rule is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleMetric {
    Correlation,
    CorrelationPValue,
    CointegrationStatistic,
    CointegrationPValue,
    AdfStatistic,
    AdfPValue,
    HalfLife,
}

/// When a rule fails. Boundaries are inclusive in the failing direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleCondition {
    /// Fails when `value <= threshold`
    AtOrBelow { threshold: f64 },
    /// Fails when `value >= threshold`
    AtOrAbove { threshold: f64 },
    /// Fails unless `lower < value < upper`
    OutsideOpen { lower: f64, upper: f64 },
}

impl RuleCondition {
    /// Whether `value` fails the condition. NaN always fails.
    pub fn fails(&self, value: f64) -> bool {
        if value.is_nan() {
            return true;
        }
        match *self {
            RuleCondition::AtOrBelow { threshold } => value <= threshold,
            RuleCondition::AtOrAbove { threshold } => value >= threshold,
            RuleCondition::OutsideOpen { lower, upper } => !(lower < value && value < upper),
        }
    }
}

/// One row of the suitability table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuitabilityRule {
    pub metric: RuleMetric,
    pub condition: RuleCondition,
    /// Rejection reason reported when the rule fails
    pub label: String,
}

impl SuitabilityRule {
    pub fn new(metric: RuleMetric, condition: RuleCondition, label: &str) -> Self {
        Self {
            metric,
            condition,
            label: label.to_string(),
        }
    }
}

/// The statistics the rule table reads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreeningStatistics {
    pub correlation: f64,
    pub correlation_pvalue: f64,
    #[serde(with = "crate::serde_f64")]
    pub coint_stat: f64,
    pub coint_pvalue: f64,
    #[serde(with = "crate::serde_f64")]
    pub adf_stat: f64,
    pub adf_pvalue: f64,
    #[serde(with = "crate::serde_f64")]
    pub half_life: f64,
}

impl ScreeningStatistics {
    pub fn value(&self, metric: RuleMetric) -> f64 {
        match metric {
            RuleMetric::Correlation => self.correlation,
            RuleMetric::CorrelationPValue => self.correlation_pvalue,
            RuleMetric::CointegrationStatistic => self.coint_stat,
            RuleMetric::CointegrationPValue => self.coint_pvalue,
            RuleMetric::AdfStatistic => self.adf_stat,
            RuleMetric::AdfPValue => self.adf_pvalue,
            RuleMetric::HalfLife => self.half_life,
        }
    }
}

/// Pass/fail outcome with every failing rule's label, in table order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub suitable: bool,
    pub rejection_reasons: Vec<String>,
}

impl Verdict {
    /// The rejection reasons, or the single suitable marker when there are none.
    pub fn summary(&self) -> Vec<String> {
        if self.rejection_reasons.is_empty() {
            vec![SUITABLE_MARKER.to_string()]
        } else {
            self.rejection_reasons.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// The standard screening table.
///
/// | Rule                       | Fails when              | Label                           |
/// |----------------------------|-------------------------|---------------------------------|
/// | Correlation strength       | r <= 0.5                | Low correlation                 |
/// | Correlation significance   | p >= 0.05               | Correlation not significant     |
/// | Cointegration strength     | stat >= -3.3377         | Weak cointegration              |
/// | Cointegration significance | p >= 0.05               | Cointegration not significant   |
/// | Spread stationarity        | ADF stat >= -1.94       | Spread not stationary           |
/// | Stationarity significance  | ADF p >= 0.05           | ADF test not significant        |
/// | Mean-reversion speed       | half-life not in (1,30) | Half-life outside range         |
pub fn default_rules() -> Vec<SuitabilityRule> {
    vec![
        SuitabilityRule::new(
            RuleMetric::Correlation,
            RuleCondition::AtOrBelow {
                threshold: MIN_CORRELATION,
            },
            "Low correlation",
        ),
        SuitabilityRule::new(
            RuleMetric::CorrelationPValue,
            RuleCondition::AtOrAbove {
                threshold: SIGNIFICANCE_LEVEL,
            },
            "Correlation not significant",
        ),
        SuitabilityRule::new(
            RuleMetric::CointegrationStatistic,
            RuleCondition::AtOrAbove {
                threshold: COINTEGRATION_CRITICAL,
            },
            "Weak cointegration",
        ),
        SuitabilityRule::new(
            RuleMetric::CointegrationPValue,
            RuleCondition::AtOrAbove {
                threshold: SIGNIFICANCE_LEVEL,
            },
            "Cointegration not significant",
        ),
        SuitabilityRule::new(
            RuleMetric::AdfStatistic,
            RuleCondition::AtOrAbove {
                threshold: ADF_CRITICAL,
            },
            "Spread not stationary",
        ),
        SuitabilityRule::new(
            RuleMetric::AdfPValue,
            RuleCondition::AtOrAbove {
                threshold: SIGNIFICANCE_LEVEL,
            },
            "ADF test not significant",
        ),
        SuitabilityRule::new(
            RuleMetric::HalfLife,
            RuleCondition::OutsideOpen {
                lower: HALF_LIFE_MIN,
                upper: HALF_LIFE_MAX,
            },
            "Half-life outside range",
        ),
    ]
}

/// Apply every rule independently and collect the labels of those that fail.
pub fn check_suitability(stats: &ScreeningStatistics, rules: &[SuitabilityRule]) -> Verdict {
    let rejection_reasons: Vec<String> = rules
        .iter()
        .filter(|rule| rule.condition.fails(stats.value(rule.metric)))
        .map(|rule| rule.label.clone())
        .collect();
    Verdict {
        suitable: rejection_reasons.is_empty(),
        rejection_reasons,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
