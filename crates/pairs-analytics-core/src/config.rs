use serde::{Deserialize, Serialize};

use crate::error::PairsError;
use crate::pairs::suitability::{default_rules, RuleCondition, SuitabilityRule};
use crate::PairsResult;

fn default_rolling_window() -> usize {
    30
}

fn default_var_percentile() -> f64 {
    5.0
}

/// Tunables for [`crate::evaluate_pair`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Trailing window (in return periods) for the rolling correlation
    #[serde(default = "default_rolling_window")]
    pub rolling_window: usize,
    /// Lower-tail percentile of the spread reported as `var_95` (0-100)
    #[serde(default = "default_var_percentile")]
    pub var_percentile: f64,
    /// Suitability table, applied in order
    #[serde(default = "default_rules")]
    pub rules: Vec<SuitabilityRule>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            rolling_window: default_rolling_window(),
            var_percentile: default_var_percentile(),
            rules: default_rules(),
        }
    }
}

impl EvaluationConfig {
    pub fn validate(&self) -> PairsResult<()> {
        if self.rolling_window < 2 {
            return Err(PairsError::InvalidInput {
                field: "rolling_window".into(),
                reason: "must be at least 2".into(),
            });
        }
        if !(0.0..=100.0).contains(&self.var_percentile) {
            return Err(PairsError::InvalidInput {
                field: "var_percentile".into(),
                reason: format!("{} is outside [0, 100]", self.var_percentile),
            });
        }
        for (i, rule) in self.rules.iter().enumerate() {
            if rule.label.trim().is_empty() {
                return Err(PairsError::InvalidInput {
                    field: format!("rules[{i}].label"),
                    reason: "must not be empty".into(),
                });
            }
            if let RuleCondition::OutsideOpen { lower, upper } = rule.condition {
                if lower >= upper {
                    return Err(PairsError::InvalidInput {
                        field: format!("rules[{i}].condition"),
                        reason: format!("lower bound {lower} is not below upper bound {upper}"),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pairs::suitability::RuleMetric;

    #[test]
    fn test_defaults() {
        let config = EvaluationConfig::default();
        assert_eq!(config.rolling_window, 30);
        assert_eq!(config.var_percentile, 5.0);
        assert_eq!(config.rules.len(), 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config: EvaluationConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EvaluationConfig::default());
    }

    #[test]
    fn test_partial_json_overrides() {
        let config: EvaluationConfig =
            serde_json::from_str(r#"{"rolling_window": 20, "rules": []}"#).unwrap();
        assert_eq!(config.rolling_window, 20);
        assert_eq!(config.var_percentile, 5.0);
        assert!(config.rules.is_empty());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = EvaluationConfig {
            rolling_window: 1,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PairsError::InvalidInput { ref field, .. }) if field == "rolling_window"
        ));

        config.rolling_window = 30;
        config.var_percentile = 101.0;
        assert!(config.validate().is_err());

        config.var_percentile = 5.0;
        config.rules.push(SuitabilityRule::new(
            RuleMetric::HalfLife,
            RuleCondition::OutsideOpen {
                lower: 10.0,
                upper: 2.0,
            },
            "Inverted",
        ));
        assert!(config.validate().is_err());

        config.rules.pop();
        config.rules[0].label = "  ".into();
        assert!(config.validate().is_err());
    }
}
