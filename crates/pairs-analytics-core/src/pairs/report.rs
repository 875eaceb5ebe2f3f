use std::fmt;

use crate::pairs::evaluation::PairMetrics;
use crate::PairsResult;

/// Console summary for people to read. The layout may change between
/// releases; use [`PairMetrics::to_json`] for anything that parses it.
impl fmt::Display for PairMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Analysis for pair: {}", self.pair)?;
        writeln!(
            f,
            "Period: {} to {}",
            self.start_date.format("%Y-%m-%d"),
            self.end_date.format("%Y-%m-%d")
        )?;
        writeln!(f, "Number of observations: {}", self.observations)?;

        writeln!(f)?;
        writeln!(f, "Key Metrics:")?;
        writeln!(f, "Correlation: {:.3}", self.correlation)?;
        writeln!(f, "Correlation significance: {:.3}", self.correlation_pvalue)?;
        writeln!(f, "Cointegration: {:.3}", self.cointegration.statistic)?;
        writeln!(f, "Cointegration significance: {:.3}", self.cointegration.p_value)?;
        writeln!(f, "ADF Unit Root: {:.3}", self.adf.statistic)?;
        writeln!(f, "ADF Unit Root significance: {:.3}", self.adf.p_value)?;
        writeln!(f, "Half-life: {:.1} days", self.half_life.periods)?;
        writeln!(f, "Beta: {:.3}", self.beta)?;
        writeln!(f, "Hedge Ratio: {:.3}", self.hedge_ratio)?;

        writeln!(f)?;
        writeln!(f, "Risk Metrics:")?;
        writeln!(f, "Volatility ratio: {:.3}", self.vol_ratio)?;
        writeln!(f, "Rolling correlation std: {:.3}", self.rolling_corr_std)?;
        writeln!(f, "Max deviation (z): {:.3}", self.max_deviation)?;
        writeln!(f, "VaR: {:.3}", self.var_95)?;
        writeln!(f, "CVaR: {:.3}", self.cvar_95)?;
        write!(f, "Max drawdown: {:.3}", self.drawdown.max_drawdown)?;
        if self.drawdown.unstable {
            write!(f, " (unstable)")?;
        }
        writeln!(f)?;

        writeln!(f)?;
        writeln!(f, "Suitability:")?;
        writeln!(f, "Suitable for pairs trading: {}", self.verdict.suitable)?;
        write!(f, "Reasons: {}", self.verdict.summary().join(", "))
    }
}

impl PairMetrics {
    /// Structured rendering of the full record.
    pub fn to_json(&self) -> PairsResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::config::EvaluationConfig;
    use crate::pairs::alignment::align;
    use crate::pairs::evaluation::evaluate_pair;
    use crate::pairs::suitability::SUITABLE_MARKER;
    use crate::types::TimeSeries;

    fn metrics() -> crate::pairs::evaluation::PairMetrics {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let mut level = 50.0;
        let mut noise = 0.0;
        let mut a = Vec::new();
        let mut b = Vec::new();
        for i in 0..250 {
            let date = start + chrono::Duration::days(i);
            level += rng.gen_range(-0.5..0.5);
            noise = 0.5 * noise + rng.gen_range(-0.5..0.5);
            a.push((date, 2.0 * level + noise));
            b.push((date, level));
        }
        let a = TimeSeries::from_pairs(a).unwrap();
        let b = TimeSeries::from_pairs(b).unwrap();
        let aligned = align(Some(&a), Some(&b)).unwrap();
        evaluate_pair(&aligned, "XOM-CVX", &EvaluationConfig::default()).unwrap()
    }

    #[test]
    fn test_display_layout() {
        let m = metrics();
        let text = m.to_string();
        assert!(text.starts_with("Analysis for pair: XOM-CVX\n"));
        assert!(text.contains("Period: 2024-01-01 to 2024-09-06"));
        assert!(text.contains("Number of observations: 250"));
        assert!(text.contains(&format!("Correlation: {:.3}", m.correlation)));
        assert!(text.contains(&format!("Half-life: {:.1} days", m.half_life.periods)));
        assert!(text.contains("Suitability:"));
        if m.verdict.suitable {
            assert!(text.ends_with(SUITABLE_MARKER));
        }
    }

    #[test]
    fn test_to_json_fields() {
        let m = metrics();
        let json = m.to_json().unwrap();
        assert_eq!(json["pair"], "XOM-CVX");
        assert_eq!(json["observations"], 250);
        assert_eq!(json["start_date"], "2024-01-01");
        assert!(json["verdict"]["rejection_reasons"].is_array());
        assert_eq!(json["spread"].as_array().unwrap().len(), 250);
    }
}
