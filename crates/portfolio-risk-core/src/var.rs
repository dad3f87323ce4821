use chrono::{SecondsFormat, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PortfolioRiskError;
use crate::types::*;
use crate::volatility::{ConstantVolatility, VolatilityEstimator};
use crate::PortfolioRiskResult;

/// One-tailed z-score applied to daily volatility. Corresponds to 99%
/// confidence and is NOT derived from `VarConfig::confidence_level`; a
/// mismatch is reported through the output warnings.
const VAR_Z_MULTIPLIER: Decimal = dec!(2.33);

/// Tier boundaries on VaR as a percentage of portfolio value.
const LOW_TIER_BELOW: Decimal = dec!(1);
const MEDIUM_TIER_BELOW: Decimal = dec!(3);

/// Assessment configuration, carried inside each call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VarConfig {
    /// Confidence level recorded with the assessment. The formula applies
    /// the fixed 99% multiplier regardless.
    pub confidence_level: Rate,
    /// Horizon in days. Only a single-day horizon is supported.
    pub time_horizon_days: u32,
}

impl Default for VarConfig {
    fn default() -> Self {
        Self {
            confidence_level: dec!(0.95),
            time_horizon_days: 1,
        }
    }
}

/// Input for a portfolio VaR assessment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioRiskInput {
    /// Opaque portfolio identifier, echoed back in the output
    pub portfolio_id: String,
    /// Positions as supplied by the upstream position keeper
    pub positions: Vec<Position>,
    #[serde(default)]
    pub config: VarConfig,
}

/// Output of a portfolio VaR assessment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub portfolio_id: String,
    pub var_1day: Money,
    pub portfolio_value: Money,
    pub var_percentage: Rate,
    pub risk_level: RiskLevel,
    pub calculated_at: String,
}

/// Calculate single-day parametric VaR with the default constant-volatility
/// estimator.
pub fn calculate_portfolio_risk(
    input: &PortfolioRiskInput,
) -> PortfolioRiskResult<ComputationOutput<RiskAssessment>> {
    calculate_portfolio_risk_with(input, &ConstantVolatility::default())
}

/// Calculate single-day parametric VaR using the supplied volatility
/// estimator.
pub fn calculate_portfolio_risk_with(
    input: &PortfolioRiskInput,
    estimator: &dyn VolatilityEstimator,
) -> PortfolioRiskResult<ComputationOutput<RiskAssessment>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.config.time_horizon_days != 1 {
        return Err(PortfolioRiskError::InvalidInput {
            field: "time_horizon_days".into(),
            reason: "Only a single-day horizon is supported".into(),
        });
    }

    let portfolio_value: Money = input.positions.iter().map(|p| p.value).sum();
    let volatility = estimator.estimate(&input.positions)?;
    let var = portfolio_value * volatility * VAR_Z_MULTIPLIER;

    let (risk_level, var_percentage) = risk_level_for(var, portfolio_value)?;

    if input.config.confidence_level != dec!(0.99) {
        warnings.push(format!(
            "Configured confidence level {} is not applied; multiplier {} corresponds to 99% one-tailed confidence",
            input.config.confidence_level, VAR_Z_MULTIPLIER
        ));
    }

    let output = RiskAssessment {
        portfolio_id: input.portfolio_id.clone(),
        var_1day: var,
        portfolio_value,
        var_percentage,
        risk_level,
        calculated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Parametric 1-Day VaR (constant volatility, fixed z-multiplier)",
        &serde_json::json!({
            "positions": input.positions.len(),
            "daily_volatility": volatility.to_string(),
            "z_multiplier": VAR_Z_MULTIPLIER.to_string(),
            "confidence_level": input.config.confidence_level.to_string(),
            "time_horizon_days": input.config.time_horizon_days,
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Run an assessment and absorb any failure into an `error` mapping.
///
/// Callers always receive a JSON document: either the serialized
/// [`ComputationOutput`] or `{"error": "Risk calculation failed: <message>"}`.
pub fn assess_portfolio(input: &PortfolioRiskInput) -> serde_json::Value {
    let serialized = calculate_portfolio_risk(input)
        .and_then(|out| serde_json::to_value(&out).map_err(PortfolioRiskError::from));
    match serialized {
        Ok(value) => value,
        Err(e) => error_mapping(&e),
    }
}

/// Same as [`assess_portfolio`], from a raw JSON document. Malformed
/// positions (missing or non-numeric `value`) surface through the same
/// error mapping.
pub fn assess_portfolio_json(raw: &str) -> serde_json::Value {
    match serde_json::from_str::<PortfolioRiskInput>(raw) {
        Ok(input) => assess_portfolio(&input),
        Err(e) => error_mapping(&PortfolioRiskError::from(e)),
    }
}

fn error_mapping(e: &PortfolioRiskError) -> serde_json::Value {
    serde_json::json!({ "error": format!("Risk calculation failed: {e}") })
}

/// Tier the VaR estimate as a percentage of portfolio value.
fn risk_level_for(
    var: Money,
    portfolio_value: Money,
) -> PortfolioRiskResult<(RiskLevel, Rate)> {
    if portfolio_value.is_zero() {
        return Err(PortfolioRiskError::DivisionByZero {
            context: "VaR percentage of zero-value portfolio".into(),
        });
    }

    let var_percentage = var / portfolio_value * dec!(100);
    let level = if var_percentage < LOW_TIER_BELOW {
        RiskLevel::Low
    } else if var_percentage < MEDIUM_TIER_BELOW {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    };

    Ok((level, var_percentage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn positions(values: &[Decimal]) -> Vec<Position> {
        values
            .iter()
            .map(|v| Position {
                symbol: None,
                value: *v,
            })
            .collect()
    }

    fn input(values: &[Decimal]) -> PortfolioRiskInput {
        PortfolioRiskInput {
            portfolio_id: "PF-1001".into(),
            positions: positions(values),
            config: VarConfig::default(),
        }
    }

    #[test]
    fn test_var_formula_exact() {
        let result = calculate_portfolio_risk(&input(&[dec!(1000), dec!(500)])).unwrap();
        let out = &result.result;

        assert_eq!(out.portfolio_value, dec!(1500));
        assert_eq!(out.var_1day, dec!(69.9));
        assert_eq!(out.var_percentage, dec!(4.66));
        assert_eq!(out.risk_level, RiskLevel::High);
        assert_eq!(out.portfolio_id, "PF-1001");
    }

    #[test]
    fn test_constant_volatility_pins_var_percentage() {
        // The stub estimator fixes the ratio at 4.66% for any non-empty
        // portfolio, so every assessment lands in the same tier.
        let portfolios = [
            vec![dec!(1)],
            vec![dec!(250000), dec!(125.5)],
            vec![dec!(10), dec!(20), dec!(30)],
        ];
        for values in portfolios {
            let result = calculate_portfolio_risk(&input(&values)).unwrap();
            assert_eq!(result.result.var_percentage, dec!(4.66));
            assert_eq!(result.result.risk_level, RiskLevel::High);
        }
    }

    #[test]
    fn test_tier_boundaries_via_estimator() {
        let i = input(&[dec!(1000)]);

        // 0.4% daily => 0.932% of value
        let low = ConstantVolatility::new(dec!(0.004)).unwrap();
        let result = calculate_portfolio_risk_with(&i, &low).unwrap();
        assert_eq!(result.result.risk_level, RiskLevel::Low);

        // 1% daily => 2.33% of value
        let medium = ConstantVolatility::new(dec!(0.01)).unwrap();
        let result = calculate_portfolio_risk_with(&i, &medium).unwrap();
        assert_eq!(result.result.risk_level, RiskLevel::Medium);

        // Default 2% daily => 4.66% of value
        let result = calculate_portfolio_risk(&i).unwrap();
        assert_eq!(result.result.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_empty_positions_is_division_by_zero() {
        let err = calculate_portfolio_risk(&input(&[])).unwrap_err();
        assert!(matches!(err, PortfolioRiskError::DivisionByZero { .. }));
    }

    #[test]
    fn test_offsetting_positions_is_division_by_zero() {
        let err = calculate_portfolio_risk(&input(&[dec!(750), dec!(-750)])).unwrap_err();
        assert!(matches!(err, PortfolioRiskError::DivisionByZero { .. }));
    }

    #[test]
    fn test_assess_portfolio_absorbs_errors() {
        let value = assess_portfolio(&input(&[]));
        let message = value["error"].as_str().unwrap();
        assert!(message.starts_with("Risk calculation failed:"));
    }

    #[test]
    fn test_assess_portfolio_success_has_no_error_key() {
        let value = assess_portfolio(&input(&[dec!(1000), dec!(500)]));
        assert!(value.get("error").is_none());
        assert_eq!(value["result"]["risk_level"], "HIGH");
    }

    #[test]
    fn test_assess_portfolio_json_round_trip() {
        let raw = r#"{"portfolio_id":"PF-1001","positions":[{"value":1000},{"value":500}]}"#;
        let value = assess_portfolio_json(raw);
        let out = &value["result"];

        assert_eq!(out["portfolio_id"], "PF-1001");
        assert_eq!(out["risk_level"], "HIGH");
        let var: Decimal = out["var_1day"].as_str().unwrap().parse().unwrap();
        assert_eq!(var, dec!(69.9));
    }

    #[test]
    fn test_assess_portfolio_json_missing_value_key() {
        let raw = r#"{"portfolio_id":"PF-1001","positions":[{"symbol":"AAPL"}]}"#;
        let value = assess_portfolio_json(raw);
        let message = value["error"].as_str().unwrap();
        assert!(message.starts_with("Risk calculation failed:"));
    }

    #[test]
    fn test_assess_portfolio_json_non_numeric_value() {
        let raw = r#"{"portfolio_id":"PF-1001","positions":[{"value":true}]}"#;
        let value = assess_portfolio_json(raw);
        assert!(value["error"]
            .as_str()
            .unwrap()
            .starts_with("Risk calculation failed:"));
    }

    #[test]
    fn test_identical_inputs_differ_only_in_timestamp() {
        let i = input(&[dec!(1000), dec!(500)]);
        let first = calculate_portfolio_risk(&i).unwrap().result;
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = calculate_portfolio_risk(&i).unwrap().result;

        assert_eq!(first.var_1day, second.var_1day);
        assert_eq!(first.portfolio_value, second.portfolio_value);
        assert_eq!(first.risk_level, second.risk_level);
        assert_ne!(first.calculated_at, second.calculated_at);
    }

    #[test]
    fn test_confidence_mismatch_surfaces_as_warning() {
        let result = calculate_portfolio_risk(&input(&[dec!(1000)])).unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("99%"));
    }

    #[test]
    fn test_no_warning_at_99_percent_confidence() {
        let mut i = input(&[dec!(1000)]);
        i.config.confidence_level = dec!(0.99);
        let result = calculate_portfolio_risk(&i).unwrap();
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_multi_day_horizon_rejected() {
        let mut i = input(&[dec!(1000)]);
        i.config.time_horizon_days = 10;
        assert!(matches!(
            calculate_portfolio_risk(&i).unwrap_err(),
            PortfolioRiskError::InvalidInput { .. }
        ));
    }
}
