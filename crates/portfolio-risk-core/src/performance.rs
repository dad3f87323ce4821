use chrono::{SecondsFormat, Utc};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PortfolioRiskError;
use crate::types::*;
use crate::PortfolioRiskResult;

/// A held position with its acquisition cost
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeldPosition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    pub current_value: Money,
    pub cost_basis: Money,
}

/// Input for portfolio performance metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceInput {
    pub portfolio_id: String,
    pub positions: Vec<HeldPosition>,
}

/// Output of portfolio performance metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceOutput {
    pub portfolio_id: String,
    pub total_value: Money,
    pub total_cost: Money,
    pub pnl: Money,
    pub pnl_percentage: Rate,
    pub calculated_at: String,
}

/// Calculate portfolio performance (market value, cost basis, PnL).
pub fn calculate_performance(
    input: &PerformanceInput,
) -> PortfolioRiskResult<ComputationOutput<PerformanceOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    if input.positions.is_empty() {
        return Err(PortfolioRiskError::InsufficientData(
            "At least 1 position required for performance metrics".into(),
        ));
    }

    let total_value: Money = input.positions.iter().map(|p| p.current_value).sum();
    let total_cost: Money = input.positions.iter().map(|p| p.cost_basis).sum();

    if total_cost.is_zero() {
        return Err(PortfolioRiskError::DivisionByZero {
            context: "PnL percentage of zero cost basis".into(),
        });
    }

    let pnl = total_value - total_cost;
    let pnl_percentage = pnl / total_cost * dec!(100);

    let output = PerformanceOutput {
        portfolio_id: input.portfolio_id.clone(),
        total_value,
        total_cost,
        pnl,
        pnl_percentage,
        calculated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Portfolio Performance (market value, cost basis, PnL)",
        &serde_json::json!({
            "positions": input.positions.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn held(current: Decimal, cost: Decimal) -> HeldPosition {
        HeldPosition {
            symbol: None,
            current_value: current,
            cost_basis: cost,
        }
    }

    #[test]
    fn test_basic_performance() {
        let input = PerformanceInput {
            portfolio_id: "PF-1001".into(),
            positions: vec![held(dec!(1100), dec!(1000)), held(dec!(550), dec!(500))],
        };
        let result = calculate_performance(&input).unwrap();
        let out = &result.result;

        assert_eq!(out.total_value, dec!(1650));
        assert_eq!(out.total_cost, dec!(1500));
        assert_eq!(out.pnl, dec!(150));
        assert_eq!(out.pnl_percentage, dec!(10));
    }

    #[test]
    fn test_negative_pnl() {
        let input = PerformanceInput {
            portfolio_id: "PF-1001".into(),
            positions: vec![held(dec!(900), dec!(1000))],
        };
        let result = calculate_performance(&input).unwrap();
        let out = &result.result;

        assert_eq!(out.pnl, dec!(-100));
        assert_eq!(out.pnl_percentage, dec!(-10));
    }

    #[test]
    fn test_empty_positions_rejected() {
        let input = PerformanceInput {
            portfolio_id: "PF-1001".into(),
            positions: vec![],
        };
        assert!(matches!(
            calculate_performance(&input).unwrap_err(),
            PortfolioRiskError::InsufficientData(_)
        ));
    }

    #[test]
    fn test_zero_cost_basis_is_division_by_zero() {
        let input = PerformanceInput {
            portfolio_id: "PF-1001".into(),
            positions: vec![held(dec!(100), Decimal::ZERO)],
        };
        assert!(matches!(
            calculate_performance(&input).unwrap_err(),
            PortfolioRiskError::DivisionByZero { .. }
        ));
    }
}
