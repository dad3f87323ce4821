use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use portfolio_risk_core::performance::{calculate_performance, HeldPosition, PerformanceInput};
use portfolio_risk_core::var::{calculate_portfolio_risk, PortfolioRiskInput, VarConfig};
use portfolio_risk_core::Position;

use crate::input;

/// Arguments for the VaR assessment
#[derive(Args)]
pub struct RiskArgs {
    /// Portfolio identifier echoed back in the result
    #[arg(long, default_value = "default")]
    pub portfolio_id: String,

    /// Path to a JSON/YAML file with position data
    #[arg(long)]
    pub input: Option<String>,

    /// Comma-separated position values (e.g. "1000,500")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub values: Option<Vec<Decimal>>,

    /// Confidence level recorded with the assessment (e.g. 0.95)
    #[arg(long, default_value = "0.95")]
    pub confidence: Decimal,
}

/// Arguments for portfolio performance metrics
#[derive(Args)]
pub struct PerformanceArgs {
    /// Portfolio identifier echoed back in the result
    #[arg(long, default_value = "default")]
    pub portfolio_id: String,

    /// Path to a JSON/YAML file with held positions
    /// (objects with current_value and cost_basis)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_risk(args: RiskArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if args.confidence <= Decimal::ZERO || args.confidence >= Decimal::ONE {
        return Err("--confidence must be between 0 and 1 (exclusive)".into());
    }

    let positions = get_positions(&args.input, &args.values)?;

    let input = PortfolioRiskInput {
        portfolio_id: args.portfolio_id,
        positions,
        config: VarConfig {
            confidence_level: args.confidence,
            ..VarConfig::default()
        },
    };

    let output = calculate_portfolio_risk(&input)?;
    Ok(serde_json::to_value(output)?)
}

pub fn run_performance(args: PerformanceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let positions = get_held_positions(&args.input)?;

    let input = PerformanceInput {
        portfolio_id: args.portfolio_id,
        positions,
    };

    let output = calculate_performance(&input)?;
    Ok(serde_json::to_value(output)?)
}

fn get_positions(
    input_path: &Option<String>,
    cli_values: &Option<Vec<Decimal>>,
) -> Result<Vec<Position>, Box<dyn std::error::Error>> {
    if let Some(ref path) = input_path {
        positions_from_value(input::read_value(path)?)
    } else if let Some(ref values) = cli_values {
        Ok(values
            .iter()
            .map(|v| Position {
                symbol: None,
                value: *v,
            })
            .collect())
    } else if let Some(data) = input::read_stdin()? {
        positions_from_value(data)
    } else {
        Err("Provide --values or --input file or pipe JSON via stdin".into())
    }
}

fn positions_from_value(data: Value) -> Result<Vec<Position>, Box<dyn std::error::Error>> {
    if data.is_array() {
        Ok(serde_json::from_value(data)?)
    } else if let Some(arr) = data.get("positions") {
        Ok(serde_json::from_value(arr.clone())?)
    } else {
        Err("Expected a JSON array of positions or object with 'positions' key".into())
    }
}

fn get_held_positions(
    input_path: &Option<String>,
) -> Result<Vec<HeldPosition>, Box<dyn std::error::Error>> {
    let data = if let Some(ref path) = input_path {
        input::read_value(path)?
    } else if let Some(data) = input::read_stdin()? {
        data
    } else {
        return Err("Provide --input file or pipe JSON via stdin".into());
    };

    if data.is_array() {
        Ok(serde_json::from_value(data)?)
    } else if let Some(arr) = data.get("positions") {
        Ok(serde_json::from_value(arr.clone())?)
    } else {
        Err("Expected a JSON array of held positions or object with 'positions' key".into())
    }
}
