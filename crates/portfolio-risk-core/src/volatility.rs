use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::PortfolioRiskError;
use crate::types::{Position, Rate};
use crate::PortfolioRiskResult;

/// Daily volatility assumed by the default estimator (2%).
pub const DEFAULT_DAILY_VOLATILITY: Rate = dec!(0.02);

/// Strategy for estimating daily portfolio volatility.
///
/// The shipped estimator is a constant stub; real models (historical
/// simulation, GARCH) plug in here without touching the VaR formula.
pub trait VolatilityEstimator {
    /// Daily volatility for the given positions, as a decimal rate.
    fn estimate(&self, positions: &[Position]) -> PortfolioRiskResult<Rate>;
}

/// Constant-volatility stub. Returns the same rate regardless of positions.
#[derive(Debug, Clone, Copy)]
pub struct ConstantVolatility {
    daily_volatility: Rate,
}

impl ConstantVolatility {
    pub fn new(daily_volatility: Rate) -> PortfolioRiskResult<Self> {
        if daily_volatility < Decimal::ZERO {
            return Err(PortfolioRiskError::InvalidInput {
                field: "daily_volatility".into(),
                reason: "Volatility must be non-negative".into(),
            });
        }
        Ok(Self { daily_volatility })
    }
}

impl Default for ConstantVolatility {
    fn default() -> Self {
        Self {
            daily_volatility: DEFAULT_DAILY_VOLATILITY,
        }
    }
}

impl VolatilityEstimator for ConstantVolatility {
    fn estimate(&self, _positions: &[Position]) -> PortfolioRiskResult<Rate> {
        Ok(self.daily_volatility)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_is_two_percent() {
        let estimator = ConstantVolatility::default();
        assert_eq!(estimator.estimate(&[]).unwrap(), dec!(0.02));
    }

    #[test]
    fn test_ignores_positions() {
        let estimator = ConstantVolatility::default();
        let positions = vec![
            Position {
                symbol: Some("AAPL".into()),
                value: dec!(250000),
            },
            Position {
                symbol: None,
                value: dec!(-3000),
            },
        ];
        assert_eq!(estimator.estimate(&positions).unwrap(), dec!(0.02));
    }

    #[test]
    fn test_negative_volatility_rejected() {
        assert!(matches!(
            ConstantVolatility::new(dec!(-0.01)).unwrap_err(),
            PortfolioRiskError::InvalidInput { .. }
        ));
    }

    #[test]
    fn test_zero_volatility_allowed() {
        let estimator = ConstantVolatility::new(Decimal::ZERO).unwrap();
        assert_eq!(estimator.estimate(&[]).unwrap(), Decimal::ZERO);
    }
}
