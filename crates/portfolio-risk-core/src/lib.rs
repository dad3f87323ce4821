pub mod error;
pub mod types;
pub mod var;
pub mod volatility;

#[cfg(feature = "performance")]
pub mod performance;

pub use error::PortfolioRiskError;
pub use types::*;

/// Standard result type for all portfolio-risk operations
pub type PortfolioRiskResult<T> = Result<T, PortfolioRiskError>;
