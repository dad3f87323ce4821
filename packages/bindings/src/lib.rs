use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Risk
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_portfolio_risk(input_json: String) -> NapiResult<String> {
    let input: portfolio_risk_core::var::PortfolioRiskInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        portfolio_risk_core::var::calculate_portfolio_risk(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Absorbing variant: always returns a JSON document, never throws.
/// Failures come back as `{"error": "Risk calculation failed: ..."}`.
#[napi]
pub fn assess_portfolio(input_json: String) -> String {
    portfolio_risk_core::var::assess_portfolio_json(&input_json).to_string()
}

// ---------------------------------------------------------------------------
// Performance
// ---------------------------------------------------------------------------

#[napi]
pub fn portfolio_performance(input_json: String) -> NapiResult<String> {
    let input: portfolio_risk_core::performance::PerformanceInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        portfolio_risk_core::performance::calculate_performance(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
