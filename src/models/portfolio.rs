use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::quote::StockQuote;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRequest {
    pub symbols: Vec<String>,
    pub total_investment: f64,
    /// Percent weight per symbol. Absent symbols get the equal split.
    /// Weights are independent sliders and are NOT normalized to 100.
    #[serde(default)]
    pub weights: Option<HashMap<String, f64>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedHolding {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub weight: f64,
    pub shares: f64,
    pub value: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResponse {
    pub holdings: Vec<SimulatedHolding>,
    pub total_value: f64,
    pub total_weight: f64,
    /// Set when any single holding carries more than 30% weight.
    pub concentrated: bool,
}

#[derive(Debug, Deserialize)]
pub struct PortfolioAnalysisRequest {
    pub stocks: Vec<StockQuote>,
    pub allocations: HashMap<String, f64>,
}
