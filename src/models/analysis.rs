use serde::{Deserialize, Serialize};

use crate::models::history::PriceBar;
use crate::models::news::NewsItem;
use crate::models::quote::StockQuote;

/// Structured AI verdict for one stock. Ephemeral: rebuilt on every request,
/// whether it came from the model or from the deterministic fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysis {
    pub company_overview: String,
    pub market_position: String,
    pub financial_health: String,
    pub investment_recommendation: Recommendation,
    pub confidence_level: f64,
    pub risk_assessment: String,
    pub price_target: PriceTarget,
    pub key_drivers: Vec<String>,
    pub risks: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Buy,
    Hold,
    Sell,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceTarget {
    pub low: f64,
    pub high: f64,
    pub timeframe: String,
}

/// Direction of recent price action, classified from a close series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Neutral,
    Upward,
    Downward,
    Sideways,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Neutral => write!(f, "neutral"),
            Trend::Upward => write!(f, "upward"),
            Trend::Downward => write!(f, "downward"),
            Trend::Sideways => write!(f, "sideways"),
        }
    }
}

/// Portfolio-level AI verdict with deterministic defaults when the model
/// is unavailable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioAnalysis {
    pub total_value: f64,
    pub total_return: f64,
    pub diversification: f64,
    pub risk_level: RiskLevel,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

// ==============================================================================
// Request / Response DTOs
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub symbols: Vec<String>,
}

/// Consolidated view the dashboard renders in one pass. An empty symbol
/// list yields the empty shape (no stocks, no selection), never an error.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub stocks: Vec<StockQuote>,
    pub selected_stock: Option<StockQuote>,
    pub historical_data: Vec<PriceBar>,
    pub ai_analysis: Option<AiAnalysis>,
    pub news: Vec<NewsItem>,
}

impl AnalysisResponse {
    pub fn empty() -> Self {
        Self {
            stocks: Vec::new(),
            selected_stock: None,
            historical_data: Vec::new(),
            ai_analysis: None,
            news: Vec::new(),
        }
    }
}

/// Everything the dashboard needs when the user picks a different symbol.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResponse {
    pub stock: StockQuote,
    pub historical_data: Vec<PriceBar>,
    pub ai_analysis: AiAnalysis,
    pub news: Vec<NewsItem>,
}

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub insights: String,
}

#[derive(Debug, Deserialize)]
pub struct InsightsRequest {
    pub stocks: Vec<StockQuote>,
}
