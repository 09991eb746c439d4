use serde::{Deserialize, Serialize};

/// Snapshot of one ticker as the dashboard shows it. Built per request,
/// never persisted. `price` is always a positive finite number; when the
/// upstream lookup cannot supply one, the quote adapter synthesizes the
/// whole quote instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockQuote {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub market_cap: Option<f64>,
    pub volume: Option<f64>,
    pub pe: Option<f64>,
    pub eps: Option<f64>,
    pub sector: Option<String>,
    pub industry: Option<String>,
}
