use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily OHLCV bar. A history is ascending by date with no duplicate
/// dates; weekends and holidays simply have no bar, so consumers that
/// compare symbols must align by date, never by index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Performance summary over a close series, all fields in percent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnsSummary {
    pub total_return: f64,
    pub annualized_return: f64,
    pub volatility: f64,
}

/// Date-aligned comparison of several histories, each normalized to percent
/// change from its own first close. `values` runs parallel to `dates`;
/// a `None` marks a date on which that symbol had no bar (a gap, not a zero).
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResponse {
    pub dates: Vec<NaiveDate>,
    pub series: Vec<ComparisonSeries>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonSeries {
    pub symbol: String,
    pub values: Vec<Option<f64>>,
}
