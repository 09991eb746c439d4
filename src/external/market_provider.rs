use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewsItem, PriceBar};

/// Raw quote fields as the upstream returns them. Anything the endpoint
/// did not supply stays None; the service layer decides what is usable.
#[derive(Debug, Clone, Default)]
pub struct ProviderQuote {
    pub symbol: String,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    pub market_cap: Option<f64>,
    pub volume: Option<f64>,
    pub pe: Option<f64>,
    pub eps: Option<f64>,
    pub sector: Option<String>,
    pub industry: Option<String>,
}

#[derive(Debug, Error)]
pub enum MarketProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("rate limited")]
    RateLimited,
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch_quote(&self, symbol: &str) -> Result<ProviderQuote, MarketProviderError>;

    async fn fetch_daily_bars(
        &self,
        symbol: &str,
        days: u32,
    ) -> Result<Vec<PriceBar>, MarketProviderError>;

    async fn fetch_news(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<NewsItem>, MarketProviderError>;
}
