use crate::external::market_provider::{
    MarketDataProvider, MarketProviderError, ProviderQuote,
};
use crate::models::{NewsItem, PriceBar};
use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use tracing::debug;

pub struct YahooProvider {
    client: reqwest::Client,
}

impl YahooProvider {
    pub fn new() -> Self {
        Self { client: reqwest::Client::new() }
    }

    /// Sector/industry live on a separate endpoint; missing them is not
    /// a reason to fail the whole quote.
    async fn fetch_asset_profile(
        &self,
        symbol: &str,
    ) -> Result<(Option<String>, Option<String>), MarketProviderError> {
        let url = format!(
            "https://query1.finance.yahoo.com/v10/finance/quoteSummary/{symbol}?modules=assetProfile"
        );

        let resp = self.client
            .get(url)
            .send()
            .await
            .map_err(|e| MarketProviderError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketProviderError::RateLimited);
        }

        let body = resp
            .json::<YahooSummaryEnvelope>()
            .await
            .map_err(|e| MarketProviderError::Parse(e.to_string()))?;

        let profile = body
            .quote_summary
            .result
            .and_then(|r| r.into_iter().next())
            .and_then(|row| row.asset_profile);

        match profile {
            Some(p) => Ok((p.sector, p.industry)),
            None => Ok((None, None)),
        }
    }
}

// Minimal response structs (only what we need)

#[derive(Debug, Deserialize)]
struct YahooQuoteEnvelope {
    #[serde(rename = "quoteResponse")]
    quote_response: YahooQuoteResponse,
}

#[derive(Debug, Deserialize)]
struct YahooQuoteResponse {
    result: Option<Vec<YahooQuoteRow>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooQuoteRow {
    symbol: String,
    long_name: Option<String>,
    short_name: Option<String>,
    regular_market_price: Option<f64>,
    regular_market_change: Option<f64>,
    regular_market_change_percent: Option<f64>,
    regular_market_volume: Option<f64>,
    market_cap: Option<f64>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<f64>,
    eps_trailing_twelve_months: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct YahooSummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: YahooSummary,
}

#[derive(Debug, Deserialize)]
struct YahooSummary {
    result: Option<Vec<YahooSummaryRow>>,
}

#[derive(Debug, Deserialize)]
struct YahooSummaryRow {
    #[serde(rename = "assetProfile")]
    asset_profile: Option<YahooAssetProfile>,
}

#[derive(Debug, Deserialize)]
struct YahooAssetProfile {
    sector: Option<String>,
    industry: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooChartResult>>,
}

#[derive(Debug, Deserialize)]
struct YahooChartResult {
    timestamp: Vec<i64>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooOhlcv>,
}

#[derive(Debug, Deserialize)]
struct YahooOhlcv {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct YahooSearchResponse {
    news: Option<Vec<YahooSearchNewsItem>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooSearchNewsItem {
    title: String,
    publisher: String,
    link: String,
    provider_publish_time: i64,
    summary: Option<String>,
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    async fn fetch_quote(&self, symbol: &str) -> Result<ProviderQuote, MarketProviderError> {
        let url = format!(
            "https://query1.finance.yahoo.com/v7/finance/quote?symbols={symbol}"
        );

        let resp = self.client
            .get(url)
            .send()
            .await
            .map_err(|e| MarketProviderError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketProviderError::RateLimited);
        }

        let body = resp
            .json::<YahooQuoteEnvelope>()
            .await
            .map_err(|e| MarketProviderError::Parse(e.to_string()))?;

        let row = body
            .quote_response
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| MarketProviderError::BadResponse("missing quote".into()))?;

        let (sector, industry) = match self.fetch_asset_profile(symbol).await {
            Ok(profile) => profile,
            Err(e) => {
                debug!("No asset profile for {}: {}", symbol, e);
                (None, None)
            }
        };

        Ok(ProviderQuote {
            symbol: row.symbol,
            name: row.long_name.or(row.short_name),
            price: row.regular_market_price,
            change: row.regular_market_change,
            change_percent: row.regular_market_change_percent,
            market_cap: row.market_cap,
            volume: row.regular_market_volume,
            pe: row.trailing_pe,
            eps: row.eps_trailing_twelve_months,
            sector,
            industry,
        })
    }

    async fn fetch_daily_bars(
        &self,
        symbol: &str,
        days: u32,
    ) -> Result<Vec<PriceBar>, MarketProviderError> {
        // Yahoo supports ranges like "6mo", "1y". We'll map days roughly.
        let range = if days <= 30 { "1mo" }
        else if days <= 180 { "6mo" }
        else { "1y" };

        let url = format!(
            "https://query1.finance.yahoo.com/v8/finance/chart/{symbol}?range={range}&interval=1d"
        );

        let resp = self.client
            .get(url)
            .send()
            .await
            .map_err(|e| MarketProviderError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketProviderError::RateLimited);
        }

        let body = resp
            .json::<YahooChartResponse>()
            .await
            .map_err(|e| MarketProviderError::Parse(e.to_string()))?;

        let result = body.chart.result
            .and_then(|mut r| r.pop())
            .ok_or_else(|| MarketProviderError::BadResponse("missing result".into()))?;

        let ohlcv = result.indicators.quote
            .into_iter()
            .next()
            .ok_or_else(|| MarketProviderError::BadResponse("missing quote".into()))?;

        let mut out = Vec::new();

        // timestamp aligns with the OHLCV arrays by index
        for (i, ts) in result.timestamp.iter().enumerate() {
            let close = ohlcv.close.get(i).and_then(|v| *v);

            // skip missing closes
            let Some(close) = close else { continue };

            let dt = DateTime::from_timestamp(*ts, 0)
                .ok_or_else(|| MarketProviderError::Parse("bad timestamp".into()))?;

            out.push(PriceBar {
                date: dt.date_naive(),
                open: ohlcv.open.get(i).and_then(|v| *v).unwrap_or(close),
                high: ohlcv.high.get(i).and_then(|v| *v).unwrap_or(close),
                low: ohlcv.low.get(i).and_then(|v| *v).unwrap_or(close),
                close,
                volume: ohlcv.volume.get(i).and_then(|v| *v).unwrap_or(0.0),
            });
        }

        // Ensure ascending by date, one bar per day
        out.sort_by_key(|b| b.date);
        out.dedup_by_key(|b| b.date);

        Ok(out)
    }

    async fn fetch_news(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<NewsItem>, MarketProviderError> {
        let url = format!(
            "https://query1.finance.yahoo.com/v1/finance/search?q={symbol}&newsCount={limit}&quotesCount=0"
        );

        let resp = self.client
            .get(url)
            .send()
            .await
            .map_err(|e| MarketProviderError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketProviderError::RateLimited);
        }

        let body = resp
            .json::<YahooSearchResponse>()
            .await
            .map_err(|e| MarketProviderError::Parse(e.to_string()))?;

        let items = body.news
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| {
                let published_at = DateTime::from_timestamp(item.provider_publish_time, 0)?;
                let summary = item.summary.unwrap_or_else(|| item.title.clone());
                Some(NewsItem {
                    title: item.title,
                    summary,
                    url: item.link,
                    source: item.publisher,
                    published_at,
                })
            })
            .take(limit)
            .collect();

        Ok(items)
    }
}
