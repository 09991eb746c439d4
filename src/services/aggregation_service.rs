use chrono::NaiveDate;
use futures::future::join_all;
use std::collections::{BTreeSet, HashMap};
use tracing::info;

use crate::external::market_provider::MarketDataProvider;
use crate::models::{
    AnalysisResponse, ComparisonResponse, ComparisonSeries, PriceBar, SelectionResponse,
};
use crate::services::llm_service::LlmService;
use crate::services::{analysis_service, market_service};

/// Splits a comma-separated symbol list into normalized tickers.
pub fn parse_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Same normalization for symbol lists that arrive already split.
pub fn normalize_symbols(symbols: &[String]) -> Vec<String> {
    symbols
        .iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Full dashboard view model for a symbol list. Quotes are fetched
/// concurrently; the first symbol becomes the selected stock and gets
/// history, AI analysis and news. An empty list is answered with the empty
/// view model rather than an error.
pub async fn analyze(
    market: &dyn MarketDataProvider,
    llm: &LlmService,
    symbols: &[String],
) -> AnalysisResponse {
    if symbols.is_empty() {
        return AnalysisResponse::empty();
    }

    info!("📊 Building analysis for {} symbols: {:?}", symbols.len(), symbols);

    let stocks = market_service::get_quotes(market, symbols).await;

    // get_quotes yields one quote per requested symbol, so first exists here
    let Some(selected) = stocks.first().cloned() else {
        return AnalysisResponse::empty();
    };

    let historical_data = market_service::get_history(market, &selected.symbol).await;
    let ai_analysis = analysis_service::analyze_stock(llm, &selected, &historical_data).await;
    let news = market_service::get_news(market, &selected.symbol).await;

    AnalysisResponse {
        stocks,
        selected_stock: Some(selected),
        historical_data,
        ai_analysis: Some(ai_analysis),
        news,
    }
}

/// Re-selection of a single symbol: quote first, then history and news in
/// parallel, then the AI analysis over both.
pub async fn select_stock(
    market: &dyn MarketDataProvider,
    llm: &LlmService,
    symbol: &str,
) -> SelectionResponse {
    let stock = market_service::get_quote(market, symbol).await;

    let (historical_data, news) = tokio::join!(
        market_service::get_history(market, &stock.symbol),
        market_service::get_news(market, &stock.symbol),
    );

    let ai_analysis = analysis_service::analyze_stock(llm, &stock, &historical_data).await;

    SelectionResponse { stock, historical_data, ai_analysis, news }
}

/// Histories for several symbols, fetched concurrently. Failures are
/// absorbed per symbol by the market service, so one bad symbol cannot sink
/// the batch.
pub async fn history_map(
    market: &dyn MarketDataProvider,
    symbols: &[String],
) -> HashMap<String, Vec<PriceBar>> {
    let fetches = symbols.iter().map(|symbol| async move {
        let key = symbol.trim().to_uppercase();
        let series = market_service::get_history(market, symbol).await;
        (key, series)
    });

    join_all(fetches).await.into_iter().collect()
}

/// Aligns several histories onto one date axis for the comparison chart.
/// Each series is normalized to percent change from its own first close;
/// the axis is the sorted union of all dates and a symbol without a bar on
/// a given date contributes a gap, not a zero.
pub fn align_comparison(map: &HashMap<String, Vec<PriceBar>>) -> ComparisonResponse {
    let dates: Vec<NaiveDate> = map
        .values()
        .flat_map(|bars| bars.iter().map(|b| b.date))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut series: Vec<ComparisonSeries> = map
        .iter()
        .map(|(symbol, bars)| {
            let base = bars.first().map(|b| b.close).filter(|c| *c != 0.0);
            let by_date: HashMap<NaiveDate, f64> =
                bars.iter().map(|b| (b.date, b.close)).collect();

            let values = dates
                .iter()
                .map(|date| match (base, by_date.get(date)) {
                    (Some(base), Some(close)) => Some((close - base) / base * 100.0),
                    _ => None,
                })
                .collect();

            ComparisonSeries { symbol: symbol.clone(), values }
        })
        .collect();
    series.sort_by(|a, b| a.symbol.cmp(&b.symbol));

    ComparisonResponse { dates, series }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::market_provider::{MarketProviderError, ProviderQuote};
    use crate::models::NewsItem;
    use crate::services::llm_service::{LlmConfig, LlmService};
    use async_trait::async_trait;

    struct DownProvider;

    #[async_trait]
    impl MarketDataProvider for DownProvider {
        async fn fetch_quote(&self, _symbol: &str) -> Result<ProviderQuote, MarketProviderError> {
            Err(MarketProviderError::Network("connection refused".to_string()))
        }

        async fn fetch_daily_bars(
            &self,
            _symbol: &str,
            _days: u32,
        ) -> Result<Vec<PriceBar>, MarketProviderError> {
            Err(MarketProviderError::Network("connection refused".to_string()))
        }

        async fn fetch_news(
            &self,
            _symbol: &str,
            _limit: usize,
        ) -> Result<Vec<NewsItem>, MarketProviderError> {
            Err(MarketProviderError::Network("connection refused".to_string()))
        }
    }

    fn bar(date: &str, close: f64) -> PriceBar {
        PriceBar {
            date: date.parse().unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
        }
    }

    #[test]
    fn test_parse_symbols_normalizes_and_drops_empties() {
        assert_eq!(
            parse_symbols(" aapl, msft ,,TSLA "),
            vec!["AAPL".to_string(), "MSFT".to_string(), "TSLA".to_string()]
        );
        assert!(parse_symbols("").is_empty());
        assert!(parse_symbols(" , ,").is_empty());
    }

    #[test]
    fn test_normalize_symbols_matches_parse() {
        let split = vec![" aapl".to_string(), "".to_string(), "Msft ".to_string()];
        assert_eq!(
            normalize_symbols(&split),
            vec!["AAPL".to_string(), "MSFT".to_string()]
        );
    }

    #[tokio::test]
    async fn test_analyze_empty_symbols_returns_empty_view() {
        let llm = LlmService::new(LlmConfig::default());
        let response = analyze(&DownProvider, &llm, &[]).await;

        assert!(response.stocks.is_empty());
        assert!(response.selected_stock.is_none());
        assert!(response.historical_data.is_empty());
        assert!(response.ai_analysis.is_none());
        assert!(response.news.is_empty());
    }

    #[tokio::test]
    async fn test_analyze_survives_dead_provider() {
        let llm = LlmService::new(LlmConfig::default());
        let symbols = vec!["AAPL".to_string(), "MSFT".to_string()];

        let response = analyze(&DownProvider, &llm, &symbols).await;

        assert_eq!(response.stocks.len(), 2);
        assert_eq!(response.stocks[0].symbol, "AAPL");
        assert_eq!(response.stocks[1].symbol, "MSFT");
        assert_eq!(
            response.selected_stock.as_ref().map(|s| s.symbol.as_str()),
            Some("AAPL")
        );
        assert!(!response.historical_data.is_empty());
        assert!(response.ai_analysis.is_some());
        assert_eq!(response.news.len(), 3);
    }

    #[tokio::test]
    async fn test_select_stock_normalizes_symbol() {
        let llm = LlmService::new(LlmConfig::default());
        let response = select_stock(&DownProvider, &llm, " tsla ").await;

        assert_eq!(response.stock.symbol, "TSLA");
        assert!(!response.historical_data.is_empty());
        assert_eq!(response.news.len(), 3);
        assert!(response.ai_analysis.confidence_level >= 60.0);
    }

    #[tokio::test]
    async fn test_history_map_keyed_by_requested_symbols() {
        let symbols = vec!["AAPL".to_string(), "msft".to_string()];
        let map = history_map(&DownProvider, &symbols).await;

        assert_eq!(map.len(), 2);
        assert!(map.contains_key("AAPL"));
        assert!(map.contains_key("MSFT"));
        assert!(map.values().all(|bars| !bars.is_empty()));
    }

    #[test]
    fn test_align_comparison_unions_dates_with_gaps() {
        let mut map = HashMap::new();
        map.insert(
            "AAA".to_string(),
            vec![bar("2024-01-01", 100.0), bar("2024-01-02", 110.0)],
        );
        map.insert(
            "BBB".to_string(),
            vec![bar("2024-01-02", 200.0), bar("2024-01-03", 190.0)],
        );

        let response = align_comparison(&map);

        let expected: Vec<NaiveDate> = vec![
            "2024-01-01".parse().unwrap(),
            "2024-01-02".parse().unwrap(),
            "2024-01-03".parse().unwrap(),
        ];
        assert_eq!(response.dates, expected);

        assert_eq!(response.series.len(), 2);
        let aaa = &response.series[0];
        let bbb = &response.series[1];
        assert_eq!(aaa.symbol, "AAA");
        assert_eq!(bbb.symbol, "BBB");

        assert_eq!(aaa.values, vec![Some(0.0), Some(10.0), None]);
        assert_eq!(bbb.values, vec![None, Some(0.0), Some(-5.0)]);
    }

    #[test]
    fn test_align_comparison_empty_map() {
        let response = align_comparison(&HashMap::new());
        assert!(response.dates.is_empty());
        assert!(response.series.is_empty());
    }
}
