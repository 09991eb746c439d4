use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::errors::LlmError;
use crate::models::{
    AiAnalysis, PortfolioAnalysis, PriceBar, PriceTarget, Recommendation, RiskLevel, StockQuote,
};
use crate::services::llm_service::LlmService;
use crate::services::stats;

/// AI verdict for one stock. Every failure mode of the generative path,
/// missing key, transport error, unusable response text, lands on the same
/// deterministic fallback, so callers always get a complete analysis and
/// cannot tell which path produced it.
pub async fn analyze_stock(
    llm: &LlmService,
    quote: &StockQuote,
    history: &[PriceBar],
) -> AiAnalysis {
    let closes: Vec<f64> = history.iter().map(|b| b.close).collect();

    let prompt = build_analysis_prompt(quote, &closes);

    match llm.generate(prompt).await {
        Ok(response) => match parse_analysis(&response) {
            Some(analysis) => {
                info!(
                    "✓ AI analysis for {}: {:?}",
                    quote.symbol, analysis.investment_recommendation
                );
                analysis
            }
            None => {
                warn!(
                    "No usable JSON in AI response for {}, using fallback analysis",
                    quote.symbol
                );
                fallback_analysis(quote, &closes)
            }
        },
        Err(LlmError::Disabled) => {
            info!("Text generation disabled, using fallback analysis for {}", quote.symbol);
            fallback_analysis(quote, &closes)
        }
        Err(e) => {
            warn!("AI analysis failed for {}: {}. Using fallback analysis", quote.symbol, e);
            fallback_analysis(quote, &closes)
        }
    }
}

/// Free-text market commentary over a stock list. Falls back to a summary
/// derived from the quotes themselves when the model is unavailable.
pub async fn market_insights(llm: &LlmService, stocks: &[StockQuote]) -> String {
    let portfolio_json =
        serde_json::to_string_pretty(stocks).unwrap_or_else(|_| "[]".to_string());

    let prompt = format!(
        r#"
Analyze the following portfolio/market data and provide key market insights:

Portfolio Data: {portfolio_json}

Provide 3-5 key market insights and trends based on this data. Focus on:
- Overall market sentiment
- Sector performance
- Notable trends or patterns
- Investment opportunities or risks

Keep it concise but insightful.
"#
    );

    match llm.generate(prompt).await {
        Ok(text) => text,
        Err(LlmError::Disabled) => fallback_insights(stocks),
        Err(e) => {
            warn!("Market insights generation failed: {}. Using derived summary", e);
            fallback_insights(stocks)
        }
    }
}

/// Shape of the portfolio verdict the model is asked for. Every field is
/// optional so a partially useful answer still contributes.
#[derive(Debug, Deserialize)]
struct PortfolioVerdict {
    diversification: Option<f64>,
    #[serde(rename = "riskLevel")]
    risk_level: Option<RiskLevel>,
    recommendations: Option<Vec<String>>,
}

/// Portfolio-level verdict. Value and return are computed locally from the
/// quotes and allocations; only the qualitative fields come from the model,
/// with deterministic defaults when it cannot answer.
pub async fn analyze_portfolio(
    llm: &LlmService,
    stocks: &[StockQuote],
    allocations: &HashMap<String, f64>,
) -> PortfolioAnalysis {
    let total_value: f64 = stocks
        .iter()
        .map(|s| s.price * allocations.get(&s.symbol).copied().unwrap_or(0.0))
        .sum();
    let total_return: f64 = stocks
        .iter()
        .map(|s| s.change_percent * allocations.get(&s.symbol).copied().unwrap_or(0.0) / 100.0)
        .sum();

    let portfolio_json =
        serde_json::to_string_pretty(stocks).unwrap_or_else(|_| "[]".to_string());
    let allocations_json =
        serde_json::to_string_pretty(allocations).unwrap_or_else(|_| "{}".to_string());

    let prompt = format!(
        r#"
Analyze this investment portfolio and provide recommendations:

Portfolio: {portfolio_json}
Allocations: {allocations_json}
Total Value: ${total_value:.2}
Total Return: {total_return:.2}%

Provide portfolio analysis in JSON format:
{{
  "diversification": 0-100,
  "riskLevel": "Low|Medium|High",
  "recommendations": ["rec1", "rec2", "rec3"]
}}
"#
    );

    let verdict = match llm.generate(prompt).await {
        Ok(response) => {
            let cleaned = strip_code_fences(&response);
            serde_json::from_str::<PortfolioVerdict>(cleaned.trim()).unwrap_or_else(|e| {
                warn!("Portfolio verdict did not parse: {}. Using defaults", e);
                PortfolioVerdict { diversification: None, risk_level: None, recommendations: None }
            })
        }
        Err(e) => {
            if !matches!(e, LlmError::Disabled) {
                warn!("Portfolio analysis generation failed: {}. Using defaults", e);
            }
            PortfolioVerdict { diversification: None, risk_level: None, recommendations: None }
        }
    };

    PortfolioAnalysis {
        total_value,
        total_return,
        diversification: verdict.diversification.unwrap_or(50.0),
        risk_level: verdict.risk_level.unwrap_or(RiskLevel::Medium),
        recommendations: verdict.recommendations.unwrap_or_else(default_recommendations),
    }
}

// ==============================================================================
// Prompt construction
// ==============================================================================

fn build_analysis_prompt(quote: &StockQuote, closes: &[f64]) -> String {
    let avg_price = if closes.is_empty() {
        quote.price
    } else {
        closes.iter().sum::<f64>() / closes.len() as f64
    };
    let volatility = stats::volatility(closes);
    let trend = stats::trend(closes);

    let sign = if quote.change_percent >= 0.0 { "+" } else { "" };
    let market_cap = quote
        .market_cap
        .map(|mc| format!("${:.1}B", mc / 1e9))
        .unwrap_or_else(|| "N/A".to_string());
    let sector = quote.sector.as_deref().unwrap_or("N/A");
    let pe = quote
        .pe
        .map(|p| p.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    let target_low = (quote.price * 0.85).round() as i64;
    let target_high = (quote.price * 1.25).round() as i64;

    format!(
        r#"
You are an expert financial analyst with 20+ years of experience. Provide a detailed stock analysis based on the following data:

COMPANY INFORMATION:
- Symbol: {symbol}
- Company: {name}
- Current Price: ${price}
- Daily Change: {sign}{change:.2}%
- Market Cap: {market_cap}
- Sector: {sector}
- P/E Ratio: {pe}

TECHNICAL ANALYSIS:
- Average Price (6 months): ${avg_price:.2}
- Price Volatility: {volatility:.2}%
- Trend Direction: {trend}
- Historical Data Points: {points}

Provide a comprehensive analysis in this exact JSON format:
{{
  "companyOverview": "Detailed description of the company's business model, products, and market presence",
  "marketPosition": "Competitive analysis including market share, industry position, and growth potential",
  "financialHealth": "Assessment of financial metrics, profitability, debt levels, and cash flow",
  "investmentRecommendation": "BUY, HOLD, or SELL (be decisive and explain reasoning)",
  "confidenceLevel": 75,
  "riskAssessment": "Detailed risk evaluation including market, sector, and company-specific risks",
  "priceTarget": {{
    "low": {target_low},
    "high": {target_high},
    "timeframe": "12 months"
  }},
  "keyDrivers": ["Primary growth driver 1", "Primary growth driver 2", "Primary growth driver 3"],
  "risks": ["Major risk factor 1", "Major risk factor 2", "Major risk factor 3"]
}}

Be specific, data-driven, and provide actionable insights. Consider current market conditions and provide realistic price targets.
"#,
        symbol = quote.symbol,
        name = quote.name,
        price = quote.price,
        sign = sign,
        change = quote.change_percent,
        market_cap = market_cap,
        sector = sector,
        pe = pe,
        avg_price = avg_price,
        volatility = volatility,
        trend = trend,
        points = closes.len(),
    )
}

// ==============================================================================
// Response parsing
// ==============================================================================

fn json_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Greedy: first '{' through last '}' so nested objects survive
    RE.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("literal pattern"))
}

fn strip_code_fences(response: &str) -> String {
    response.replace("```json", "").replace("```", "")
}

/// Pull the structured verdict out of whatever the model wrote. Models wrap
/// JSON in code fences or prose; both are tolerated. Returns None when no
/// block parses as the expected shape.
fn parse_analysis(response: &str) -> Option<AiAnalysis> {
    let cleaned = strip_code_fences(response);
    let cleaned = cleaned.trim();

    let block = json_block_re().find(cleaned)?.as_str();

    match serde_json::from_str::<AiAnalysis>(block) {
        Ok(analysis) => Some(analysis),
        Err(e) => {
            warn!("AI response JSON did not match the analysis shape: {}", e);
            None
        }
    }
}

// ==============================================================================
// Deterministic fallbacks
// ==============================================================================

fn fallback_analysis(quote: &StockQuote, closes: &[f64]) -> AiAnalysis {
    let avg_price = if closes.is_empty() {
        quote.price
    } else {
        closes.iter().sum::<f64>() / closes.len() as f64
    };
    let volatility = stats::volatility(closes);
    let trend = stats::trend(closes);

    let recommendation = if quote.change_percent > 5.0 {
        Recommendation::Buy
    } else if quote.change_percent < -5.0 {
        Recommendation::Sell
    } else {
        Recommendation::Hold
    };

    let sector = quote.sector.as_deref().unwrap_or("technology");
    let market_cap = quote.market_cap.unwrap_or(0.0);
    let cap_label = if market_cap > 100_000_000_000.0 {
        "large-cap"
    } else if market_cap > 2_000_000_000.0 {
        "mid-cap"
    } else {
        "small-cap"
    };
    let cap_text = quote
        .market_cap
        .map(|mc| format!("${:.1} billion", mc / 1e9))
        .unwrap_or_else(|| "undisclosed".to_string());
    let valuation = match quote.pe {
        Some(pe) if pe < 20.0 => "attractive valuation metrics",
        Some(pe) if pe > 30.0 => "premium valuation",
        _ => "reasonable market valuation",
    };
    let pe_text = quote
        .pe
        .map(|p| p.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    let momentum = if quote.change_percent >= 0.0 {
        "positive momentum"
    } else {
        "negative momentum"
    };

    AiAnalysis {
        company_overview: format!(
            "{} ({}) is a publicly traded company operating in the {} sector. The company \
             has shown {} momentum over the past 6 months with an average price of ${:.2} \
             and volatility of {:.2}%.",
            quote.name, quote.symbol, sector, trend, avg_price, volatility
        ),
        market_position: format!(
            "{} operates in a competitive {} market. The company's market capitalization \
             of {} positions it as a {} company with significant market presence.",
            quote.name, sector, cap_text, cap_label
        ),
        financial_health: format!(
            "Trading at ${} with a P/E ratio of {}, {} demonstrates {}. The company shows \
             {} with {:.2}% daily movement.",
            quote.price, pe_text, quote.name, valuation, momentum,
            quote.change_percent.abs()
        ),
        investment_recommendation: recommendation,
        confidence_level: (70.0 + quote.change_percent * 2.0).clamp(60.0, 90.0),
        risk_assessment: format!(
            "Market volatility poses the primary risk with {:.2}% historical volatility. \
             Sector-specific risks in {} include competitive pressures and regulatory \
             changes. Company-specific risks include execution risks and market acceptance \
             of products/services.",
            volatility, sector
        ),
        price_target: PriceTarget {
            low: (quote.price * 0.85).round(),
            high: (quote.price * 1.25).round(),
            timeframe: "12 months".to_string(),
        },
        key_drivers: vec![
            format!("{} price momentum and market sentiment", trend),
            format!("Strong {} sector performance", sector),
            "Company's competitive advantages and market position".to_string(),
        ],
        risks: vec![
            format!("High market volatility ({:.2}% historical)", volatility),
            format!("Sector-specific risks in {}", sector),
            "Economic downturns and market corrections".to_string(),
        ],
    }
}

fn fallback_insights(stocks: &[StockQuote]) -> String {
    if stocks.is_empty() {
        return "No stock data available to generate market insights.".to_string();
    }

    let avg_change =
        stocks.iter().map(|s| s.change_percent).sum::<f64>() / stocks.len() as f64;
    let advancing = stocks.iter().filter(|s| s.change_percent >= 0.0).count();

    // slice is non-empty here, so min/max always exist
    let leader = stocks
        .iter()
        .max_by(|a, b| a.change_percent.total_cmp(&b.change_percent))
        .map(|s| (s.symbol.as_str(), s.change_percent))
        .unwrap_or(("n/a", 0.0));
    let laggard = stocks
        .iter()
        .min_by(|a, b| a.change_percent.total_cmp(&b.change_percent))
        .map(|s| (s.symbol.as_str(), s.change_percent))
        .unwrap_or(("n/a", 0.0));

    let sentiment = if avg_change >= 1.0 {
        "positive"
    } else if avg_change <= -1.0 {
        "negative"
    } else {
        "mixed"
    };

    format!(
        "Sentiment across the {} tracked stocks is {}, with an average daily move of \
         {:+.2}%. {} leads the group at {:+.2}% while {} trails at {:+.2}%. {} of {} \
         names are advancing on the day. Consider sector concentration and recent \
         volatility before adding exposure.",
        stocks.len(),
        sentiment,
        avg_change,
        leader.0,
        leader.1,
        laggard.0,
        laggard.1,
        advancing,
        stocks.len()
    )
}

fn default_recommendations() -> Vec<String> {
    vec![
        "Diversify your portfolio".to_string(),
        "Monitor market conditions".to_string(),
        "Consider long-term holding".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::llm_service::LlmConfig;

    fn quote(change_percent: f64) -> StockQuote {
        StockQuote {
            symbol: "AAPL".to_string(),
            name: "Apple Inc.".to_string(),
            price: 200.0,
            change: 2.0,
            change_percent,
            market_cap: Some(3_000_000_000_000.0),
            volume: Some(50_000_000.0),
            pe: Some(28.0),
            eps: Some(6.4),
            sector: Some("Technology".to_string()),
            industry: Some("Consumer Electronics".to_string()),
        }
    }

    const VALID_ANALYSIS_JSON: &str = r#"{
        "companyOverview": "A large tech company.",
        "marketPosition": "Dominant in its niche.",
        "financialHealth": "Strong balance sheet.",
        "investmentRecommendation": "BUY",
        "confidenceLevel": 82,
        "riskAssessment": "Moderate risk.",
        "priceTarget": { "low": 170, "high": 250, "timeframe": "12 months" },
        "keyDrivers": ["services growth", "buybacks", "new products"],
        "risks": ["regulation", "supply chain", "competition"]
    }"#;

    #[test]
    fn test_parse_analysis_plain_json() {
        let parsed = parse_analysis(VALID_ANALYSIS_JSON).unwrap();
        assert_eq!(parsed.investment_recommendation, Recommendation::Buy);
        assert_eq!(parsed.price_target.timeframe, "12 months");
    }

    #[test]
    fn test_parse_analysis_strips_code_fences() {
        let fenced = format!("```json\n{}\n```", VALID_ANALYSIS_JSON);
        let parsed = parse_analysis(&fenced).unwrap();
        assert_eq!(parsed.confidence_level, 82.0);
    }

    #[test]
    fn test_parse_analysis_finds_json_inside_prose() {
        let wrapped = format!(
            "Sure! Here is the analysis you asked for:\n{}\nLet me know if you need more.",
            VALID_ANALYSIS_JSON
        );
        assert!(parse_analysis(&wrapped).is_some());
    }

    #[test]
    fn test_parse_analysis_rejects_unusable_text() {
        assert!(parse_analysis("I cannot answer that.").is_none());
        assert!(parse_analysis(r#"{"foo": 1}"#).is_none());
    }

    #[test]
    fn test_fallback_recommendation_thresholds() {
        let closes: Vec<f64> = Vec::new();
        assert_eq!(
            fallback_analysis(&quote(6.0), &closes).investment_recommendation,
            Recommendation::Buy
        );
        assert_eq!(
            fallback_analysis(&quote(-6.0), &closes).investment_recommendation,
            Recommendation::Sell
        );
        assert_eq!(
            fallback_analysis(&quote(5.0), &closes).investment_recommendation,
            Recommendation::Hold
        );
        assert_eq!(
            fallback_analysis(&quote(-5.0), &closes).investment_recommendation,
            Recommendation::Hold
        );
    }

    #[test]
    fn test_fallback_confidence_clamped() {
        let closes: Vec<f64> = Vec::new();
        assert_eq!(fallback_analysis(&quote(50.0), &closes).confidence_level, 90.0);
        assert_eq!(fallback_analysis(&quote(-50.0), &closes).confidence_level, 60.0);
        assert_eq!(fallback_analysis(&quote(0.0), &closes).confidence_level, 70.0);
        assert_eq!(fallback_analysis(&quote(5.0), &closes).confidence_level, 80.0);
    }

    #[test]
    fn test_fallback_price_target_band() {
        let analysis = fallback_analysis(&quote(1.0), &[]);
        assert_eq!(analysis.price_target.low, 170.0);
        assert_eq!(analysis.price_target.high, 250.0);
        assert!(analysis.price_target.low < analysis.price_target.high);
    }

    #[test]
    fn test_fallback_defaults_sector_to_technology() {
        let mut q = quote(0.0);
        q.sector = None;
        let analysis = fallback_analysis(&q, &[]);
        assert!(analysis.company_overview.contains("technology sector"));
    }

    #[test]
    fn test_fallback_cap_tiers() {
        let mut q = quote(0.0);
        q.market_cap = Some(3_000_000_000_000.0);
        assert!(fallback_analysis(&q, &[]).market_position.contains("large-cap"));

        q.market_cap = Some(50_000_000_000.0);
        assert!(fallback_analysis(&q, &[]).market_position.contains("mid-cap"));

        q.market_cap = Some(500_000_000.0);
        assert!(fallback_analysis(&q, &[]).market_position.contains("small-cap"));
    }

    #[tokio::test]
    async fn test_analyze_stock_without_model_uses_fallback() {
        let llm = LlmService::new(LlmConfig::default());
        let analysis = analyze_stock(&llm, &quote(7.5), &[]).await;

        assert_eq!(analysis.investment_recommendation, Recommendation::Buy);
        assert!(analysis.confidence_level >= 60.0 && analysis.confidence_level <= 90.0);
    }

    #[tokio::test]
    async fn test_market_insights_without_model_summarizes_quotes() {
        let llm = LlmService::new(LlmConfig::default());
        let mut loser = quote(-3.2);
        loser.symbol = "TSLA".to_string();

        let insights = market_insights(&llm, &[quote(2.4), loser]).await;
        assert!(insights.contains("AAPL"));
        assert!(insights.contains("TSLA"));
    }

    #[tokio::test]
    async fn test_analyze_portfolio_without_model_uses_defaults() {
        let llm = LlmService::new(LlmConfig::default());
        let stocks = vec![quote(2.0)];
        let mut allocations = HashMap::new();
        allocations.insert("AAPL".to_string(), 50.0);

        let analysis = analyze_portfolio(&llm, &stocks, &allocations).await;

        assert_eq!(analysis.total_value, 200.0 * 50.0);
        assert!((analysis.total_return - 1.0).abs() < 1e-9);
        assert_eq!(analysis.diversification, 50.0);
        assert_eq!(analysis.risk_level, RiskLevel::Medium);
        assert_eq!(analysis.recommendations.len(), 3);
    }
}
