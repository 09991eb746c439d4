mod analysis;
mod history;
mod news;
mod portfolio;
mod quote;
mod user;
mod watchlist;

pub use analysis::{
    AiAnalysis, AnalysisResponse, AnalyzeRequest, InsightsRequest, InsightsResponse,
    PortfolioAnalysis, PriceTarget, Recommendation, RiskLevel, SelectionResponse, Trend,
};
pub use history::{ComparisonResponse, ComparisonSeries, PriceBar, ReturnsSummary};
pub use news::NewsItem;
pub use portfolio::{
    PortfolioAnalysisRequest, SimulatedHolding, SimulationRequest, SimulationResponse,
};
pub use quote::StockQuote;
pub use user::SessionUser;
pub use watchlist::{
    AddWatchlistRequest, ToggleWatchlistRequest, ToggleWatchlistResponse, WatchlistActionResponse,
    WatchlistEntry,
};
