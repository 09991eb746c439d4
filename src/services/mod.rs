pub mod aggregation_service;
pub mod analysis_service;
pub mod llm_service;
pub mod market_service;
pub mod portfolio_service;
pub mod session_service;
pub mod stats;
pub mod watchlist_service;
