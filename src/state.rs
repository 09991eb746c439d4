use std::sync::Arc;
use sqlx::PgPool;
use crate::external::market_provider::MarketDataProvider;
use crate::services::llm_service::LlmService;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub market: Arc<dyn MarketDataProvider>,
    pub llm: Arc<LlmService>,
}
