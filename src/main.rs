mod app;
mod db;
mod errors;
mod external;
mod logging;
mod models;
mod routes;
mod services;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use crate::external::market_provider::MarketDataProvider;
use crate::external::yahoo::YahooProvider;
use crate::logging::LoggingConfig;
use crate::services::llm_service::{LlmConfig, LlmService};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    logging::init_logging(LoggingConfig::from_env())
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    // Lazy pool: the process starts without a reachable database and
    // connects on first use. Watchlist routes answer 503 until then.
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect_lazy(&database_url)
        .context("invalid DATABASE_URL")?;

    let provider_name =
        std::env::var("MARKET_PROVIDER").unwrap_or_else(|_| "yahoo".to_string());

    let market: Arc<dyn MarketDataProvider> = match provider_name.to_lowercase().as_str() {
        "yahoo" => {
            tracing::info!("📊 Using market data provider: Yahoo Finance");
            Arc::new(YahooProvider::new())
        }
        other => {
            anyhow::bail!("Invalid MARKET_PROVIDER: {}. Must be 'yahoo'", other);
        }
    };

    let llm = Arc::new(LlmService::new(LlmConfig::from_env()));

    let state = AppState { pool, market, llm };
    let app = app::create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 MarketSage backend running at http://{}/", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
