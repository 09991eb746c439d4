use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::info;

use crate::models::{
    AnalysisResponse, AnalyzeRequest, ComparisonResponse, PriceBar, ReturnsSummary,
    SelectionResponse,
};
use crate::services::{aggregation_service, market_service, stats};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(run_analysis))
        .route("/history", get(history))
        .route("/compare", get(compare))
        .route("/:symbol", get(select_stock))
        .route("/:symbol/returns", get(symbol_returns))
}

#[derive(Debug, Deserialize)]
struct SymbolsQuery {
    symbols: Option<String>,
}

impl SymbolsQuery {
    fn parsed(&self) -> Vec<String> {
        self.symbols
            .as_deref()
            .map(aggregation_service::parse_symbols)
            .unwrap_or_default()
    }
}

async fn run_analysis(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Json<AnalysisResponse> {
    info!("POST /api/analysis - {} symbols requested", request.symbols.len());
    let symbols = aggregation_service::normalize_symbols(&request.symbols);

    Json(aggregation_service::analyze(state.market.as_ref(), &state.llm, &symbols).await)
}

async fn select_stock(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
) -> Json<SelectionResponse> {
    info!("GET /api/analysis/{} - Reselecting stock", symbol);

    Json(aggregation_service::select_stock(state.market.as_ref(), &state.llm, &symbol).await)
}

async fn history(
    Query(query): Query<SymbolsQuery>,
    State(state): State<AppState>,
) -> Json<HashMap<String, Vec<PriceBar>>> {
    let symbols = query.parsed();
    info!("GET /api/analysis/history - {} symbols", symbols.len());

    Json(aggregation_service::history_map(state.market.as_ref(), &symbols).await)
}

async fn compare(
    Query(query): Query<SymbolsQuery>,
    State(state): State<AppState>,
) -> Json<ComparisonResponse> {
    let symbols = query.parsed();
    info!("GET /api/analysis/compare - {} symbols", symbols.len());

    let map = aggregation_service::history_map(state.market.as_ref(), &symbols).await;
    Json(aggregation_service::align_comparison(&map))
}

async fn symbol_returns(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
) -> Json<ReturnsSummary> {
    info!("GET /api/analysis/{}/returns - Computing returns summary", symbol);

    let bars = market_service::get_history(state.market.as_ref(), &symbol).await;
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    Json(stats::returns(&closes))
}
