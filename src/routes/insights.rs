use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tracing::info;

use crate::models::{InsightsRequest, InsightsResponse};
use crate::services::analysis_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(generate_insights))
}

async fn generate_insights(
    State(state): State<AppState>,
    Json(request): Json<InsightsRequest>,
) -> Json<InsightsResponse> {
    info!("POST /api/insights - {} stocks", request.stocks.len());

    let insights = analysis_service::market_insights(&state.llm, &request.stocks).await;
    Json(InsightsResponse { insights })
}
