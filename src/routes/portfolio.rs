use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tracing::info;

use crate::errors::AppError;
use crate::models::{
    PortfolioAnalysis, PortfolioAnalysisRequest, SimulationRequest, SimulationResponse,
};
use crate::services::{analysis_service, portfolio_service};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/simulate", post(simulate))
        .route("/analysis", post(analyze))
}

async fn simulate(
    Json(request): Json<SimulationRequest>,
) -> Result<Json<SimulationResponse>, AppError> {
    info!("POST /api/portfolio/simulate - {} symbols", request.symbols.len());

    if !request.total_investment.is_finite() || request.total_investment <= 0.0 {
        return Err(AppError::Validation("Total investment must be a positive amount".into()));
    }

    Ok(Json(portfolio_service::build_simulation(&request)))
}

async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<PortfolioAnalysisRequest>,
) -> Json<PortfolioAnalysis> {
    info!("POST /api/portfolio/analysis - {} stocks", request.stocks.len());

    Json(analysis_service::analyze_portfolio(&state.llm, &request.stocks, &request.allocations).await)
}
