use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use tracing::info;

use crate::errors::AppError;
use crate::models::{
    AddWatchlistRequest, ToggleWatchlistRequest, ToggleWatchlistResponse, WatchlistActionResponse,
    WatchlistEntry,
};
use crate::services::{session_service, watchlist_service};
use crate::state::AppState;

// Every route here is session-gated: anonymous callers get 401, an
// unreachable auth backend gets 503. Store-level failures inside the
// handlers degrade to empty/false payloads instead.

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(add))
        .route("/toggle", post(toggle))
        .route("/:symbol", delete(remove))
}

async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<WatchlistEntry>>, AppError> {
    let user = session_service::require_user(&state.pool, &headers).await?;
    info!("GET /api/watchlist - Listing entries for {}", user.email);

    Ok(Json(watchlist_service::list_entries(&state.pool, &user.email).await))
}

async fn add(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<AddWatchlistRequest>,
) -> Result<Json<WatchlistActionResponse>, AppError> {
    let user = session_service::require_user(&state.pool, &headers).await?;

    if request.symbol.trim().is_empty() {
        return Err(AppError::Validation("Symbol cannot be empty".into()));
    }
    if request.company.trim().is_empty() {
        return Err(AppError::Validation("Company cannot be empty".into()));
    }

    info!("POST /api/watchlist - Adding {} for {}", request.symbol, user.email);
    let success =
        watchlist_service::add(&state.pool, &user.email, &request.symbol, &request.company).await;

    Ok(Json(WatchlistActionResponse { success }))
}

async fn remove(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<WatchlistActionResponse>, AppError> {
    let user = session_service::require_user(&state.pool, &headers).await?;
    info!("DELETE /api/watchlist/{} - Removing for {}", symbol, user.email);

    let success = watchlist_service::remove(&state.pool, &user.email, &symbol).await;
    Ok(Json(WatchlistActionResponse { success }))
}

async fn toggle(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ToggleWatchlistRequest>,
) -> Result<Json<ToggleWatchlistResponse>, AppError> {
    let user = session_service::require_user(&state.pool, &headers).await?;

    if request.symbol.trim().is_empty() {
        return Err(AppError::Validation("Symbol cannot be empty".into()));
    }

    info!("POST /api/watchlist/toggle - Toggling {} for {}", request.symbol, user.email);
    let response = watchlist_service::toggle(
        &state.pool,
        &user.email,
        &request.symbol,
        &request.company,
    )
    .await;

    Ok(Json(response))
}
