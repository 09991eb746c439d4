use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One row of a user's watchlist. `user_id` is the opaque id minted by the
/// auth subsystem, never the email. (user_id, symbol) is unique.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntry {
    pub id: Uuid,
    pub user_id: String,
    pub symbol: String,
    pub company: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct AddWatchlistRequest {
    pub symbol: String,
    pub company: String,
}

#[derive(Debug, Deserialize)]
pub struct ToggleWatchlistRequest {
    pub symbol: String,
    pub company: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleWatchlistResponse {
    pub success: bool,
    pub is_in_watchlist: bool,
}

#[derive(Debug, Serialize)]
pub struct WatchlistActionResponse {
    pub success: bool,
}
