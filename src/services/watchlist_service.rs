use sqlx::PgPool;
use tracing::{error, info};

use crate::db::{user_queries, watchlist_queries};
use crate::models::{ToggleWatchlistResponse, WatchlistEntry};

/// Watchlist operations keyed by the session email. The auth subsystem owns
/// the user table, so every operation re-resolves email to the opaque user
/// id first. Store failures degrade to empty/false results; only session
/// resolution (handled in the routes) can fail a request outright.

async fn resolve_user_id(pool: &PgPool, email: &str) -> Option<String> {
    match user_queries::find_user_id_by_email(pool, email).await {
        Ok(id) => id,
        Err(e) => {
            error!("User lookup failed for {}: {}", email, e);
            None
        }
    }
}

pub async fn list_entries(pool: &PgPool, email: &str) -> Vec<WatchlistEntry> {
    let Some(user_id) = resolve_user_id(pool, email).await else {
        return Vec::new();
    };

    match watchlist_queries::entries_for_user(pool, &user_id).await {
        Ok(entries) => entries,
        Err(e) => {
            error!("Watchlist fetch failed for {}: {}", user_id, e);
            Vec::new()
        }
    }
}

/// Adds a symbol. Adding one that is already present is a success, the
/// store keeps a single row either way.
pub async fn add(pool: &PgPool, email: &str, symbol: &str, company: &str) -> bool {
    let Some(user_id) = resolve_user_id(pool, email).await else {
        return false;
    };
    let symbol = symbol.trim().to_uppercase();

    match watchlist_queries::insert_entry(pool, &user_id, &symbol, company.trim()).await {
        Ok(inserted) => {
            if inserted {
                info!("Added {} to watchlist of {}", symbol, user_id);
            }
            true
        }
        Err(e) => {
            error!("Watchlist insert failed for {}: {}", symbol, e);
            false
        }
    }
}

/// Removes a symbol; false when no such row existed.
pub async fn remove(pool: &PgPool, email: &str, symbol: &str) -> bool {
    let Some(user_id) = resolve_user_id(pool, email).await else {
        return false;
    };
    let symbol = symbol.trim().to_uppercase();

    match watchlist_queries::delete_entry(pool, &user_id, &symbol).await {
        Ok(deleted) => {
            if deleted {
                info!("Removed {} from watchlist of {}", symbol, user_id);
            }
            deleted
        }
        Err(e) => {
            error!("Watchlist delete failed for {}: {}", symbol, e);
            false
        }
    }
}

/// Membership flip. Read-then-act, so two concurrent toggles of the same
/// symbol race and the last write wins.
pub async fn toggle(
    pool: &PgPool,
    email: &str,
    symbol: &str,
    company: &str,
) -> ToggleWatchlistResponse {
    let Some(user_id) = resolve_user_id(pool, email).await else {
        return ToggleWatchlistResponse { success: false, is_in_watchlist: false };
    };
    let symbol = symbol.trim().to_uppercase();

    let currently_in = match watchlist_queries::contains_symbol(pool, &user_id, &symbol).await {
        Ok(contained) => contained,
        Err(e) => {
            error!("Watchlist membership check failed for {}: {}", symbol, e);
            return ToggleWatchlistResponse { success: false, is_in_watchlist: false };
        }
    };

    if currently_in {
        match watchlist_queries::delete_entry(pool, &user_id, &symbol).await {
            Ok(_) => ToggleWatchlistResponse { success: true, is_in_watchlist: false },
            Err(e) => {
                error!("Watchlist delete failed for {}: {}", symbol, e);
                ToggleWatchlistResponse { success: false, is_in_watchlist: true }
            }
        }
    } else {
        match watchlist_queries::insert_entry(pool, &user_id, &symbol, company.trim()).await {
            Ok(_) => ToggleWatchlistResponse { success: true, is_in_watchlist: true },
            Err(e) => {
                error!("Watchlist insert failed for {}: {}", symbol, e);
                ToggleWatchlistResponse { success: false, is_in_watchlist: false }
            }
        }
    }
}
