use sqlx::PgPool;

use crate::models::WatchlistEntry;

// ==============================================================================
// Watchlist Entry Operations
// ==============================================================================

pub async fn entries_for_user(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<WatchlistEntry>, sqlx::Error> {
    sqlx::query_as::<_, WatchlistEntry>(
        r#"
        SELECT * FROM watchlist_entries
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn contains_symbol(
    pool: &PgPool,
    user_id: &str,
    symbol: &str,
) -> Result<bool, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM watchlist_entries WHERE user_id = $1 AND symbol = $2",
    )
    .bind(user_id)
    .bind(symbol)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

/// Inserts one entry. A duplicate (user_id, symbol) is a benign no-op thanks
/// to the unique index; the return value says whether a row was actually
/// written.
pub async fn insert_entry(
    pool: &PgPool,
    user_id: &str,
    symbol: &str,
    company: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO watchlist_entries (user_id, symbol, company)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, symbol) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(symbol)
    .bind(company)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete_entry(
    pool: &PgPool,
    user_id: &str,
    symbol: &str,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM watchlist_entries WHERE user_id = $1 AND symbol = $2")
            .bind(user_id)
            .bind(symbol)
            .execute(pool)
            .await?;

    Ok(result.rows_affected() > 0)
}
