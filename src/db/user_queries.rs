use sqlx::PgPool;

// ==============================================================================
// User Lookups (auth-owned table, read-only here)
// ==============================================================================

pub async fn find_user_id_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<String>, sqlx::Error> {
    let row: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|(id,)| id))
}
