use sqlx::PgPool;

use crate::models::SessionUser;

// ==============================================================================
// Session Lookups (auth-owned tables, read-only here)
// ==============================================================================

/// Resolves a session token to its user. Expired sessions resolve to None,
/// same as an unknown token.
pub async fn find_session_user(
    pool: &PgPool,
    token: &str,
) -> Result<Option<SessionUser>, sqlx::Error> {
    sqlx::query_as::<_, SessionUser>(
        r#"
        SELECT u.id, u.email, u.name
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token = $1
          AND s.expires_at > NOW()
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await
}
