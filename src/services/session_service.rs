use axum::http::{header, HeaderMap};
use sqlx::PgPool;
use tracing::error;

use crate::db::session_queries;
use crate::errors::AppError;
use crate::models::SessionUser;

const SESSION_COOKIE: &str = "session_token";

/// Resolves the caller's session. Three outcomes: Ok(Some) authenticated,
/// Ok(None) anonymous or expired, Err(ServiceUnavailable) auth backend
/// unreachable. Routes map the last two to 401 and 503.
pub async fn resolve_session(
    pool: &PgPool,
    headers: &HeaderMap,
) -> Result<Option<SessionUser>, AppError> {
    let Some(token) = extract_token(headers) else {
        return Ok(None);
    };

    match session_queries::find_session_user(pool, &token).await {
        Ok(user) => Ok(user),
        Err(e) => {
            error!("Session lookup failed: {}", e);
            Err(AppError::ServiceUnavailable(format!("auth backend unavailable: {e}")))
        }
    }
}

/// Like resolve_session but anonymous callers become 401.
pub async fn require_user(pool: &PgPool, headers: &HeaderMap) -> Result<SessionUser, AppError> {
    resolve_session(pool, headers).await?.ok_or(AppError::Unauthorized)
}

/// Session token from the cookie, with Authorization: Bearer as a fallback
/// for non-browser clients.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(cookies) = headers.get(header::COOKIE).and_then(|v| v.to_str().ok()) {
        for pair in cookies.split(';') {
            let pair = pair.trim();
            if let Some(rest) = pair.strip_prefix(SESSION_COOKIE) {
                if let Some(value) = rest.strip_prefix('=') {
                    if !value.is_empty() {
                        return Some(value.to_string());
                    }
                }
            }
        }
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session_token=tok123; lang=en"),
        );

        assert_eq!(extract_token(&headers), Some("tok123".to_string()));
    }

    #[test]
    fn test_extract_token_from_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def"),
        );

        assert_eq!(extract_token(&headers), Some("abc.def".to_string()));
    }

    #[test]
    fn test_cookie_takes_precedence_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("session_token=from-cookie"),
        );
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-bearer"),
        );

        assert_eq!(extract_token(&headers), Some("from-cookie".to_string()));
    }

    #[test]
    fn test_empty_cookie_value_falls_back_to_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("session_token="));
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer tok456"),
        );

        assert_eq!(extract_token(&headers), Some("tok456".to_string()));
    }

    #[test]
    fn test_unrelated_cookie_names_do_not_match() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("other_session_token=x; session_token_v2=y"),
        );

        assert_eq!(extract_token(&headers), None);
    }

    #[test]
    fn test_no_headers_means_anonymous() {
        assert_eq!(extract_token(&HeaderMap::new()), None);
    }
}
