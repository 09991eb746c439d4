use serde::Serialize;
use sqlx::FromRow;

/// The slice of the auth subsystem's user record this service reads.
/// Rows live in auth-owned tables; this service never writes them.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub name: String,
}
