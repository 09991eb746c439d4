pub mod session_queries;
pub mod user_queries;
pub mod watchlist_queries;
