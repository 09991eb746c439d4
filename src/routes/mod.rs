pub(crate) mod analysis;
pub(crate) mod health;
pub(crate) mod insights;
pub(crate) mod portfolio;
pub(crate) mod watchlist;
