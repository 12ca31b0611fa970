pub mod accounts;
pub mod auction;
pub mod bidding;
pub mod catalog;
pub mod comments;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod store;
pub mod watchlist;

#[cfg(test)]
pub(crate) mod test_support;
