//! Data access for the market.
//!
//! The workflow code only sees [`MarketStore`]. Writes that must be
//! re-validated under concurrency (`commit_bid`, `close_listing`) do their
//! own checks inside a single store transaction and report the outcome
//! instead of failing.
// region:    --- Imports
use crate::auction::model::{Bid, ClosedMarker, Comment, Listing, User, WatchlistEntry};
use crate::auction::Amount;
use async_trait::async_trait;
use thiserror::Error;

mod in_memory;
mod postgres;
pub(crate) mod queries;

pub use in_memory::InMemoryMarketStore;
pub use postgres::PgMarketStore;
// endregion: --- Imports

// region:    --- Records
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{entity} {id} does not exist")]
    Missing { entity: &'static str, id: i64 },
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct NewListing {
    pub owner_id: i64,
    pub title: String,
    pub description: String,
    pub start_bid: Amount,
    pub image_url: String,
    pub category: String,
}

#[derive(Debug, Clone)]
pub struct NewBid {
    pub listing_id: i64,
    pub user_id: i64,
    pub amount: Amount,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub listing_id: i64,
    pub user_id: i64,
    pub text: String,
}

/// Outcome of writing a bid after re-checking it against committed state.
#[derive(Debug, Clone, PartialEq)]
pub enum BidWrite {
    Placed(Bid),
    /// Another bid reached `current_price` first.
    Outbid { current_price: Amount },
    Closed,
}
// endregion: --- Records

// region:    --- Store Trait
#[async_trait]
pub trait MarketStore: Send + Sync {
    /// Returns `None` when the username is taken.
    async fn insert_user(&self, user: NewUser) -> Result<Option<User>, StoreError>;
    async fn find_user(&self, user_id: i64) -> Result<Option<User>, StoreError>;

    /// Stores the listing with `current_price` equal to its starting bid.
    async fn insert_listing(&self, listing: NewListing) -> Result<Listing, StoreError>;
    async fn find_listing(&self, listing_id: i64) -> Result<Option<Listing>, StoreError>;
    /// Newest first, optionally restricted to one category.
    async fn listings(&self, category: Option<&str>) -> Result<Vec<Listing>, StoreError>;
    /// Distinct categories in ascending order.
    async fn categories(&self) -> Result<Vec<String>, StoreError>;

    /// Highest bid first.
    async fn bids_for(&self, listing_id: i64) -> Result<Vec<Bid>, StoreError>;
    async fn highest_bid(&self, listing_id: i64) -> Result<Option<Bid>, StoreError>;
    async fn has_bid(
        &self,
        listing_id: i64,
        user_id: i64,
        amount: Amount,
    ) -> Result<bool, StoreError>;
    /// Atomically inserts the bid and raises `current_price` to its amount,
    /// provided the listing is still open and the amount still beats the
    /// current price.
    async fn commit_bid(&self, bid: NewBid) -> Result<BidWrite, StoreError>;

    /// Returns `None` when the listing was already closed.
    async fn close_listing(
        &self,
        listing_id: i64,
        closed_by: i64,
    ) -> Result<Option<ClosedMarker>, StoreError>;
    async fn closed_marker(&self, listing_id: i64) -> Result<Option<ClosedMarker>, StoreError>;

    async fn insert_comment(&self, comment: NewComment) -> Result<Comment, StoreError>;
    /// Oldest first.
    async fn comments_for(&self, listing_id: i64) -> Result<Vec<Comment>, StoreError>;

    /// Returns `None` when the entry already exists.
    async fn insert_watch(
        &self,
        user_id: i64,
        listing_id: i64,
    ) -> Result<Option<WatchlistEntry>, StoreError>;
    /// Returns whether an entry was removed.
    async fn delete_watch(&self, user_id: i64, listing_id: i64) -> Result<bool, StoreError>;
    async fn is_watching(&self, user_id: i64, listing_id: i64) -> Result<bool, StoreError>;
    /// Most recently watched first.
    async fn watched_listings(&self, user_id: i64) -> Result<Vec<Listing>, StoreError>;
}
// endregion: --- Store Trait
