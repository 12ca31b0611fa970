// region:    --- Imports
use super::{queries, BidWrite, MarketStore, NewBid, NewComment, NewListing, NewUser, StoreError};
use crate::auction::model::{Bid, ClosedMarker, Comment, Listing, User, WatchlistEntry};
use crate::auction::Amount;
use crate::database::DatabaseManager;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};
// endregion: --- Imports

// region:    --- Postgres Store
/// PostgreSQL-backed store
pub struct PgMarketStore {
    db: Arc<DatabaseManager>,
}

impl PgMarketStore {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MarketStore for PgMarketStore {
    async fn insert_user(&self, user: NewUser) -> Result<Option<User>, StoreError> {
        Ok(sqlx::query_as::<_, User>(queries::INSERT_USER)
            .bind(&user.username)
            .bind(&user.email)
            .fetch_optional(self.db.pool())
            .await?)
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        Ok(sqlx::query_as::<_, User>(queries::GET_USER)
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?)
    }

    async fn insert_listing(&self, listing: NewListing) -> Result<Listing, StoreError> {
        let listing = self
            .db
            .transaction(|tx| {
                Box::pin(async move {
                    sqlx::query_as::<_, Listing>(queries::INSERT_LISTING)
                        .bind(&listing.title)
                        .bind(&listing.description)
                        .bind(listing.start_bid)
                        .bind(&listing.image_url)
                        .bind(&listing.category)
                        .bind(listing.owner_id)
                        .fetch_one(&mut **tx)
                        .await
                })
            })
            .await?;
        Ok(listing)
    }

    async fn find_listing(&self, listing_id: i64) -> Result<Option<Listing>, StoreError> {
        Ok(sqlx::query_as::<_, Listing>(queries::GET_LISTING)
            .bind(listing_id)
            .fetch_optional(self.db.pool())
            .await?)
    }

    async fn listings(&self, category: Option<&str>) -> Result<Vec<Listing>, StoreError> {
        Ok(sqlx::query_as::<_, Listing>(queries::GET_LISTINGS)
            .bind(category)
            .fetch_all(self.db.pool())
            .await?)
    }

    async fn categories(&self) -> Result<Vec<String>, StoreError> {
        Ok(sqlx::query_scalar::<_, String>(queries::GET_CATEGORIES)
            .fetch_all(self.db.pool())
            .await?)
    }

    async fn bids_for(&self, listing_id: i64) -> Result<Vec<Bid>, StoreError> {
        Ok(sqlx::query_as::<_, Bid>(queries::GET_BIDS)
            .bind(listing_id)
            .fetch_all(self.db.pool())
            .await?)
    }

    async fn highest_bid(&self, listing_id: i64) -> Result<Option<Bid>, StoreError> {
        Ok(sqlx::query_as::<_, Bid>(queries::GET_HIGHEST_BID)
            .bind(listing_id)
            .fetch_optional(self.db.pool())
            .await?)
    }

    async fn has_bid(
        &self,
        listing_id: i64,
        user_id: i64,
        amount: Amount,
    ) -> Result<bool, StoreError> {
        Ok(sqlx::query_scalar::<_, bool>(queries::HAS_BID)
            .bind(listing_id)
            .bind(user_id)
            .bind(amount)
            .fetch_one(self.db.pool())
            .await?)
    }

    async fn commit_bid(&self, bid: NewBid) -> Result<BidWrite, StoreError> {
        let mut tx = self.db.pool().begin().await?;

        // The row lock serializes competing bids and closes on this listing.
        let current_price = sqlx::query_scalar::<_, Amount>(queries::LOCK_LISTING_PRICE)
            .bind(bid.listing_id)
            .fetch_one(&mut *tx)
            .await?;

        let closed = sqlx::query_scalar::<_, bool>(queries::IS_CLOSED)
            .bind(bid.listing_id)
            .fetch_one(&mut *tx)
            .await?;
        if closed {
            tx.rollback().await?;
            info!(
                "{:<12} --> bid rejected, listing {} closed meanwhile",
                "Store", bid.listing_id
            );
            return Ok(BidWrite::Closed);
        }

        if bid.amount <= current_price {
            tx.rollback().await?;
            info!(
                "{:<12} --> bid rejected, current price {} already reached",
                "Store", current_price
            );
            return Ok(BidWrite::Outbid { current_price });
        }

        let placed = sqlx::query_as::<_, Bid>(queries::INSERT_BID)
            .bind(bid.listing_id)
            .bind(bid.user_id)
            .bind(bid.amount)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(queries::UPDATE_CURRENT_PRICE)
            .bind(bid.amount)
            .bind(bid.listing_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!(
            "{:<12} --> bid {} committed, current price {}",
            "Store", placed.id, placed.amount
        );
        Ok(BidWrite::Placed(placed))
    }

    async fn close_listing(
        &self,
        listing_id: i64,
        closed_by: i64,
    ) -> Result<Option<ClosedMarker>, StoreError> {
        let mut tx = self.db.pool().begin().await?;

        sqlx::query(queries::LOCK_LISTING)
            .bind(listing_id)
            .execute(&mut *tx)
            .await?;

        let marker = sqlx::query_as::<_, ClosedMarker>(queries::INSERT_CLOSED)
            .bind(listing_id)
            .bind(closed_by)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(marker)
    }

    async fn closed_marker(&self, listing_id: i64) -> Result<Option<ClosedMarker>, StoreError> {
        Ok(sqlx::query_as::<_, ClosedMarker>(queries::GET_CLOSED)
            .bind(listing_id)
            .fetch_optional(self.db.pool())
            .await?)
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<Comment, StoreError> {
        let comment = self
            .db
            .transaction(|tx| {
                Box::pin(async move {
                    sqlx::query_as::<_, Comment>(queries::INSERT_COMMENT)
                        .bind(comment.listing_id)
                        .bind(comment.user_id)
                        .bind(&comment.text)
                        .fetch_one(&mut **tx)
                        .await
                })
            })
            .await?;
        Ok(comment)
    }

    async fn comments_for(&self, listing_id: i64) -> Result<Vec<Comment>, StoreError> {
        Ok(sqlx::query_as::<_, Comment>(queries::GET_COMMENTS)
            .bind(listing_id)
            .fetch_all(self.db.pool())
            .await?)
    }

    async fn insert_watch(
        &self,
        user_id: i64,
        listing_id: i64,
    ) -> Result<Option<WatchlistEntry>, StoreError> {
        Ok(sqlx::query_as::<_, WatchlistEntry>(queries::INSERT_WATCH)
            .bind(user_id)
            .bind(listing_id)
            .fetch_optional(self.db.pool())
            .await?)
    }

    async fn delete_watch(&self, user_id: i64, listing_id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query(queries::DELETE_WATCH)
            .bind(user_id)
            .bind(listing_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn is_watching(&self, user_id: i64, listing_id: i64) -> Result<bool, StoreError> {
        Ok(sqlx::query_scalar::<_, bool>(queries::IS_WATCHING)
            .bind(user_id)
            .bind(listing_id)
            .fetch_one(self.db.pool())
            .await?)
    }

    async fn watched_listings(&self, user_id: i64) -> Result<Vec<Listing>, StoreError> {
        Ok(sqlx::query_as::<_, Listing>(queries::GET_WATCHED_LISTINGS)
            .bind(user_id)
            .fetch_all(self.db.pool())
            .await?)
    }
}
// endregion: --- Postgres Store
