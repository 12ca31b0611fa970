use super::{BidWrite, MarketStore, NewBid, NewComment, NewListing, NewUser, StoreError};
use crate::auction::model::{Bid, ClosedMarker, Comment, Listing, User, WatchlistEntry};
use crate::auction::Amount;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::Mutex;

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    listings: BTreeMap<i64, Listing>,
    bids: Vec<Bid>,
    closed: BTreeMap<i64, ClosedMarker>,
    comments: Vec<Comment>,
    watchlist: Vec<WatchlistEntry>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Store kept entirely in process memory.
///
/// Every call holds one lock for its whole duration, which gives each
/// operation the same all-or-nothing behaviour as a database transaction.
/// Used by unit tests and by `STORE=memory` local runs.
#[derive(Default)]
pub struct InMemoryMarketStore {
    tables: Mutex<Tables>,
}

impl InMemoryMarketStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MarketStore for InMemoryMarketStore {
    async fn insert_user(&self, user: NewUser) -> Result<Option<User>, StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Ok(None);
        }
        let id = tables.next_id();
        let user = User {
            id,
            username: user.username,
            email: user.email,
            created_at: Utc::now(),
        };
        tables.users.insert(id, user.clone());
        Ok(Some(user))
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.tables.lock().await.users.get(&user_id).cloned())
    }

    async fn insert_listing(&self, listing: NewListing) -> Result<Listing, StoreError> {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        let listing = Listing {
            id,
            title: listing.title,
            description: listing.description,
            start_bid: listing.start_bid,
            current_price: listing.start_bid,
            image_url: listing.image_url,
            category: listing.category,
            owner_id: listing.owner_id,
            created_at: Utc::now(),
        };
        tables.listings.insert(id, listing.clone());
        Ok(listing)
    }

    async fn find_listing(&self, listing_id: i64) -> Result<Option<Listing>, StoreError> {
        Ok(self.tables.lock().await.listings.get(&listing_id).cloned())
    }

    async fn listings(&self, category: Option<&str>) -> Result<Vec<Listing>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .listings
            .values()
            .rev()
            .filter(|l| category.map_or(true, |c| l.category == c))
            .cloned()
            .collect())
    }

    async fn categories(&self) -> Result<Vec<String>, StoreError> {
        let tables = self.tables.lock().await;
        let categories: BTreeSet<String> = tables
            .listings
            .values()
            .map(|l| l.category.clone())
            .collect();
        Ok(categories.into_iter().collect())
    }

    async fn bids_for(&self, listing_id: i64) -> Result<Vec<Bid>, StoreError> {
        let tables = self.tables.lock().await;
        let mut bids: Vec<Bid> = tables
            .bids
            .iter()
            .filter(|b| b.listing_id == listing_id)
            .cloned()
            .collect();
        bids.sort_by(|a, b| b.amount.cmp(&a.amount).then(b.id.cmp(&a.id)));
        Ok(bids)
    }

    async fn highest_bid(&self, listing_id: i64) -> Result<Option<Bid>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .bids
            .iter()
            .filter(|b| b.listing_id == listing_id)
            .max_by(|a, b| a.amount.cmp(&b.amount).then(a.id.cmp(&b.id)))
            .cloned())
    }

    async fn has_bid(
        &self,
        listing_id: i64,
        user_id: i64,
        amount: Amount,
    ) -> Result<bool, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .bids
            .iter()
            .any(|b| b.listing_id == listing_id && b.user_id == user_id && b.amount == amount))
    }

    async fn commit_bid(&self, bid: NewBid) -> Result<BidWrite, StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.closed.contains_key(&bid.listing_id) {
            return Ok(BidWrite::Closed);
        }
        let Some(current_price) = tables.listings.get(&bid.listing_id).map(|l| l.current_price)
        else {
            return Err(StoreError::Missing {
                entity: "listing",
                id: bid.listing_id,
            });
        };
        if bid.amount <= current_price {
            return Ok(BidWrite::Outbid { current_price });
        }

        let id = tables.next_id();
        let placed = Bid {
            id,
            listing_id: bid.listing_id,
            user_id: bid.user_id,
            amount: bid.amount,
            created_at: Utc::now(),
        };
        tables.bids.push(placed.clone());
        if let Some(listing) = tables.listings.get_mut(&bid.listing_id) {
            listing.current_price = bid.amount;
        }
        Ok(BidWrite::Placed(placed))
    }

    async fn close_listing(
        &self,
        listing_id: i64,
        closed_by: i64,
    ) -> Result<Option<ClosedMarker>, StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.closed.contains_key(&listing_id) {
            return Ok(None);
        }
        let marker = ClosedMarker {
            listing_id,
            closed_by,
            closed_at: Utc::now(),
        };
        tables.closed.insert(listing_id, marker.clone());
        Ok(Some(marker))
    }

    async fn closed_marker(&self, listing_id: i64) -> Result<Option<ClosedMarker>, StoreError> {
        Ok(self.tables.lock().await.closed.get(&listing_id).cloned())
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<Comment, StoreError> {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        let comment = Comment {
            id,
            listing_id: comment.listing_id,
            user_id: comment.user_id,
            text: comment.text,
            created_at: Utc::now(),
        };
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn comments_for(&self, listing_id: i64) -> Result<Vec<Comment>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .comments
            .iter()
            .filter(|c| c.listing_id == listing_id)
            .cloned()
            .collect())
    }

    async fn insert_watch(
        &self,
        user_id: i64,
        listing_id: i64,
    ) -> Result<Option<WatchlistEntry>, StoreError> {
        let mut tables = self.tables.lock().await;
        if tables
            .watchlist
            .iter()
            .any(|w| w.user_id == user_id && w.listing_id == listing_id)
        {
            return Ok(None);
        }
        let id = tables.next_id();
        let entry = WatchlistEntry {
            id,
            user_id,
            listing_id,
            created_at: Utc::now(),
        };
        tables.watchlist.push(entry.clone());
        Ok(Some(entry))
    }

    async fn delete_watch(&self, user_id: i64, listing_id: i64) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().await;
        let before = tables.watchlist.len();
        tables
            .watchlist
            .retain(|w| !(w.user_id == user_id && w.listing_id == listing_id));
        Ok(tables.watchlist.len() != before)
    }

    async fn is_watching(&self, user_id: i64, listing_id: i64) -> Result<bool, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .watchlist
            .iter()
            .any(|w| w.user_id == user_id && w.listing_id == listing_id))
    }

    async fn watched_listings(&self, user_id: i64) -> Result<Vec<Listing>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .watchlist
            .iter()
            .rev()
            .filter(|w| w.user_id == user_id)
            .filter_map(|w| tables.listings.get(&w.listing_id).cloned())
            .collect())
    }
}
