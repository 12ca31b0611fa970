use super::Amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// User model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

// Listing model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Listing {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub start_bid: Amount,
    pub current_price: Amount,
    pub image_url: String,
    pub category: String,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
}

// Bid model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bid {
    pub id: i64,
    pub listing_id: i64,
    pub user_id: i64,
    pub amount: Amount,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub listing_id: i64,
    pub user_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct WatchlistEntry {
    pub id: i64,
    pub user_id: i64,
    pub listing_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Presence of this record means the listing's auction has ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ClosedMarker {
    pub listing_id: i64,
    pub closed_by: i64,
    pub closed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuctionStatus {
    Open,
    Closed,
}

/// Current leader of a listing.
///
/// When nobody has bid yet this is a placeholder carrying the listing's
/// current price and its owner, with `bid_id` unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighestBid {
    pub listing_id: i64,
    pub user_id: i64,
    pub amount: Amount,
    pub bid_id: Option<i64>,
    pub placeholder: bool,
}

impl HighestBid {
    pub fn from_bid(bid: &Bid) -> Self {
        Self {
            listing_id: bid.listing_id,
            user_id: bid.user_id,
            amount: bid.amount,
            bid_id: Some(bid.id),
            placeholder: false,
        }
    }

    pub fn placeholder(listing: &Listing) -> Self {
        Self {
            listing_id: listing.id,
            user_id: listing.owner_id,
            amount: listing.current_price,
            bid_id: None,
            placeholder: true,
        }
    }
}

/// Result of a closed auction.
///
/// `sold` is false when the auction closed without any real bid; the owner is
/// then reported as `winner_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuctionOutcome {
    pub listing_id: i64,
    pub winner_id: i64,
    pub final_price: Amount,
    pub closed_by: i64,
    pub closed_at: DateTime<Utc>,
    pub sold: bool,
}

impl AuctionOutcome {
    pub fn new(marker: &ClosedMarker, leader: &HighestBid) -> Self {
        Self {
            listing_id: marker.listing_id,
            winner_id: leader.user_id,
            final_price: leader.amount,
            closed_by: marker.closed_by,
            closed_at: marker.closed_at,
            sold: !leader.placeholder,
        }
    }
}

/// Everything the listing page shows in one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingDetail {
    pub listing: Listing,
    pub status: AuctionStatus,
    pub highest_bid: HighestBid,
    pub outcome: Option<AuctionOutcome>,
    pub comments: Vec<Comment>,
    pub watching: bool,
}
