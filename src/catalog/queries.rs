// region:    --- Imports
use crate::auction::model::{AuctionOutcome, AuctionStatus, HighestBid, Listing, ListingDetail};
use crate::error::MarketError;
use crate::store::MarketStore;
use tracing::info;
// endregion: --- Imports

// region:    --- Query Handlers

pub async fn get_listing(
    store: &impl MarketStore,
    listing_id: i64,
) -> Result<Listing, MarketError> {
    store
        .find_listing(listing_id)
        .await?
        .ok_or(MarketError::ListingNotFound(listing_id))
}

/// All listings, newest first
pub async fn list_listings(store: &impl MarketStore) -> Result<Vec<Listing>, MarketError> {
    info!("{:<12} --> all listings", "Query");
    Ok(store.listings(None).await?)
}

pub async fn list_by_category(
    store: &impl MarketStore,
    category: &str,
) -> Result<Vec<Listing>, MarketError> {
    info!("{:<12} --> listings in category {:?}", "Query", category);
    Ok(store.listings(Some(category.trim())).await?)
}

pub async fn list_all_categories(store: &impl MarketStore) -> Result<Vec<String>, MarketError> {
    info!("{:<12} --> categories", "Query");
    Ok(store.categories().await?)
}

/// Listing page view: leader, status, outcome, comments and whether
/// `viewer` watches the listing
pub async fn listing_detail(
    store: &impl MarketStore,
    listing_id: i64,
    viewer: Option<i64>,
) -> Result<ListingDetail, MarketError> {
    info!(
        "{:<12} --> listing detail id: {} viewer: {:?}",
        "Query", listing_id, viewer
    );
    let listing = get_listing(store, listing_id).await?;

    let highest_bid = store
        .highest_bid(listing.id)
        .await?
        .map(|bid| HighestBid::from_bid(&bid))
        .unwrap_or_else(|| HighestBid::placeholder(&listing));

    let marker = store.closed_marker(listing.id).await?;
    let status = match marker {
        Some(_) => AuctionStatus::Closed,
        None => AuctionStatus::Open,
    };
    let outcome = marker.map(|m| AuctionOutcome::new(&m, &highest_bid));

    let comments = store.comments_for(listing.id).await?;
    let watching = match viewer {
        Some(user_id) => store.is_watching(user_id, listing.id).await?,
        None => false,
    };

    Ok(ListingDetail {
        listing,
        status,
        highest_bid,
        outcome,
        comments,
        watching,
    })
}

// endregion: --- Query Handlers
