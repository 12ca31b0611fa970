// region:    --- Imports
use crate::auction::model::{AuctionOutcome, Bid, HighestBid};
use crate::catalog::queries::get_listing;
use crate::error::MarketError;
use crate::store::MarketStore;
use tracing::info;
// endregion: --- Imports

// region:    --- Query Handlers

/// Highest bid, or a placeholder led by the owner at the current price
pub async fn highest_bid(
    store: &impl MarketStore,
    listing_id: i64,
) -> Result<HighestBid, MarketError> {
    info!("{:<12} --> highest bid for listing {}", "Query", listing_id);
    let listing = get_listing(store, listing_id).await?;
    Ok(store
        .highest_bid(listing.id)
        .await?
        .map(|bid| HighestBid::from_bid(&bid))
        .unwrap_or_else(|| HighestBid::placeholder(&listing)))
}

/// Bid history, highest first
pub async fn bid_history(
    store: &impl MarketStore,
    listing_id: i64,
) -> Result<Vec<Bid>, MarketError> {
    info!("{:<12} --> bid history for listing {}", "Query", listing_id);
    let listing = get_listing(store, listing_id).await?;
    Ok(store.bids_for(listing.id).await?)
}

/// Winner and final price; `None` while the auction is open
pub async fn auction_outcome(
    store: &impl MarketStore,
    listing_id: i64,
) -> Result<Option<AuctionOutcome>, MarketError> {
    info!("{:<12} --> outcome for listing {}", "Query", listing_id);
    get_listing(store, listing_id).await?;
    let Some(marker) = store.closed_marker(listing_id).await? else {
        return Ok(None);
    };
    let leader = highest_bid(store, listing_id).await?;
    Ok(Some(AuctionOutcome::new(&marker, &leader)))
}

// endregion: --- Query Handlers
