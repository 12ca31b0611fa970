//! Per-user watchlist.
// region:    --- Imports
use crate::accounts::get_user;
use crate::auction::model::{Listing, WatchlistEntry};
use crate::catalog::queries::get_listing;
use crate::error::{MarketError, RuleViolation};
use crate::store::MarketStore;
use tracing::{debug, info};
// endregion: --- Imports

/// Start watching a listing; a second add for the same pair is rejected
pub async fn add(
    store: &impl MarketStore,
    user_id: i64,
    listing_id: i64,
) -> Result<WatchlistEntry, MarketError> {
    get_user(store, user_id).await?;
    get_listing(store, listing_id).await?;

    let entry = store
        .insert_watch(user_id, listing_id)
        .await?
        .ok_or(RuleViolation::AlreadyWatching)?;
    info!(
        "{:<12} --> user {} watches listing {}",
        "Watchlist", user_id, listing_id
    );
    Ok(entry)
}

/// Stop watching a listing; removing an absent entry is a no-op
pub async fn remove(
    store: &impl MarketStore,
    user_id: i64,
    listing_id: i64,
) -> Result<(), MarketError> {
    get_user(store, user_id).await?;
    get_listing(store, listing_id).await?;

    let removed = store.delete_watch(user_id, listing_id).await?;
    debug!(
        "{:<12} --> user {} unwatch listing {} (removed: {})",
        "Watchlist", user_id, listing_id, removed
    );
    Ok(())
}

pub async fn list_for(store: &impl MarketStore, user_id: i64) -> Result<Vec<Listing>, MarketError> {
    get_user(store, user_id).await?;
    Ok(store.watched_listings(user_id).await?)
}

pub async fn is_watching(
    store: &impl MarketStore,
    user_id: i64,
    listing_id: i64,
) -> Result<bool, MarketError> {
    get_user(store, user_id).await?;
    get_listing(store, listing_id).await?;
    Ok(store.is_watching(user_id, listing_id).await?)
}
