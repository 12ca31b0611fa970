/// Auction workflow commands
/// 1. Place a bid
/// 2. Close an auction
// region:    --- Imports
use crate::accounts;
use crate::auction::model::{AuctionOutcome, Bid, HighestBid};
use crate::auction::{Amount, AmountError};
use crate::catalog::queries::get_listing;
use crate::error::{MarketError, RuleViolation, ValidationError};
use crate::store::{BidWrite, MarketStore, NewBid};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
// endregion: --- Imports

// region:    --- Commands
/// Bid command; `amount` is the raw text the user typed
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaceBidCommand {
    pub listing_id: i64,
    pub user_id: i64,
    pub amount: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CloseAuctionCommand {
    pub listing_id: i64,
    pub user_id: i64,
}

fn parse_bid_amount(raw: &str) -> Result<Amount, ValidationError> {
    Amount::parse(raw).map_err(|e| match e {
        AmountError::Blank | AmountError::NotPositive => ValidationError::MissingBid,
        AmountError::Malformed | AmountError::TooPrecise | AmountError::TooLarge => {
            ValidationError::InvalidBid
        }
    })
}

/// 1. Place a bid
///
/// Checks run in this order: amount format, auction open, above the starting
/// bid, not a repeat of this user's own amount, above the highest bid. The
/// store re-checks openness and price when writing.
pub async fn place_bid(store: &impl MarketStore, cmd: PlaceBidCommand) -> Result<Bid, MarketError> {
    info!("{:<12} --> place bid: {:?}", "Command", cmd);

    let amount = parse_bid_amount(&cmd.amount)?;
    let listing = get_listing(store, cmd.listing_id).await?;
    accounts::get_user(store, cmd.user_id).await?;

    if store.closed_marker(listing.id).await?.is_some() {
        return Err(RuleViolation::AuctionClosed.into());
    }

    if amount <= listing.start_bid {
        return Err(RuleViolation::BelowMinimum {
            start_bid: listing.start_bid,
        }
        .into());
    }

    if store.has_bid(listing.id, cmd.user_id, amount).await? {
        return Err(RuleViolation::DuplicateBid.into());
    }

    if let Some(highest) = store.highest_bid(listing.id).await? {
        if amount <= highest.amount {
            return Err(RuleViolation::NotAboveHighest {
                current_price: highest.amount,
            }
            .into());
        }
    }

    match store
        .commit_bid(NewBid {
            listing_id: listing.id,
            user_id: cmd.user_id,
            amount,
        })
        .await?
    {
        BidWrite::Placed(bid) => {
            info!(
                "{:<12} --> bid {} accepted, current price {}",
                "Command", bid.id, bid.amount
            );
            Ok(bid)
        }
        BidWrite::Outbid { current_price } => {
            warn!(
                "{:<12} --> concurrent bid won, current price {}",
                "Command", current_price
            );
            Err(RuleViolation::NotAboveHighest { current_price }.into())
        }
        BidWrite::Closed => Err(RuleViolation::AuctionClosed.into()),
    }
}

/// 2. Close an auction
///
/// Only the owner may close, and only once. The winner is read after the
/// closed marker is written, so no later bid can change it.
pub async fn close_auction(
    store: &impl MarketStore,
    cmd: CloseAuctionCommand,
) -> Result<AuctionOutcome, MarketError> {
    info!("{:<12} --> close auction: {:?}", "Command", cmd);

    let listing = get_listing(store, cmd.listing_id).await?;
    if listing.owner_id != cmd.user_id {
        warn!(
            "{:<12} --> user {} is not the owner of listing {}",
            "Command", cmd.user_id, listing.id
        );
        return Err(MarketError::NotOwner);
    }

    let Some(marker) = store.close_listing(listing.id, cmd.user_id).await? else {
        return Err(RuleViolation::AlreadyClosed.into());
    };

    let leader = store
        .highest_bid(listing.id)
        .await?
        .map(|bid| HighestBid::from_bid(&bid))
        .unwrap_or_else(|| HighestBid::placeholder(&listing));

    let outcome = AuctionOutcome::new(&marker, &leader);
    info!(
        "{:<12} --> listing {} closed, winner {} at {}",
        "Command", outcome.listing_id, outcome.winner_id, outcome.final_price
    );
    Ok(outcome)
}
// endregion: --- Commands

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bidding::queries::highest_bid;
    use crate::store::InMemoryMarketStore;
    use crate::test_support::{amount, seed_listing, seed_user};

    fn bid(listing_id: i64, user_id: i64, amount: &str) -> PlaceBidCommand {
        PlaceBidCommand {
            listing_id,
            user_id,
            amount: amount.to_string(),
        }
    }

    fn close(listing_id: i64, user_id: i64) -> CloseAuctionCommand {
        CloseAuctionCommand {
            listing_id,
            user_id,
        }
    }

    async fn current_price(store: &InMemoryMarketStore, listing_id: i64) -> Amount {
        get_listing(store, listing_id).await.unwrap().current_price
    }

    #[tokio::test]
    async fn full_auction_scenario() {
        let store = InMemoryMarketStore::new();
        let owner = seed_user(&store, "owner").await;
        let alice = seed_user(&store, "alice").await;
        let bob = seed_user(&store, "bob").await;
        let listing = seed_listing(&store, &owner, "10.00", "Cameras").await;

        let err = place_bid(&store, bid(listing.id, alice.id, "5.00")).await.unwrap_err();
        assert!(matches!(
            err,
            MarketError::Rule(RuleViolation::BelowMinimum { .. })
        ));

        let err = place_bid(&store, bid(listing.id, alice.id, "10.00")).await.unwrap_err();
        assert!(matches!(
            err,
            MarketError::Rule(RuleViolation::BelowMinimum { .. })
        ));
        assert_eq!(current_price(&store, listing.id).await, amount("10.00"));

        place_bid(&store, bid(listing.id, alice.id, "15.00")).await.unwrap();
        assert_eq!(current_price(&store, listing.id).await, amount("15.00"));

        let err = place_bid(&store, bid(listing.id, bob.id, "15.00")).await.unwrap_err();
        assert!(matches!(
            err,
            MarketError::Rule(RuleViolation::NotAboveHighest { .. })
        ));

        place_bid(&store, bid(listing.id, bob.id, "20.00")).await.unwrap();
        assert_eq!(current_price(&store, listing.id).await, amount("20.00"));

        let outcome = close_auction(&store, close(listing.id, owner.id)).await.unwrap();
        assert_eq!(outcome.winner_id, bob.id);
        assert_eq!(outcome.final_price, amount("20.00"));
        assert!(outcome.sold);
    }

    #[tokio::test]
    async fn repeating_own_amount_is_a_duplicate() {
        let store = InMemoryMarketStore::new();
        let owner = seed_user(&store, "owner").await;
        let alice = seed_user(&store, "alice").await;
        let listing = seed_listing(&store, &owner, "1.00", "Books").await;

        place_bid(&store, bid(listing.id, alice.id, "3.00")).await.unwrap();
        let err = place_bid(&store, bid(listing.id, alice.id, "3")).await.unwrap_err();
        assert!(matches!(err, MarketError::Rule(RuleViolation::DuplicateBid)));
        assert_eq!(store.bids_for(listing.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn malformed_amounts_are_rejected_without_mutation() {
        let store = InMemoryMarketStore::new();
        let owner = seed_user(&store, "owner").await;
        let alice = seed_user(&store, "alice").await;
        let listing = seed_listing(&store, &owner, "1.00", "Books").await;

        for (raw, expected) in [
            ("", ValidationError::MissingBid),
            ("0", ValidationError::MissingBid),
            ("abc", ValidationError::InvalidBid),
            ("2.005", ValidationError::InvalidBid),
        ] {
            let err = place_bid(&store, bid(listing.id, alice.id, raw)).await.unwrap_err();
            match err {
                MarketError::Validation(found) => assert_eq!(found, expected, "input {raw:?}"),
                other => panic!("unexpected error for {raw:?}: {other:?}"),
            }
        }
        assert!(store.bids_for(listing.id).await.unwrap().is_empty());
        assert_eq!(current_price(&store, listing.id).await, amount("1.00"));
    }

    #[tokio::test]
    async fn unknown_listing_and_user_are_not_found() {
        let store = InMemoryMarketStore::new();
        let owner = seed_user(&store, "owner").await;
        let listing = seed_listing(&store, &owner, "1.00", "Books").await;

        let err = place_bid(&store, bid(999, owner.id, "5")).await.unwrap_err();
        assert!(matches!(err, MarketError::ListingNotFound(999)));

        let err = place_bid(&store, bid(listing.id, 999, "5")).await.unwrap_err();
        assert!(matches!(err, MarketError::UserNotFound(999)));
    }

    #[tokio::test]
    async fn only_owner_can_close() {
        let store = InMemoryMarketStore::new();
        let owner = seed_user(&store, "owner").await;
        let alice = seed_user(&store, "alice").await;
        let listing = seed_listing(&store, &owner, "1.00", "Books").await;

        let err = close_auction(&store, close(listing.id, alice.id)).await.unwrap_err();
        assert!(matches!(err, MarketError::NotOwner));
        assert!(store.closed_marker(listing.id).await.unwrap().is_none());

        // still open, so bidding continues
        place_bid(&store, bid(listing.id, alice.id, "2.00")).await.unwrap();
    }

    #[tokio::test]
    async fn second_close_is_rejected() {
        let store = InMemoryMarketStore::new();
        let owner = seed_user(&store, "owner").await;
        let alice = seed_user(&store, "alice").await;
        let listing = seed_listing(&store, &owner, "1.00", "Books").await;
        place_bid(&store, bid(listing.id, alice.id, "4.00")).await.unwrap();

        let first = close_auction(&store, close(listing.id, owner.id)).await.unwrap();
        let err = close_auction(&store, close(listing.id, owner.id)).await.unwrap_err();
        assert!(matches!(err, MarketError::Rule(RuleViolation::AlreadyClosed)));
        assert_eq!(err.to_string(), "already closed");

        let marker = store.closed_marker(listing.id).await.unwrap().unwrap();
        assert_eq!(marker.closed_at, first.closed_at);
    }

    #[tokio::test]
    async fn closed_auction_refuses_bids() {
        let store = InMemoryMarketStore::new();
        let owner = seed_user(&store, "owner").await;
        let alice = seed_user(&store, "alice").await;
        let listing = seed_listing(&store, &owner, "1.00", "Books").await;
        close_auction(&store, close(listing.id, owner.id)).await.unwrap();

        let err = place_bid(&store, bid(listing.id, alice.id, "50.00")).await.unwrap_err();
        assert!(matches!(err, MarketError::Rule(RuleViolation::AuctionClosed)));
        assert_eq!(current_price(&store, listing.id).await, amount("1.00"));
    }

    #[tokio::test]
    async fn closing_without_bids_reports_owner_as_unsold_winner() {
        let store = InMemoryMarketStore::new();
        let owner = seed_user(&store, "owner").await;
        let listing = seed_listing(&store, &owner, "7.50", "Books").await;

        let outcome = close_auction(&store, close(listing.id, owner.id)).await.unwrap();
        assert_eq!(outcome.winner_id, owner.id);
        assert_eq!(outcome.final_price, amount("7.50"));
        assert!(!outcome.sold);
    }

    #[tokio::test]
    async fn price_never_drops_below_start_bid_or_decreases() {
        let store = InMemoryMarketStore::new();
        let owner = seed_user(&store, "owner").await;
        let alice = seed_user(&store, "alice").await;
        let bob = seed_user(&store, "bob").await;
        let listing = seed_listing(&store, &owner, "2.00", "Books").await;

        let mut last = current_price(&store, listing.id).await;
        for (user, raw) in [
            (alice.id, "3"),
            (bob.id, "2.50"),
            (bob.id, "3.01"),
            (alice.id, "3.01"),
            (alice.id, "1"),
            (alice.id, "9.99"),
        ] {
            let _ = place_bid(&store, bid(listing.id, user, raw)).await;
            let now = current_price(&store, listing.id).await;
            assert!(now >= last);
            assert!(now >= listing.start_bid);
            assert_eq!(now, highest_bid(&store, listing.id).await.unwrap().amount);
            last = now;
        }
        assert_eq!(last, amount("9.99"));
    }
}
