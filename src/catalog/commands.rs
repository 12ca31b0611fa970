// region:    --- Imports
use crate::accounts;
use crate::auction::model::Listing;
use crate::auction::{Amount, AmountError};
use crate::error::{ensure_max_len, MarketError, ValidationError};
use crate::store::{MarketStore, NewListing};
use serde::{Deserialize, Serialize};
use tracing::info;
// endregion: --- Imports

pub const TITLE_MAX_LEN: usize = 50;
pub const DESCRIPTION_MAX_LEN: usize = 500;
pub const IMAGE_URL_MAX_LEN: usize = 500;
pub const CATEGORY_MAX_LEN: usize = 64;

// region:    --- Commands
/// New listing as submitted; a blank `start_bid` means the minimum bid
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateListingCommand {
    pub owner_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "crate::auction::amount::text_or_number")]
    pub start_bid: String,
    #[serde(default)]
    pub image_url: String,
    pub category: String,
}

fn parse_start_bid(raw: &str) -> Result<Amount, ValidationError> {
    if raw.trim().is_empty() {
        return Ok(Amount::min_bid());
    }
    Amount::parse(raw).map_err(|e| match e {
        AmountError::NotPositive => ValidationError::StartBidTooLow,
        _ => ValidationError::MalformedStartBid,
    })
}

fn validate(cmd: &CreateListingCommand) -> Result<NewListing, ValidationError> {
    let title = cmd.title.trim();
    if title.is_empty() {
        return Err(ValidationError::BlankTitle);
    }
    ensure_max_len("title", title, TITLE_MAX_LEN)?;

    let category = cmd.category.trim();
    if category.is_empty() {
        return Err(ValidationError::BlankCategory);
    }
    ensure_max_len("category", category, CATEGORY_MAX_LEN)?;

    let description = cmd.description.trim();
    ensure_max_len("description", description, DESCRIPTION_MAX_LEN)?;
    let image_url = cmd.image_url.trim();
    ensure_max_len("image url", image_url, IMAGE_URL_MAX_LEN)?;

    Ok(NewListing {
        owner_id: cmd.owner_id,
        title: title.to_string(),
        description: description.to_string(),
        start_bid: parse_start_bid(&cmd.start_bid)?,
        image_url: image_url.to_string(),
        category: category.to_string(),
    })
}

/// Create a listing; its current price starts at the starting bid
pub async fn create_listing(
    store: &impl MarketStore,
    cmd: CreateListingCommand,
) -> Result<Listing, MarketError> {
    info!("{:<12} --> create listing: {:?}", "Command", cmd.title);
    let new_listing = validate(&cmd)?;
    accounts::get_user(store, cmd.owner_id).await?;

    let listing = store.insert_listing(new_listing).await?;
    info!(
        "{:<12} --> listing {} created in {}",
        "Command", listing.id, listing.category
    );
    Ok(listing)
}
// endregion: --- Commands

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryMarketStore;
    use crate::test_support::{amount, seed_user};
    use rstest::rstest;

    fn command(owner_id: i64) -> CreateListingCommand {
        CreateListingCommand {
            owner_id,
            title: "Road bike".to_string(),
            description: "Barely used".to_string(),
            start_bid: "120".to_string(),
            image_url: "https://img.example/bike.png".to_string(),
            category: "Sports".to_string(),
        }
    }

    #[tokio::test]
    async fn creates_listing_priced_at_start_bid() {
        let store = InMemoryMarketStore::new();
        let owner = seed_user(&store, "owner").await;

        let listing = create_listing(&store, command(owner.id)).await.unwrap();
        assert_eq!(listing.start_bid, amount("120.00"));
        assert_eq!(listing.current_price, listing.start_bid);
        assert_eq!(listing.owner_id, owner.id);
        assert_eq!(listing.category, "Sports");
    }

    #[tokio::test]
    async fn blank_start_bid_defaults_to_minimum() {
        let store = InMemoryMarketStore::new();
        let owner = seed_user(&store, "owner").await;
        let cmd = CreateListingCommand {
            start_bid: "  ".to_string(),
            ..command(owner.id)
        };

        let listing = create_listing(&store, cmd).await.unwrap();
        assert_eq!(listing.start_bid, amount("0.01"));
        assert_eq!(listing.current_price, amount("0.01"));
    }

    #[rstest]
    #[case("", "Sports", "120", ValidationError::BlankTitle)]
    #[case("Bike", "  ", "120", ValidationError::BlankCategory)]
    #[case("Bike", "Sports", "a lot", ValidationError::MalformedStartBid)]
    #[case("Bike", "Sports", "12.345", ValidationError::MalformedStartBid)]
    #[case("Bike", "Sports", "0", ValidationError::StartBidTooLow)]
    #[case(
        "A title that is far too long to fit within fifty characters",
        "Sports",
        "1",
        ValidationError::TooLong { field: "title", max: TITLE_MAX_LEN }
    )]
    #[tokio::test]
    async fn rejects_invalid_input(
        #[case] title: &str,
        #[case] category: &str,
        #[case] start_bid: &str,
        #[case] expected: ValidationError,
    ) {
        let store = InMemoryMarketStore::new();
        let owner = seed_user(&store, "owner").await;
        let cmd = CreateListingCommand {
            title: title.to_string(),
            category: category.to_string(),
            start_bid: start_bid.to_string(),
            ..command(owner.id)
        };

        match create_listing(&store, cmd).await {
            Err(MarketError::Validation(found)) => assert_eq!(found, expected),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(store.listings(None).await.unwrap().is_empty());
    }

    #[rstest]
    #[case("description", DESCRIPTION_MAX_LEN)]
    #[case("image url", IMAGE_URL_MAX_LEN)]
    #[case("category", CATEGORY_MAX_LEN)]
    #[tokio::test]
    async fn rejects_overlong_fields(#[case] field: &'static str, #[case] max: usize) {
        let store = InMemoryMarketStore::new();
        let owner = seed_user(&store, "owner").await;
        let with_len = |len: usize| {
            let mut cmd = command(owner.id);
            let text = "x".repeat(len);
            match field {
                "description" => cmd.description = text,
                "image url" => cmd.image_url = text,
                _ => cmd.category = text,
            }
            cmd
        };

        match create_listing(&store, with_len(max + 1)).await {
            Err(MarketError::Validation(found)) => {
                assert_eq!(found, ValidationError::TooLong { field, max })
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(store.listings(None).await.unwrap().is_empty());

        create_listing(&store, with_len(max)).await.unwrap();
    }

    #[test]
    fn start_bid_may_be_a_json_number() {
        let cmd: CreateListingCommand = serde_json::from_value(serde_json::json!({
            "owner_id": 1,
            "title": "Lamp",
            "start_bid": 10,
            "category": "Lighting",
        }))
        .unwrap();
        assert_eq!(cmd.start_bid, "10");
        assert_eq!(validate(&cmd).unwrap().start_bid, amount("10.00"));
    }

    #[tokio::test]
    async fn unknown_owner_is_not_found() {
        let store = InMemoryMarketStore::new();
        let err = create_listing(&store, command(77)).await.unwrap_err();
        assert!(matches!(err, MarketError::UserNotFound(77)));
    }
}
