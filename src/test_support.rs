//! Fixtures shared by unit tests.
use crate::auction::model::{Listing, User};
use crate::auction::Amount;
use crate::store::{InMemoryMarketStore, MarketStore, NewListing, NewUser};

pub(crate) async fn seed_user(store: &InMemoryMarketStore, username: &str) -> User {
    store
        .insert_user(NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
        })
        .await
        .expect("store available")
        .expect("unique username")
}

pub(crate) async fn seed_listing(
    store: &InMemoryMarketStore,
    owner: &User,
    start_bid: &str,
    category: &str,
) -> Listing {
    store
        .insert_listing(NewListing {
            owner_id: owner.id,
            title: "Vintage camera".to_string(),
            description: "Works fine".to_string(),
            start_bid: Amount::parse(start_bid).expect("valid start bid"),
            image_url: String::new(),
            category: category.to_string(),
        })
        .await
        .expect("store available")
}

pub(crate) fn amount(raw: &str) -> Amount {
    Amount::parse(raw).expect("valid amount")
}
