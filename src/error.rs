//! Error taxonomy shared by every market operation.
//!
//! Each variant carries the message shown to the user. Nothing here is fatal:
//! callers turn these into a response and carry on.

use crate::auction::Amount;
use crate::store::StoreError;
use thiserror::Error;

/// Blank or malformed input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Enter a valid bid.")]
    MissingBid,
    #[error("invalid bid")]
    InvalidBid,
    #[error("title cannot be blank")]
    BlankTitle,
    #[error("category cannot be blank")]
    BlankCategory,
    #[error("an issue with the starting bid format")]
    MalformedStartBid,
    #[error("starting bid must be at least 0.01")]
    StartBidTooLow,
    #[error("comment cannot be blank")]
    BlankComment,
    #[error("username cannot be blank")]
    BlankUsername,
    #[error("{field} cannot exceed {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("malformed request body: {0}")]
    MalformedBody(String),
}

/// Well-formed requests that break an auction rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    #[error("your bid isn't higher than the minimum bid")]
    BelowMinimum { start_bid: Amount },
    #[error("your bid must be higher than the highest bid")]
    NotAboveHighest { current_price: Amount },
    #[error("you can't enter the same bid twice")]
    DuplicateBid,
    #[error("this auction is closed")]
    AuctionClosed,
    #[error("already closed")]
    AlreadyClosed,
    #[error("entry exists")]
    AlreadyWatching,
    #[error("Username already taken.")]
    UsernameTaken,
}

#[derive(Debug, Error)]
pub enum MarketError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Rule(#[from] RuleViolation),
    #[error("only the owner can close this auction")]
    NotOwner,
    #[error("listing {0} not found")]
    ListingNotFound(i64),
    #[error("user {0} not found")]
    UserNotFound(i64),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl MarketError {
    /// Stable machine-readable code for API clients.
    pub fn code(&self) -> &'static str {
        match self {
            MarketError::Validation(ValidationError::MissingBid)
            | MarketError::Validation(ValidationError::InvalidBid) => "INVALID_AMOUNT",
            MarketError::Validation(_) => "INVALID_INPUT",
            MarketError::Rule(rule) => match rule {
                RuleViolation::BelowMinimum { .. } => "BELOW_MINIMUM",
                RuleViolation::NotAboveHighest { .. } => "LOW_BID",
                RuleViolation::DuplicateBid => "DUPLICATE_BID",
                RuleViolation::AuctionClosed => "AUCTION_CLOSED",
                RuleViolation::AlreadyClosed => "ALREADY_CLOSED",
                RuleViolation::AlreadyWatching => "ENTRY_EXISTS",
                RuleViolation::UsernameTaken => "USERNAME_TAKEN",
            },
            MarketError::NotOwner => "NOT_OWNER",
            MarketError::ListingNotFound(_) | MarketError::UserNotFound(_) => "NOT_FOUND",
            MarketError::Store(_) => "STORE_ERROR",
        }
    }
}

/// Length check on already-trimmed input.
pub(crate) fn ensure_max_len(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}
