//! Append-only comments on listings.
use crate::accounts::get_user;
use crate::auction::model::Comment;
use crate::catalog::queries::get_listing;
use crate::error::{ensure_max_len, MarketError, ValidationError};
use crate::store::{MarketStore, NewComment};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const COMMENT_MAX_LEN: usize = 500;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AddCommentCommand {
    pub listing_id: i64,
    pub user_id: i64,
    pub text: String,
}

pub async fn add_comment(
    store: &impl MarketStore,
    cmd: AddCommentCommand,
) -> Result<Comment, MarketError> {
    let text = cmd.text.trim();
    if text.is_empty() {
        return Err(ValidationError::BlankComment.into());
    }
    ensure_max_len("comment", text, COMMENT_MAX_LEN)?;

    let listing = get_listing(store, cmd.listing_id).await?;
    get_user(store, cmd.user_id).await?;

    let comment = store
        .insert_comment(NewComment {
            listing_id: listing.id,
            user_id: cmd.user_id,
            text: text.to_string(),
        })
        .await?;
    info!(
        "{:<12} --> comment {} on listing {}",
        "Command", comment.id, comment.listing_id
    );
    Ok(comment)
}

/// Oldest first
pub async fn comments_for(
    store: &impl MarketStore,
    listing_id: i64,
) -> Result<Vec<Comment>, MarketError> {
    let listing = get_listing(store, listing_id).await?;
    Ok(store.comments_for(listing.id).await?)
}
