// region:    --- Imports
use crate::accounts::{self, RegisterCommand};
use crate::bidding::commands::{close_auction, place_bid, CloseAuctionCommand, PlaceBidCommand};
use crate::bidding::queries as bidding_queries;
use crate::catalog::commands::{create_listing, CreateListingCommand};
use crate::catalog::queries as catalog_queries;
use crate::comments::{self, AddCommentCommand};
use crate::error::{MarketError, ValidationError};
use crate::store::MarketStore;
use crate::watchlist;
use axum::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Path, Query, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

// endregion: --- Imports

// region:    --- Router

/// All routes, sharing one store
pub fn routes<S: MarketStore + 'static>(store: Arc<S>) -> Router {
    Router::new()
        .route("/users", post(handle_register::<S>))
        .route("/users/:id", get(handle_get_user::<S>))
        .route("/users/:id/watchlist", get(handle_get_watchlist::<S>))
        .route(
            "/listings",
            get(handle_get_listings::<S>).post(handle_create_listing::<S>),
        )
        .route("/listings/:id", get(handle_get_listing::<S>))
        .route(
            "/listings/:id/bids",
            get(handle_get_bid_history::<S>).post(handle_place_bid::<S>),
        )
        .route(
            "/listings/:id/highest-bid",
            get(handle_get_highest_bid::<S>),
        )
        .route("/listings/:id/close", post(handle_close_auction::<S>))
        .route("/listings/:id/outcome", get(handle_get_outcome::<S>))
        .route(
            "/listings/:id/comments",
            get(handle_get_comments::<S>).post(handle_add_comment::<S>),
        )
        .route(
            "/listings/:id/watch",
            post(handle_watch::<S>).delete(handle_unwatch::<S>),
        )
        .route("/categories", get(handle_get_categories::<S>))
        .with_state(store)
}

// endregion: --- Router

// region:    --- Errors

impl IntoResponse for MarketError {
    fn into_response(self) -> Response {
        let status = match &self {
            MarketError::Validation(_) => StatusCode::BAD_REQUEST,
            MarketError::Rule(_) => StatusCode::CONFLICT,
            MarketError::NotOwner => StatusCode::FORBIDDEN,
            MarketError::ListingNotFound(_) | MarketError::UserNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            MarketError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("{:<12} --> store failure: {}", "Handler", self);
            "internal error".to_string()
        } else {
            info!("{:<12} --> rejected: {}", "Handler", self);
            self.to_string()
        };

        (
            status,
            Json(serde_json::json!({
                "error": message,
                "code": self.code(),
            })),
        )
            .into_response()
    }
}

// endregion: --- Errors

// region:    --- Request Bodies

/// JSON body whose rejections answer in the market's error format
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = MarketError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(malformed_body(rejection)),
        }
    }
}

fn malformed_body(rejection: JsonRejection) -> MarketError {
    ValidationError::MalformedBody(rejection.body_text()).into()
}

/// Acting user for requests that need nothing else
#[derive(Debug, Deserialize)]
pub struct ActorRequest {
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct BidRequest {
    pub user_id: i64,
    #[serde(deserialize_with = "crate::auction::amount::text_or_number")]
    pub amount: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub user_id: i64,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ListingFilter {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ViewerQuery {
    pub viewer: Option<i64>,
}

// endregion: --- Request Bodies

// region:    --- Command Handlers

pub async fn handle_register<S: MarketStore>(
    State(store): State<Arc<S>>,
    JsonBody(cmd): JsonBody<RegisterCommand>,
) -> Result<impl IntoResponse, MarketError> {
    let user = accounts::register_user(&*store, cmd).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn handle_create_listing<S: MarketStore>(
    State(store): State<Arc<S>>,
    JsonBody(cmd): JsonBody<CreateListingCommand>,
) -> Result<impl IntoResponse, MarketError> {
    let listing = create_listing(&*store, cmd).await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

pub async fn handle_place_bid<S: MarketStore>(
    State(store): State<Arc<S>>,
    Path(listing_id): Path<i64>,
    JsonBody(req): JsonBody<BidRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let cmd = PlaceBidCommand {
        listing_id,
        user_id: req.user_id,
        amount: req.amount,
    };
    let bid = place_bid(&*store, cmd).await?;
    Ok((StatusCode::CREATED, Json(bid)))
}

pub async fn handle_close_auction<S: MarketStore>(
    State(store): State<Arc<S>>,
    Path(listing_id): Path<i64>,
    JsonBody(req): JsonBody<ActorRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let cmd = CloseAuctionCommand {
        listing_id,
        user_id: req.user_id,
    };
    Ok(Json(close_auction(&*store, cmd).await?))
}

pub async fn handle_add_comment<S: MarketStore>(
    State(store): State<Arc<S>>,
    Path(listing_id): Path<i64>,
    JsonBody(req): JsonBody<CommentRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let cmd = AddCommentCommand {
        listing_id,
        user_id: req.user_id,
        text: req.text,
    };
    let comment = comments::add_comment(&*store, cmd).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn handle_watch<S: MarketStore>(
    State(store): State<Arc<S>>,
    Path(listing_id): Path<i64>,
    JsonBody(req): JsonBody<ActorRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let entry = watchlist::add(&*store, req.user_id, listing_id).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn handle_unwatch<S: MarketStore>(
    State(store): State<Arc<S>>,
    Path(listing_id): Path<i64>,
    JsonBody(req): JsonBody<ActorRequest>,
) -> Result<impl IntoResponse, MarketError> {
    watchlist::remove(&*store, req.user_id, listing_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// endregion: --- Command Handlers

// region:    --- Query Handlers

pub async fn handle_get_user<S: MarketStore>(
    State(store): State<Arc<S>>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, MarketError> {
    Ok(Json(accounts::get_user(&*store, user_id).await?))
}

pub async fn handle_get_watchlist<S: MarketStore>(
    State(store): State<Arc<S>>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, MarketError> {
    Ok(Json(watchlist::list_for(&*store, user_id).await?))
}

/// Every listing, or one category with `?category=`
pub async fn handle_get_listings<S: MarketStore>(
    State(store): State<Arc<S>>,
    Query(filter): Query<ListingFilter>,
) -> Result<impl IntoResponse, MarketError> {
    let listings = match filter.category.as_deref() {
        Some(category) => catalog_queries::list_by_category(&*store, category).await?,
        None => catalog_queries::list_listings(&*store).await?,
    };
    Ok(Json(listings))
}

pub async fn handle_get_listing<S: MarketStore>(
    State(store): State<Arc<S>>,
    Path(listing_id): Path<i64>,
    Query(query): Query<ViewerQuery>,
) -> Result<impl IntoResponse, MarketError> {
    Ok(Json(
        catalog_queries::listing_detail(&*store, listing_id, query.viewer).await?,
    ))
}

pub async fn handle_get_bid_history<S: MarketStore>(
    State(store): State<Arc<S>>,
    Path(listing_id): Path<i64>,
) -> Result<impl IntoResponse, MarketError> {
    Ok(Json(bidding_queries::bid_history(&*store, listing_id).await?))
}

pub async fn handle_get_highest_bid<S: MarketStore>(
    State(store): State<Arc<S>>,
    Path(listing_id): Path<i64>,
) -> Result<impl IntoResponse, MarketError> {
    Ok(Json(bidding_queries::highest_bid(&*store, listing_id).await?))
}

pub async fn handle_get_outcome<S: MarketStore>(
    State(store): State<Arc<S>>,
    Path(listing_id): Path<i64>,
) -> Result<impl IntoResponse, MarketError> {
    Ok(Json(
        bidding_queries::auction_outcome(&*store, listing_id).await?,
    ))
}

pub async fn handle_get_comments<S: MarketStore>(
    State(store): State<Arc<S>>,
    Path(listing_id): Path<i64>,
) -> Result<impl IntoResponse, MarketError> {
    Ok(Json(comments::comments_for(&*store, listing_id).await?))
}

pub async fn handle_get_categories<S: MarketStore>(
    State(store): State<Arc<S>>,
) -> Result<impl IntoResponse, MarketError> {
    Ok(Json(catalog_queries::list_all_categories(&*store).await?))
}

// endregion: --- Query Handlers
