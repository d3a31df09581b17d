//! Offer handlers: create, add/remove items, get, delete, list.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use crate::api::dto::{AddOfferItemRequest, CreateOfferRequest, OfferDto, VersionQuery};
use crate::api::extract::AuthUser;
use crate::app_state::AppState;
use crate::domain::{ItemId, OfferId, TradeId, UserId};
use crate::error::{ErrorResponse, TradeHubError};

/// `POST /offers`: Make an offer on a trade.
///
/// # Errors
///
/// Returns [`TradeHubError::Forbidden`] for non-participants or foreign
/// items, [`TradeHubError::Validation`] for bad lines and
/// [`TradeHubError::Conflict`] for a completed trade or unavailable item.
#[utoipa::path(
    post,
    path = "/api/v1/offers",
    tag = "Offers",
    summary = "Create an offer",
    description = "Creates an offer on a trade the caller takes part in, optionally with initial items. Items must belong to the caller and be available.",
    security(("bearer_auth" = [])),
    request_body = CreateOfferRequest,
    responses(
        (status = 201, description = "Offer created", body = OfferDto),
        (status = 400, description = "Invalid line items", body = ErrorResponse),
        (status = 403, description = "Not a participant or not the item owner", body = ErrorResponse),
        (status = 404, description = "Trade or item not found", body = ErrorResponse),
        (status = 409, description = "Trade completed or item unavailable", body = ErrorResponse),
    )
)]
pub async fn create_offer(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(req): Json<CreateOfferRequest>,
) -> Result<impl IntoResponse, TradeHubError> {
    let lines = req
        .items
        .into_iter()
        .map(|line| line.into_line())
        .collect::<Result<Vec<_>, _>>()?;
    let offer = state
        .offer_service
        .create(&principal, req.trade_id, lines)
        .await?;
    Ok((StatusCode::CREATED, Json(OfferDto::from(offer))))
}

/// `POST /offers/{offerId}/items`: Add an item to an offer.
///
/// # Errors
///
/// Returns [`TradeHubError::Forbidden`] unless the caller proposed the
/// offer, [`TradeHubError::Conflict`] for duplicates and
/// [`TradeHubError::ConcurrencyConflict`] for a stale `version`.
#[utoipa::path(
    post,
    path = "/api/v1/offers/{offerId}/items",
    tag = "Offers",
    summary = "Add an item to an offer",
    security(("bearer_auth" = [])),
    params(("offerId" = i64, Path, description = "Offer id")),
    request_body = AddOfferItemRequest,
    responses(
        (status = 200, description = "Offer with new version", body = OfferDto),
        (status = 400, description = "Invalid line", body = ErrorResponse),
        (status = 403, description = "Not the proposer", body = ErrorResponse),
        (status = 404, description = "Offer or item not found", body = ErrorResponse),
        (status = 409, description = "Duplicate item, stale version or completed trade", body = ErrorResponse),
    )
)]
pub async fn add_offer_item(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(offer_id): Path<OfferId>,
    Json(req): Json<AddOfferItemRequest>,
) -> Result<impl IntoResponse, TradeHubError> {
    let line = req.line.into_line()?;
    let offer = state
        .offer_service
        .add_item(&principal, offer_id, line, req.version)
        .await?;
    Ok(Json(OfferDto::from(offer)))
}

/// `DELETE /offers/{offerId}/items/{itemId}?version=`: Remove an item.
///
/// # Errors
///
/// Returns [`TradeHubError::Forbidden`], [`TradeHubError::NotFound`] or
/// [`TradeHubError::ConcurrencyConflict`].
#[utoipa::path(
    delete,
    path = "/api/v1/offers/{offerId}/items/{itemId}",
    tag = "Offers",
    summary = "Remove an item from an offer",
    security(("bearer_auth" = [])),
    params(
        ("offerId" = i64, Path, description = "Offer id"),
        ("itemId" = i64, Path, description = "Item id"),
        VersionQuery,
    ),
    responses(
        (status = 200, description = "Offer with new version", body = OfferDto),
        (status = 403, description = "Not the proposer", body = ErrorResponse),
        (status = 404, description = "Offer or line not found", body = ErrorResponse),
        (status = 409, description = "Stale version or completed trade", body = ErrorResponse),
    )
)]
pub async fn remove_offer_item(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path((offer_id, item_id)): Path<(OfferId, ItemId)>,
    Query(query): Query<VersionQuery>,
) -> Result<impl IntoResponse, TradeHubError> {
    let offer = state
        .offer_service
        .remove_item(&principal, offer_id, item_id, query.token())
        .await?;
    Ok(Json(OfferDto::from(offer)))
}

/// `GET /offers/{offerId}`: Get an offer.
///
/// # Errors
///
/// Returns [`TradeHubError::NotFound`] or [`TradeHubError::Forbidden`].
#[utoipa::path(
    get,
    path = "/api/v1/offers/{offerId}",
    tag = "Offers",
    summary = "Get an offer",
    security(("bearer_auth" = [])),
    params(("offerId" = i64, Path, description = "Offer id")),
    responses(
        (status = 200, description = "Offer", body = OfferDto),
        (status = 403, description = "Not a participant", body = ErrorResponse),
        (status = 404, description = "No such offer", body = ErrorResponse),
    )
)]
pub async fn get_offer(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(offer_id): Path<OfferId>,
) -> Result<impl IntoResponse, TradeHubError> {
    let offer = state.offer_service.get(&principal, offer_id).await?;
    Ok(Json(OfferDto::from(offer)))
}

/// `DELETE /offers/{offerId}?version=`: Delete an offer and its items.
///
/// # Errors
///
/// Returns [`TradeHubError::Forbidden`], [`TradeHubError::NotFound`],
/// [`TradeHubError::Conflict`] or [`TradeHubError::ConcurrencyConflict`].
#[utoipa::path(
    delete,
    path = "/api/v1/offers/{offerId}",
    tag = "Offers",
    summary = "Delete an offer",
    security(("bearer_auth" = [])),
    params(("offerId" = i64, Path, description = "Offer id"), VersionQuery),
    responses(
        (status = 204, description = "Offer deleted"),
        (status = 403, description = "Not the proposer", body = ErrorResponse),
        (status = 404, description = "No such offer", body = ErrorResponse),
        (status = 409, description = "Stale version or completed trade", body = ErrorResponse),
    )
)]
pub async fn delete_offer(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(offer_id): Path<OfferId>,
    Query(query): Query<VersionQuery>,
) -> Result<impl IntoResponse, TradeHubError> {
    state
        .offer_service
        .delete(&principal, offer_id, query.token())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /offers/trade/{tradeId}`: Offers on a trade.
///
/// # Errors
///
/// Returns [`TradeHubError::NotFound`] or [`TradeHubError::Forbidden`].
#[utoipa::path(
    get,
    path = "/api/v1/offers/trade/{tradeId}",
    tag = "Offers",
    summary = "List offers on a trade",
    security(("bearer_auth" = [])),
    params(("tradeId" = i64, Path, description = "Trade id")),
    responses(
        (status = 200, description = "Offers", body = Vec<OfferDto>),
        (status = 403, description = "Not a participant", body = ErrorResponse),
        (status = 404, description = "No such trade", body = ErrorResponse),
    )
)]
pub async fn list_trade_offers(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(trade_id): Path<TradeId>,
) -> Result<impl IntoResponse, TradeHubError> {
    let offers = state
        .offer_service
        .list_by_trade(&principal, trade_id)
        .await?;
    Ok(Json(offers.into_iter().map(OfferDto::from).collect::<Vec<_>>()))
}

/// `GET /offers/received/{userId}`: Offers others made on a user's trades.
///
/// # Errors
///
/// Returns [`TradeHubError::Forbidden`] for other users unless the caller
/// is an admin.
#[utoipa::path(
    get,
    path = "/api/v1/offers/received/{userId}",
    tag = "Offers",
    summary = "List received offers",
    security(("bearer_auth" = [])),
    params(("userId" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Offers", body = Vec<OfferDto>),
        (status = 403, description = "Not permitted", body = ErrorResponse),
    )
)]
pub async fn list_received_offers(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(user_id): Path<UserId>,
) -> Result<impl IntoResponse, TradeHubError> {
    let offers = state
        .offer_service
        .list_received(&principal, user_id)
        .await?;
    Ok(Json(offers.into_iter().map(OfferDto::from).collect::<Vec<_>>()))
}

/// Offer routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/offers", post(create_offer))
        .route("/offers/{offer_id}", get(get_offer).delete(delete_offer))
        .route("/offers/{offer_id}/items", post(add_offer_item))
        .route(
            "/offers/{offer_id}/items/{item_id}",
            delete(remove_offer_item),
        )
        .route("/offers/trade/{trade_id}", get(list_trade_offers))
        .route("/offers/received/{user_id}", get(list_received_offers))
}
