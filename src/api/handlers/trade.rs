//! Trade handlers: propose, list, get, confirm, delete.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};

use crate::api::dto::{ConfirmTradeRequest, CreateTradeRequest, TradeDto};
use crate::api::extract::AuthUser;
use crate::app_state::AppState;
use crate::domain::{TradeId, UserId};
use crate::error::{ErrorResponse, TradeHubError};

/// `POST /trades`: Propose a trade to another user.
///
/// # Errors
///
/// Returns [`TradeHubError::Validation`] for a self-trade and
/// [`TradeHubError::NotFound`] for an unknown receiver.
#[utoipa::path(
    post,
    path = "/api/v1/trades",
    tag = "Trades",
    summary = "Propose a trade",
    security(("bearer_auth" = [])),
    request_body = CreateTradeRequest,
    responses(
        (status = 201, description = "Trade created in pending state", body = TradeDto),
        (status = 400, description = "Self-trade", body = ErrorResponse),
        (status = 404, description = "Receiver not found", body = ErrorResponse),
    )
)]
pub async fn create_trade(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(req): Json<CreateTradeRequest>,
) -> Result<impl IntoResponse, TradeHubError> {
    let trade = state
        .trade_service
        .create(&principal, req.receiver_id)
        .await?;
    Ok((StatusCode::CREATED, Json(TradeDto::from(trade))))
}

/// `GET /trades`: Trades the caller takes part in (admins: all).
///
/// # Errors
///
/// Returns [`TradeHubError`] on store failures.
#[utoipa::path(
    get,
    path = "/api/v1/trades",
    tag = "Trades",
    summary = "List trades",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Trades", body = Vec<TradeDto>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn list_trades(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<impl IntoResponse, TradeHubError> {
    let trades = state.trade_service.list(&principal).await?;
    Ok(Json(trades.into_iter().map(TradeDto::from).collect::<Vec<_>>()))
}

/// `GET /trades/user/{userId}`: Trades of one user.
///
/// # Errors
///
/// Returns [`TradeHubError::Forbidden`] for other users' trades unless
/// the caller is an admin.
#[utoipa::path(
    get,
    path = "/api/v1/trades/user/{userId}",
    tag = "Trades",
    summary = "List a user's trades",
    security(("bearer_auth" = [])),
    params(("userId" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Trades", body = Vec<TradeDto>),
        (status = 403, description = "Not permitted", body = ErrorResponse),
        (status = 404, description = "No such user", body = ErrorResponse),
    )
)]
pub async fn list_user_trades(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(user_id): Path<UserId>,
) -> Result<impl IntoResponse, TradeHubError> {
    let trades = state
        .trade_service
        .list_for_user(&principal, user_id)
        .await?;
    Ok(Json(trades.into_iter().map(TradeDto::from).collect::<Vec<_>>()))
}

/// `GET /trades/{id}`: Get a trade.
///
/// # Errors
///
/// Returns [`TradeHubError::NotFound`] or [`TradeHubError::Forbidden`].
#[utoipa::path(
    get,
    path = "/api/v1/trades/{id}",
    tag = "Trades",
    summary = "Get a trade",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Trade id")),
    responses(
        (status = 200, description = "Trade", body = TradeDto),
        (status = 403, description = "Not a participant", body = ErrorResponse),
        (status = 404, description = "No such trade", body = ErrorResponse),
    )
)]
pub async fn get_trade(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<TradeId>,
) -> Result<impl IntoResponse, TradeHubError> {
    let trade = state.trade_service.get(&principal, id).await?;
    Ok(Json(TradeDto::from(trade)))
}

/// `PUT /trades/{id}`: Confirm the caller's side of a trade.
///
/// # Errors
///
/// Returns [`TradeHubError::Validation`] unless `confirmed` is `true`,
/// [`TradeHubError::Forbidden`] for non-participants and
/// [`TradeHubError::ConcurrencyConflict`] if the trade changed meanwhile.
#[utoipa::path(
    put,
    path = "/api/v1/trades/{id}",
    tag = "Trades",
    summary = "Confirm a trade",
    description = "Sets the caller's confirmation flag. The trade completes once both participants have confirmed. Confirmations cannot be withdrawn.",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Trade id")),
    request_body = ConfirmTradeRequest,
    responses(
        (status = 200, description = "Trade after confirmation", body = TradeDto),
        (status = 400, description = "confirmed was false", body = ErrorResponse),
        (status = 403, description = "Not a participant", body = ErrorResponse),
        (status = 404, description = "No such trade", body = ErrorResponse),
        (status = 409, description = "Concurrent modification; retry", body = ErrorResponse),
    )
)]
pub async fn update_trade(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<TradeId>,
    Json(req): Json<ConfirmTradeRequest>,
) -> Result<impl IntoResponse, TradeHubError> {
    if !req.confirmed {
        return Err(TradeHubError::Validation(
            "confirmations cannot be withdrawn".to_string(),
        ));
    }
    let trade = state.trade_service.confirm(&principal, id).await?;
    Ok(Json(TradeDto::from(trade)))
}

/// `PUT /trades/{id}/confirm`: Body-less confirmation.
///
/// # Errors
///
/// As [`update_trade`].
#[utoipa::path(
    put,
    path = "/api/v1/trades/{id}/confirm",
    tag = "Trades",
    summary = "Confirm a trade (no body)",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Trade id")),
    responses(
        (status = 200, description = "Trade after confirmation", body = TradeDto),
        (status = 403, description = "Not a participant", body = ErrorResponse),
        (status = 404, description = "No such trade", body = ErrorResponse),
        (status = 409, description = "Concurrent modification; retry", body = ErrorResponse),
    )
)]
pub async fn confirm_trade(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<TradeId>,
) -> Result<impl IntoResponse, TradeHubError> {
    let trade = state.trade_service.confirm(&principal, id).await?;
    Ok(Json(TradeDto::from(trade)))
}

/// `DELETE /trades/{id}`: Delete a pending trade and its offers.
///
/// # Errors
///
/// Returns [`TradeHubError::Forbidden`], [`TradeHubError::NotFound`] or
/// [`TradeHubError::Conflict`] for a completed trade.
#[utoipa::path(
    delete,
    path = "/api/v1/trades/{id}",
    tag = "Trades",
    summary = "Delete a trade",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Trade id")),
    responses(
        (status = 204, description = "Trade deleted"),
        (status = 403, description = "Not a participant", body = ErrorResponse),
        (status = 404, description = "No such trade", body = ErrorResponse),
        (status = 409, description = "Trade completed", body = ErrorResponse),
    )
)]
pub async fn delete_trade(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<TradeId>,
) -> Result<impl IntoResponse, TradeHubError> {
    state.trade_service.delete(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Trade routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/trades", get(list_trades).post(create_trade))
        .route("/trades/user/{user_id}", get(list_user_trades))
        .route(
            "/trades/{id}",
            get(get_trade).put(update_trade).delete(delete_trade),
        )
        .route("/trades/{id}/confirm", put(confirm_trade))
}

