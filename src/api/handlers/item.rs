//! Item handlers: create, list, get, replace, patch, delete.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{
    CreateItemRequest, ItemDto, ItemListQuery, ItemListResponse, PatchItemRequest,
    UpdateItemRequest, VersionQuery,
};
use crate::api::extract::AuthUser;
use crate::app_state::AppState;
use crate::domain::ItemId;
use crate::error::{ErrorResponse, TradeHubError};

/// `POST /items`: List a new item owned by the caller.
///
/// # Errors
///
/// Returns [`TradeHubError::Validation`] on invalid attributes.
#[utoipa::path(
    post,
    path = "/api/v1/items",
    tag = "Items",
    summary = "Create an item",
    security(("bearer_auth" = [])),
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Item created", body = ItemDto),
        (status = 400, description = "Invalid attributes", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn create_item(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(req): Json<CreateItemRequest>,
) -> Result<impl IntoResponse, TradeHubError> {
    let item = state
        .item_service
        .create(&principal, req.into_details())
        .await?;
    Ok((StatusCode::CREATED, Json(ItemDto::from(item))))
}

/// `GET /items`: List items with optional filters and pagination.
///
/// # Errors
///
/// Returns [`TradeHubError`] on store failures.
#[utoipa::path(
    get,
    path = "/api/v1/items",
    tag = "Items",
    summary = "List items",
    description = "Returns a paginated list of items, optionally filtered by owner, availability and tag.",
    security(("bearer_auth" = [])),
    params(ItemListQuery),
    responses(
        (status = 200, description = "Paginated item list", body = ItemListResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn list_items(
    State(state): State<AppState>,
    AuthUser(_principal): AuthUser,
    Query(query): Query<ItemListQuery>,
) -> Result<impl IntoResponse, TradeHubError> {
    let (filter, pagination) = query.split();
    let items = state.item_service.list(&filter).await?;
    let (page, meta) = pagination.paginate(items);
    Ok(Json(ItemListResponse {
        data: page.into_iter().map(ItemDto::from).collect(),
        pagination: meta,
    }))
}

/// `GET /items/{id}`: Get an item.
///
/// # Errors
///
/// Returns [`TradeHubError::NotFound`] if the item does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/items/{id}",
    tag = "Items",
    summary = "Get an item",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item", body = ItemDto),
        (status = 404, description = "No such item", body = ErrorResponse),
    )
)]
pub async fn get_item(
    State(state): State<AppState>,
    AuthUser(_principal): AuthUser,
    Path(id): Path<ItemId>,
) -> Result<impl IntoResponse, TradeHubError> {
    let item = state.item_service.get(id).await?;
    Ok(Json(ItemDto::from(item)))
}

/// `PUT /items/{id}`: Replace every attribute of an item.
///
/// # Errors
///
/// Returns [`TradeHubError::Forbidden`] for non-owners and
/// [`TradeHubError::ConcurrencyConflict`] for a stale `version`.
#[utoipa::path(
    put,
    path = "/api/v1/items/{id}",
    tag = "Items",
    summary = "Replace an item",
    description = "Full update guarded by the `version` from the last read. A stale version yields 409 with code 2003; re-read and retry.",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Item id")),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Updated item with new version", body = ItemDto),
        (status = 400, description = "Invalid attributes", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "No such item", body = ErrorResponse),
        (status = 409, description = "Stale version", body = ErrorResponse),
    )
)]
pub async fn update_item(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<ItemId>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<impl IntoResponse, TradeHubError> {
    let item = state
        .item_service
        .update(&principal, id, req.item.into_details(), req.version)
        .await?;
    Ok(Json(ItemDto::from(item)))
}

/// `PATCH /items/{id}`: Change some attributes of an item.
///
/// # Errors
///
/// As [`update_item`], plus [`TradeHubError::Validation`] for an empty
/// patch.
#[utoipa::path(
    patch,
    path = "/api/v1/items/{id}",
    tag = "Items",
    summary = "Patch an item",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Item id")),
    request_body = PatchItemRequest,
    responses(
        (status = 200, description = "Updated item with new version", body = ItemDto),
        (status = 400, description = "Invalid or empty patch", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "No such item", body = ErrorResponse),
        (status = 409, description = "Stale version", body = ErrorResponse),
    )
)]
pub async fn patch_item(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<ItemId>,
    Json(req): Json<PatchItemRequest>,
) -> Result<impl IntoResponse, TradeHubError> {
    let (patch, version) = req.into_patch();
    let item = state
        .item_service
        .patch(&principal, id, patch, version)
        .await?;
    Ok(Json(ItemDto::from(item)))
}

/// `DELETE /items/{id}?version=`: Delete an item.
///
/// # Errors
///
/// Returns [`TradeHubError::Forbidden`],
/// [`TradeHubError::ConcurrencyConflict`], or [`TradeHubError::Conflict`]
/// while an offer includes the item.
#[utoipa::path(
    delete,
    path = "/api/v1/items/{id}",
    tag = "Items",
    summary = "Delete an item",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Item id"), VersionQuery),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "No such item", body = ErrorResponse),
        (status = 409, description = "Stale version or item is in an offer", body = ErrorResponse),
    )
)]
pub async fn delete_item(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<ItemId>,
    Query(query): Query<VersionQuery>,
) -> Result<impl IntoResponse, TradeHubError> {
    state
        .item_service
        .delete(&principal, id, query.token())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Item routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route(
            "/items/{id}",
            get(get_item)
                .put(update_item)
                .patch(patch_item)
                .delete(delete_item),
        )
}
