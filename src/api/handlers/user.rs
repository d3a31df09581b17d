//! Admin user-management handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};

use crate::api::dto::{CreateUserRequest, UpdateRoleRequest, UserDto};
use crate::api::extract::AuthUser;
use crate::app_state::AppState;
use crate::domain::UserId;
use crate::error::{ErrorResponse, TradeHubError};
use crate::service::NewAccount;

/// `GET /admin/users`: List all users.
///
/// # Errors
///
/// Returns [`TradeHubError::Forbidden`] for non-admins.
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    tag = "Admin",
    summary = "List users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All users", body = Vec<UserDto>),
        (status = 403, description = "Not an admin", body = ErrorResponse),
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<impl IntoResponse, TradeHubError> {
    let users = state.user_service.list(&principal).await?;
    Ok(Json(users.into_iter().map(UserDto::from).collect::<Vec<_>>()))
}

/// `POST /admin/users`: Create a user with an explicit role.
///
/// # Errors
///
/// Returns [`TradeHubError::Forbidden`], [`TradeHubError::Validation`] or
/// [`TradeHubError::Conflict`].
#[utoipa::path(
    post,
    path = "/api/v1/admin/users",
    tag = "Admin",
    summary = "Create a user",
    security(("bearer_auth" = [])),
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserDto),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Not an admin", body = ErrorResponse),
        (status = 409, description = "Username or email taken", body = ErrorResponse),
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, TradeHubError> {
    let user = state
        .user_service
        .create(
            &principal,
            NewAccount {
                username: req.username,
                email: req.email,
                password: req.password,
                role: req.role,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(UserDto::from(user))))
}

/// `GET /admin/users/{id}`: Get a user.
///
/// # Errors
///
/// Returns [`TradeHubError::Forbidden`] or [`TradeHubError::NotFound`].
#[utoipa::path(
    get,
    path = "/api/v1/admin/users/{id}",
    tag = "Admin",
    summary = "Get a user",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserDto),
        (status = 403, description = "Not an admin", body = ErrorResponse),
        (status = 404, description = "No such user", body = ErrorResponse),
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<UserId>,
) -> Result<impl IntoResponse, TradeHubError> {
    let user = state.user_service.get(&principal, id).await?;
    Ok(Json(UserDto::from(user)))
}

/// `PUT /admin/users/{id}/role`: Change a user's role.
///
/// Applies from the user's next request, including with tokens issued
/// before the change.
///
/// # Errors
///
/// Returns [`TradeHubError::Forbidden`], [`TradeHubError::NotFound`] or
/// [`TradeHubError::Conflict`] when an admin demotes themselves.
#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}/role",
    tag = "Admin",
    summary = "Change a user's role",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User id")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Updated user", body = UserDto),
        (status = 403, description = "Not an admin", body = ErrorResponse),
        (status = 404, description = "No such user", body = ErrorResponse),
        (status = 409, description = "Self-demotion", body = ErrorResponse),
    )
)]
pub async fn update_role(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<UserId>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<impl IntoResponse, TradeHubError> {
    let user = state.user_service.set_role(&principal, id, req.role).await?;
    Ok(Json(UserDto::from(user)))
}

/// `DELETE /admin/users/{id}`: Delete a user.
///
/// # Errors
///
/// Returns [`TradeHubError::Forbidden`], [`TradeHubError::NotFound`] or
/// [`TradeHubError::Conflict`] while trades or offers reference the user.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/users/{id}",
    tag = "Admin",
    summary = "Delete a user",
    description = "Deletes the account and its items. Rejected while the user takes part in trades or offers, or while their items are offered.",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Not an admin", body = ErrorResponse),
        (status = 404, description = "No such user", body = ErrorResponse),
        (status = 409, description = "User still referenced", body = ErrorResponse),
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<UserId>,
) -> Result<impl IntoResponse, TradeHubError> {
    state.user_service.delete(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users).post(create_user))
        .route("/admin/users/{id}", get(get_user).delete(delete_user))
        .route("/admin/users/{id}/role", put(update_role))
}
