//! Authentication handlers: register, login, current user.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{LoginRequest, RegisterRequest, TokenResponse, UserDto};
use crate::api::extract::AuthUser;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, TradeHubError};

/// `POST /auth/register/user`: Register a regular user.
///
/// # Errors
///
/// Returns [`TradeHubError::Validation`] on malformed input and
/// [`TradeHubError::Conflict`] if the username or email is taken.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register/user",
    tag = "Auth",
    summary = "Register a user",
    description = "Creates an account with the `user` role. Emails are stored lowercase and must be unique.",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserDto),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "Username or email taken", body = ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, TradeHubError> {
    let user = state
        .auth_service
        .register(req.username, req.email, req.password)
        .await?;
    Ok((StatusCode::CREATED, Json(UserDto::from(user))))
}

/// `POST /auth/login`: Exchange credentials for a bearer token.
///
/// # Errors
///
/// Returns [`TradeHubError::Unauthorized`] for bad credentials.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    summary = "Log in",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, TradeHubError> {
    let (user, token) = state.auth_service.login(&req.email, req.password).await?;
    Ok(Json(TokenResponse {
        access_token: token.token,
        token_type: "Bearer".to_string(),
        expires_at: token.expires_at,
        user: user.into(),
    }))
}

/// `GET /auth/me`: Profile of the token's owner.
///
/// # Errors
///
/// Returns [`TradeHubError::Unauthorized`] without a valid token.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Auth",
    summary = "Current user",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's profile", body = UserDto),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<impl IntoResponse, TradeHubError> {
    let user = state.auth_service.me(&principal).await?;
    Ok(Json(UserDto::from(user)))
}

/// Authentication routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register/user", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
}
