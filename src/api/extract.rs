//! Request extractors.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::app_state::AppState;
use crate::auth::Principal;
use crate::error::TradeHubError;

/// The authenticated caller, taken from `Authorization: Bearer <jwt>`.
///
/// Handlers that take an `AuthUser` reject unauthenticated requests with
/// 401 before their body runs.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = TradeHubError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| TradeHubError::Unauthorized("missing bearer token".to_string()))?;
        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                TradeHubError::Unauthorized("malformed authorization header".to_string())
            })?;
        state.auth_service.authenticate(token).await.map(Self)
    }
}
