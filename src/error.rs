//! Service error types with HTTP status code mapping.
//!
//! [`TradeHubError`] is the central error type for services and handlers.
//! Each variant maps to a specific HTTP status code and structured JSON
//! error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::persistence::RepositoryError;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2003,
///     "message": "item 7 was modified concurrently",
///     "details": "reload the resource and retry with its current version"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`TradeHubError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category           | HTTP Status                   |
/// |-----------|--------------------|-------------------------------|
/// | 1000–1999 | Validation         | 400 Bad Request               |
/// | 2000–2999 | State/Not Found    | 404 Not Found / 409 Conflict  |
/// | 3000–3999 | Server             | 500 Internal Server Error     |
/// | 5000–5999 | Authentication     | 401 Unauthorized / 403 Forbidden |
#[derive(Debug, thiserror::Error)]
pub enum TradeHubError {
    /// Malformed or out-of-range input.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Entity with the given id does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind, e.g. `"item"`.
        entity: &'static str,
        /// Identifier as text.
        id: String,
    },

    /// Business rule violation or duplicate.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Concurrency token mismatch; the caller should reload and retry.
    #[error("{entity} {id} was modified concurrently")]
    ConcurrencyConflict {
        /// Entity kind.
        entity: &'static str,
        /// Identifier as text.
        id: String,
    },

    /// Missing or invalid credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not permitted.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TradeHubError {
    /// Shorthand for [`TradeHubError::NotFound`].
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1001,
            Self::NotFound { .. } => 2001,
            Self::Conflict(_) => 2002,
            Self::ConcurrencyConflict { .. } => 2003,
            Self::Internal(_) => 3000,
            Self::Persistence(_) => 3001,
            Self::Unauthorized(_) => 5001,
            Self::Forbidden(_) => 5002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict(_) | Self::ConcurrencyConflict { .. } => StatusCode::CONFLICT,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Persistence(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns `true` if the caller may succeed by re-reading and retrying.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrencyConflict { .. })
    }
}

impl From<RepositoryError> for TradeHubError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity_type, id } => Self::NotFound {
                entity: entity_type,
                id,
            },
            RepositoryError::VersionConflict { entity_type, id } => Self::ConcurrencyConflict {
                entity: entity_type,
                id,
            },
            RepositoryError::Duplicate { .. } | RepositoryError::Constraint { .. } => {
                Self::Conflict(err.to_string())
            }
            RepositoryError::Connection(_)
            | RepositoryError::Query(_)
            | RepositoryError::Serialization(_) => Self::Persistence(err.to_string()),
        }
    }
}

impl IntoResponse for TradeHubError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (message, details) = if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
            ("internal server error".to_string(), None)
        } else if self.is_retryable() {
            (
                self.to_string(),
                Some("reload the resource and retry with its current version".to_string()),
            )
        } else {
            (self.to_string(), None)
        };
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message,
                details,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        let cases = [
            (TradeHubError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (TradeHubError::not_found("item", 7), StatusCode::NOT_FOUND),
            (TradeHubError::Conflict("x".into()), StatusCode::CONFLICT),
            (
                TradeHubError::ConcurrencyConflict {
                    entity: "item",
                    id: "7".into(),
                },
                StatusCode::CONFLICT,
            ),
            (TradeHubError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (TradeHubError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (
                TradeHubError::Persistence("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                TradeHubError::Internal("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code(), status, "{err}");
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn repository_errors_translate() {
        let conflict: TradeHubError = RepositoryError::version_conflict("item", "7").into();
        assert!(conflict.is_retryable());

        let missing: TradeHubError = RepositoryError::not_found("trade", "1").into();
        assert!(matches!(missing, TradeHubError::NotFound { entity: "trade", .. }));

        let in_use: TradeHubError =
            RepositoryError::constraint("item", "referenced by an offer").into();
        assert_eq!(in_use.status_code(), StatusCode::CONFLICT);

        let broken: TradeHubError = RepositoryError::query("syntax error").into();
        assert_eq!(broken.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn server_errors_hide_details() {
        let response = TradeHubError::Persistence("password=hunter2".into()).into_response();
        let Ok(bytes) = axum::body::to_bytes(response.into_body(), 4096).await else {
            panic!("body should be readable");
        };
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("internal server error"));
        assert!(!text.contains("hunter2"));
    }
}
