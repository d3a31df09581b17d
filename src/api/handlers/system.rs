//! Liveness probe for load balancers and orchestrators.
//!
//! Unauthenticated and mounted outside `/api/v1` so probes keep working
//! across API versions.

use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Liveness report.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `healthy` when the process answers.
    #[schema(example = "healthy")]
    status: &'static str,
    /// Service name.
    #[schema(example = "tradehub")]
    service: &'static str,
    /// Crate version of the running binary.
    version: &'static str,
    /// Server time of the response.
    timestamp: DateTime<Utc>,
}

/// `GET /health`: report that the marketplace API is up.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Reports that the TradeHub API process is serving requests. \
                   Does not touch the database.",
    responses(
        (status = 200, description = "The API is serving", body = HealthResponse),
    )
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now(),
    })
}

/// Routes mounted at the root, outside `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}
