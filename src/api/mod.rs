//! REST API layer: route handlers, DTOs, extractors and the OpenAPI
//! document.
//!
//! All resource endpoints are mounted under `/api/v1`; `/health` sits at
//! the root.

pub mod dto;
pub mod extract;
pub mod handlers;

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::app_state::AppState;
use crate::domain::{Availability, ItemCondition, Role, TradeStatus};
use crate::error::{ErrorBody, ErrorResponse};

/// OpenAPI document covering every endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "TradeHub API", description = "Peer-to-peer item trading marketplace"),
    paths(
        handlers::system::health_handler,
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::me,
        handlers::item::create_item,
        handlers::item::list_items,
        handlers::item::get_item,
        handlers::item::update_item,
        handlers::item::patch_item,
        handlers::item::delete_item,
        handlers::trade::create_trade,
        handlers::trade::list_trades,
        handlers::trade::list_user_trades,
        handlers::trade::get_trade,
        handlers::trade::update_trade,
        handlers::trade::confirm_trade,
        handlers::trade::delete_trade,
        handlers::offer::create_offer,
        handlers::offer::add_offer_item,
        handlers::offer::remove_offer_item,
        handlers::offer::get_offer,
        handlers::offer::delete_offer,
        handlers::offer::list_trade_offers,
        handlers::offer::list_received_offers,
        handlers::user::list_users,
        handlers::user::create_user,
        handlers::user::get_user,
        handlers::user::update_role,
        handlers::user::delete_user,
    ),
    components(schemas(
        ErrorResponse,
        ErrorBody,
        Role,
        ItemCondition,
        Availability,
        TradeStatus,
        handlers::system::HealthResponse,
        dto::RegisterRequest,
        dto::LoginRequest,
        dto::TokenResponse,
        dto::UserDto,
        dto::CreateUserRequest,
        dto::UpdateRoleRequest,
        dto::CreateItemRequest,
        dto::UpdateItemRequest,
        dto::PatchItemRequest,
        dto::ItemDto,
        dto::ItemListResponse,
        dto::PaginationMeta,
        dto::CreateTradeRequest,
        dto::ConfirmTradeRequest,
        dto::TradeDto,
        dto::OfferItemRequest,
        dto::CreateOfferRequest,
        dto::AddOfferItemRequest,
        dto::OfferItemDto,
        dto::OfferDto,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "System", description = "Health"),
        (name = "Auth", description = "Registration and login"),
        (name = "Items", description = "Item listings"),
        (name = "Trades", description = "Trade proposals and confirmation"),
        (name = "Offers", description = "Offers on trades"),
        (name = "Admin", description = "User management"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` security scheme referenced by handlers.
#[derive(Debug)]
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
        .merge(docs_router())
}

/// Requests still running after this long are answered with 408.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds the full application: API routes, request tracing, timeout,
/// CORS and state.
pub fn build_app(state: AppState) -> Router {
    build_router()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    REQUEST_TIMEOUT,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

#[cfg(feature = "swagger-ui")]
fn docs_router() -> Router<AppState> {
    Router::new().merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
}

#[cfg(not(feature = "swagger-ui"))]
fn docs_router() -> Router<AppState> {
    use axum::Json;
    use axum::routing::get;

    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/v1/auth/login",
            "/api/v1/items/{id}",
            "/api/v1/trades/{id}/confirm",
            "/api/v1/offers/{offerId}/items/{itemId}",
            "/api/v1/admin/users/{id}/role",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let has_bearer = doc
            .components
            .as_ref()
            .is_some_and(|c| c.security_schemes.contains_key("bearer_auth"));
        assert!(has_bearer);
    }
}
