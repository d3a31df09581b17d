//! REST endpoint handlers organized by resource.

pub mod auth;
pub mod item;
pub mod offer;
pub mod system;
pub mod trade;
pub mod user;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::routes())
        .merge(item::routes())
        .merge(trade::routes())
        .merge(offer::routes())
        .merge(user::routes())
}
