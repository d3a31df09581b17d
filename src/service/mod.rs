//! Service layer: business logic orchestration.
//!
//! Each service owns `Arc<dyn …Repository>` handles and enforces the rules
//! a store cannot: ownership, role permissions, participant checks and the
//! two-party confirmation of [`TradeService`]. Handlers call services and
//! never touch repositories.

pub mod auth_service;
pub mod item_service;
pub mod offer_service;
pub mod trade_service;
pub mod user_service;

#[cfg(test)]
pub(crate) mod testing;

pub use auth_service::{AuthService, NewAccount};
pub use item_service::ItemService;
pub use offer_service::OfferService;
pub use trade_service::TradeService;
pub use user_service::UserService;
