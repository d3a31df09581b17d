//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::auth::JwtKeys;
use crate::persistence::{ItemRepository, OfferRepository, TradeRepository, UserRepository};
use crate::service::{AuthService, ItemService, OfferService, TradeService, UserService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Registration, login and token verification.
    pub auth_service: Arc<AuthService>,
    /// Admin user management.
    pub user_service: Arc<UserService>,
    /// Item listing and edits.
    pub item_service: Arc<ItemService>,
    /// Trade proposals and confirmation.
    pub trade_service: Arc<TradeService>,
    /// Offers on trades.
    pub offer_service: Arc<OfferService>,
}

impl AppState {
    /// Wires every service to one store implementing all repositories.
    #[must_use]
    pub fn new<S>(store: S, keys: JwtKeys) -> Self
    where
        S: UserRepository + ItemRepository + TradeRepository + OfferRepository + 'static,
    {
        let store = Arc::new(store);
        let users: Arc<dyn UserRepository> = Arc::clone(&store) as Arc<dyn UserRepository>;
        let items: Arc<dyn ItemRepository> = Arc::clone(&store) as Arc<dyn ItemRepository>;
        let trades: Arc<dyn TradeRepository> = Arc::clone(&store) as Arc<dyn TradeRepository>;
        let offers: Arc<dyn OfferRepository> = store;

        Self {
            auth_service: Arc::new(AuthService::new(Arc::clone(&users), Arc::new(keys))),
            user_service: Arc::new(UserService::new(Arc::clone(&users))),
            item_service: Arc::new(ItemService::new(Arc::clone(&items))),
            trade_service: Arc::new(TradeService::new(Arc::clone(&trades), users)),
            offer_service: Arc::new(OfferService::new(offers, trades, items)),
        }
    }
}
