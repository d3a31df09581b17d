//! In-memory implementation of every repository trait.
//!
//! All tables live behind one [`tokio::sync::RwLock`], so each write
//! (including its version compare-and-set and referential checks) is
//! atomic with respect to every other write. Suitable for unit tests and
//! for running the service without a database.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::traits::{
    ItemRepository, OfferRepository, RepositoryError, RepositoryResult, TradeRepository,
    UserRepository,
};
use crate::domain::{
    Availability, Item, ItemDetails, ItemFilter, ItemId, NewOffer, NewTrade, NewUser, Offer,
    OfferId, OfferItem, Role, Trade, TradeId, User, UserId, Version,
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    items: BTreeMap<ItemId, Item>,
    trades: BTreeMap<TradeId, Trade>,
    offers: BTreeMap<OfferId, Offer>,
    last_user_id: i64,
    last_item_id: i64,
    last_trade_id: i64,
    last_offer_id: i64,
}

impl Tables {
    fn item_in_any_offer(&self, item_id: ItemId) -> bool {
        self.offers.values().any(|offer| offer.contains(item_id))
    }

    /// Rejects writes to offers on a missing or completed trade.
    fn ensure_trade_open(&self, trade_id: TradeId) -> RepositoryResult<()> {
        match self.trades.get(&trade_id) {
            None => Err(RepositoryError::constraint(
                "offer",
                format!("trade {trade_id} does not exist"),
            )),
            Some(trade) if trade.is_completed() => Err(RepositoryError::constraint(
                "offer",
                format!("trade {trade_id} is completed"),
            )),
            Some(_) => Ok(()),
        }
    }

    /// The item must exist, belong to `proposer` and be available.
    fn ensure_offerable(&self, item_id: ItemId, proposer: UserId) -> RepositoryResult<()> {
        let Some(item) = self.items.get(&item_id) else {
            return Err(RepositoryError::constraint(
                "offer item",
                format!("item {item_id} does not exist"),
            ));
        };
        if item.owner_id != proposer {
            return Err(RepositoryError::constraint(
                "offer item",
                format!("item {item_id} is not owned by user {proposer}"),
            ));
        }
        if item.details.availability != Availability::Available {
            return Err(RepositoryError::constraint(
                "offer item",
                format!("item {item_id} is not available"),
            ));
        }
        Ok(())
    }
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

/// Store backed by ordered maps under a single lock.
///
/// Cloning is cheap and every clone shares the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, user: NewUser) -> RepositoryResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(RepositoryError::duplicate(
                "user",
                format!("username {} is taken", user.username),
            ));
        }
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::duplicate(
                "user",
                format!("email {} is taken", user.email),
            ));
        }
        let id = UserId::new(next_id(&mut tables.last_user_id));
        let stored = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        tables.users.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: UserId) -> RepositoryResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> RepositoryResult<Vec<User>> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn update_role(&self, id: UserId, role: Role) -> RepositoryResult<User> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found("user", id.to_string()))?;
        user.role = role;
        Ok(user.clone())
    }

    async fn delete(&self, id: UserId) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&id) {
            return Err(RepositoryError::not_found("user", id.to_string()));
        }
        if tables.trades.values().any(|t| t.involves(id)) {
            return Err(RepositoryError::constraint(
                "user",
                format!("user {id} still takes part in trades"),
            ));
        }
        if tables.offers.values().any(|o| o.user_id == id) {
            return Err(RepositoryError::constraint(
                "user",
                format!("user {id} still has offers"),
            ));
        }
        let owned: Vec<ItemId> = tables
            .items
            .values()
            .filter(|item| item.owner_id == id)
            .map(|item| item.id)
            .collect();
        if let Some(item_id) = owned.iter().find(|&&item_id| tables.item_in_any_offer(item_id)) {
            return Err(RepositoryError::constraint(
                "user",
                format!("item {item_id} of user {id} is referenced by an offer"),
            ));
        }
        for item_id in owned {
            tables.items.remove(&item_id);
        }
        tables.users.remove(&id);
        Ok(())
    }

    async fn count(&self) -> RepositoryResult<u64> {
        Ok(self.tables.read().await.users.len() as u64)
    }
}

#[async_trait]
impl ItemRepository for InMemoryStore {
    async fn insert(&self, owner_id: UserId, details: ItemDetails) -> RepositoryResult<Item> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&owner_id) {
            return Err(RepositoryError::constraint(
                "item",
                format!("owner {owner_id} does not exist"),
            ));
        }
        let id = ItemId::new(next_id(&mut tables.last_item_id));
        let now = Utc::now();
        let item = Item {
            id,
            owner_id,
            details,
            version: Version::next(),
            created_at: now,
            updated_at: now,
        };
        tables.items.insert(id, item.clone());
        Ok(item)
    }

    async fn get(&self, id: ItemId) -> RepositoryResult<Option<Item>> {
        Ok(self.tables.read().await.items.get(&id).cloned())
    }

    async fn list(&self, filter: &ItemFilter) -> RepositoryResult<Vec<Item>> {
        let tables = self.tables.read().await;
        Ok(tables
            .items
            .values()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        id: ItemId,
        details: ItemDetails,
        expected: Version,
    ) -> RepositoryResult<Item> {
        let mut tables = self.tables.write().await;
        let item = tables
            .items
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found("item", id.to_string()))?;
        if item.version != expected {
            return Err(RepositoryError::version_conflict("item", id.to_string()));
        }
        item.details = details;
        item.version = Version::next();
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    async fn delete(&self, id: ItemId, expected: Version) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        let item = tables
            .items
            .get(&id)
            .ok_or_else(|| RepositoryError::not_found("item", id.to_string()))?;
        if item.version != expected {
            return Err(RepositoryError::version_conflict("item", id.to_string()));
        }
        if tables.item_in_any_offer(id) {
            return Err(RepositoryError::constraint(
                "item",
                format!("item {id} is referenced by an offer"),
            ));
        }
        tables.items.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl TradeRepository for InMemoryStore {
    async fn insert(&self, trade: NewTrade) -> RepositoryResult<Trade> {
        let mut tables = self.tables.write().await;
        for user_id in [trade.initiator_id, trade.receiver_id] {
            if !tables.users.contains_key(&user_id) {
                return Err(RepositoryError::constraint(
                    "trade",
                    format!("user {user_id} does not exist"),
                ));
            }
        }
        let id = TradeId::new(next_id(&mut tables.last_trade_id));
        let stored = Trade {
            id,
            created_at: Utc::now(),
            initiator_id: trade.initiator_id,
            receiver_id: trade.receiver_id,
            initiator_confirmed: false,
            receiver_confirmed: false,
            version: Version::next(),
        };
        tables.trades.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: TradeId) -> RepositoryResult<Option<Trade>> {
        Ok(self.tables.read().await.trades.get(&id).cloned())
    }

    async fn list(&self) -> RepositoryResult<Vec<Trade>> {
        Ok(self.tables.read().await.trades.values().cloned().collect())
    }

    async fn list_for_user(&self, user_id: UserId) -> RepositoryResult<Vec<Trade>> {
        let tables = self.tables.read().await;
        Ok(tables
            .trades
            .values()
            .filter(|t| t.involves(user_id))
            .cloned()
            .collect())
    }

    async fn update_confirmation(&self, trade: &Trade) -> RepositoryResult<Trade> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .trades
            .get_mut(&trade.id)
            .ok_or_else(|| RepositoryError::not_found("trade", trade.id.to_string()))?;
        if stored.version != trade.version {
            return Err(RepositoryError::version_conflict(
                "trade",
                trade.id.to_string(),
            ));
        }
        stored.initiator_confirmed = trade.initiator_confirmed;
        stored.receiver_confirmed = trade.receiver_confirmed;
        stored.version = Version::next();
        Ok(stored.clone())
    }

    async fn delete(&self, id: TradeId, expected: Version) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        let trade = tables
            .trades
            .get(&id)
            .ok_or_else(|| RepositoryError::not_found("trade", id.to_string()))?;
        if trade.version != expected {
            return Err(RepositoryError::version_conflict("trade", id.to_string()));
        }
        tables.offers.retain(|_, offer| offer.trade_id != id);
        tables.trades.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl OfferRepository for InMemoryStore {
    async fn insert(&self, offer: NewOffer) -> RepositoryResult<Offer> {
        let mut tables = self.tables.write().await;
        tables.ensure_trade_open(offer.trade_id)?;
        if !tables.users.contains_key(&offer.user_id) {
            return Err(RepositoryError::constraint(
                "offer",
                format!("user {} does not exist", offer.user_id),
            ));
        }
        for line in &offer.items {
            tables.ensure_offerable(line.item_id, offer.user_id)?;
        }
        let id = OfferId::new(next_id(&mut tables.last_offer_id));
        let mut items = offer.items;
        items.sort_by_key(|line| line.item_id);
        let stored = Offer {
            id,
            user_id: offer.user_id,
            trade_id: offer.trade_id,
            created_at: Utc::now(),
            version: Version::next(),
            items,
        };
        tables.offers.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: OfferId) -> RepositoryResult<Option<Offer>> {
        Ok(self.tables.read().await.offers.get(&id).cloned())
    }

    async fn list_by_trade(&self, trade_id: TradeId) -> RepositoryResult<Vec<Offer>> {
        let tables = self.tables.read().await;
        Ok(tables
            .offers
            .values()
            .filter(|o| o.trade_id == trade_id)
            .cloned()
            .collect())
    }

    async fn list_received(&self, user_id: UserId) -> RepositoryResult<Vec<Offer>> {
        let tables = self.tables.read().await;
        Ok(tables
            .offers
            .values()
            .filter(|o| o.user_id != user_id)
            .filter(|o| {
                tables
                    .trades
                    .get(&o.trade_id)
                    .is_some_and(|t| t.involves(user_id))
            })
            .cloned()
            .collect())
    }

    async fn add_item(
        &self,
        id: OfferId,
        line: OfferItem,
        expected: Version,
    ) -> RepositoryResult<Offer> {
        let mut tables = self.tables.write().await;
        let (trade_id, proposer) = tables
            .offers
            .get(&id)
            .map(|offer| (offer.trade_id, offer.user_id))
            .ok_or_else(|| RepositoryError::not_found("offer", id.to_string()))?;
        tables.ensure_trade_open(trade_id)?;
        tables.ensure_offerable(line.item_id, proposer)?;
        let offer = tables
            .offers
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found("offer", id.to_string()))?;
        if offer.version != expected {
            return Err(RepositoryError::version_conflict("offer", id.to_string()));
        }
        if offer.contains(line.item_id) {
            return Err(RepositoryError::duplicate(
                "offer item",
                format!("item {} is already in offer {id}", line.item_id),
            ));
        }
        offer.items.push(line);
        offer.items.sort_by_key(|l| l.item_id);
        offer.version = Version::next();
        Ok(offer.clone())
    }

    async fn remove_item(
        &self,
        id: OfferId,
        item_id: ItemId,
        expected: Version,
    ) -> RepositoryResult<Offer> {
        let mut tables = self.tables.write().await;
        let trade_id = tables
            .offers
            .get(&id)
            .map(|offer| offer.trade_id)
            .ok_or_else(|| RepositoryError::not_found("offer", id.to_string()))?;
        tables.ensure_trade_open(trade_id)?;
        let offer = tables
            .offers
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found("offer", id.to_string()))?;
        if offer.version != expected {
            return Err(RepositoryError::version_conflict("offer", id.to_string()));
        }
        if !offer.contains(item_id) {
            return Err(RepositoryError::not_found(
                "offer item",
                format!("{id}/{item_id}"),
            ));
        }
        offer.items.retain(|l| l.item_id != item_id);
        offer.version = Version::next();
        Ok(offer.clone())
    }

    async fn delete(&self, id: OfferId, expected: Version) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        let offer = tables
            .offers
            .get(&id)
            .ok_or_else(|| RepositoryError::not_found("offer", id.to_string()))?;
        if offer.version != expected {
            return Err(RepositoryError::version_conflict("offer", id.to_string()));
        }
        tables.ensure_trade_open(offer.trade_id)?;
        tables.offers.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::ItemCondition;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            username: name.to_string(),
            email: format!("{name}@example.com"),
            password_hash: "$argon2id$stub".to_string(),
            role: Role::User,
        }
    }

    fn details(name: &str) -> ItemDetails {
        ItemDetails {
            name: name.to_string(),
            description: String::new(),
            value: Decimal::new(10, 0),
            tags: vec!["misc".to_string()],
            condition: ItemCondition::New,
            availability: Availability::Available,
        }
    }

    async fn user(store: &InMemoryStore, name: &str) -> User {
        let Ok(user) = UserRepository::insert(store, new_user(name)).await else {
            panic!("user insert failed");
        };
        user
    }

    async fn item(store: &InMemoryStore, owner: UserId, name: &str) -> Item {
        let Ok(item) = ItemRepository::insert(store, owner, details(name)).await else {
            panic!("item insert failed");
        };
        item
    }

    async fn trade(store: &InMemoryStore, a: UserId, b: UserId) -> Trade {
        let Ok(new_trade) = NewTrade::new(a, b) else {
            panic!("valid trade");
        };
        let Ok(trade) = TradeRepository::insert(store, new_trade).await else {
            panic!("trade insert failed");
        };
        trade
    }

    #[tokio::test]
    async fn ids_are_sequential() {
        let store = InMemoryStore::new();
        let a = user(&store, "alice").await;
        let b = user(&store, "bob").await;
        assert_eq!(a.id.get(), 1);
        assert_eq!(b.id.get(), 2);
    }

    #[tokio::test]
    async fn duplicate_username_and_email_rejected() {
        let store = InMemoryStore::new();
        let _ = user(&store, "alice").await;

        let same_name = UserRepository::insert(&store, new_user("alice")).await;
        assert!(matches!(same_name, Err(RepositoryError::Duplicate { .. })));

        let mut other = new_user("alice2");
        other.email = "alice@example.com".to_string();
        let same_email = UserRepository::insert(&store, other).await;
        assert!(matches!(same_email, Err(RepositoryError::Duplicate { .. })));
    }

    #[tokio::test]
    async fn item_update_rotates_version_and_rejects_stale() {
        let store = InMemoryStore::new();
        let owner = user(&store, "alice").await;
        let created = item(&store, owner.id, "lamp").await;
        let t1 = created.version;

        let Ok(updated) = ItemRepository::update(&store, created.id, details("desk lamp"), t1).await
        else {
            panic!("first update should succeed");
        };
        let t2 = updated.version;
        assert_ne!(t1, t2);
        assert_eq!(updated.details.name, "desk lamp");

        let stale = ItemRepository::update(&store, created.id, details("floor lamp"), t1).await;
        assert!(matches!(stale, Err(RepositoryError::VersionConflict { .. })));

        let Ok(Some(current)) = ItemRepository::get(&store, created.id).await else {
            panic!("item should exist");
        };
        assert_eq!(current.details.name, "desk lamp");
        assert_eq!(current.version, t2);
    }

    #[tokio::test]
    async fn concurrent_updates_from_same_version_have_one_winner() {
        let store = InMemoryStore::new();
        let owner = user(&store, "alice").await;
        let created = item(&store, owner.id, "lamp").await;

        let (first, second) = tokio::join!(
            ItemRepository::update(&store, created.id, details("one"), created.version),
            ItemRepository::update(&store, created.id, details("two"), created.version),
        );
        let outcomes = [first.is_ok(), second.is_ok()];
        assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
        let loser = if first.is_err() { first } else { second };
        assert!(matches!(loser, Err(RepositoryError::VersionConflict { .. })));
    }

    #[tokio::test]
    async fn item_in_offer_cannot_be_deleted_until_offer_removed() {
        let store = InMemoryStore::new();
        let a = user(&store, "alice").await;
        let b = user(&store, "bob").await;
        let lamp = item(&store, a.id, "lamp").await;
        let t = trade(&store, a.id, b.id).await;

        let Ok(line) = OfferItem::new(lamp.id, 1, None) else {
            panic!("valid line");
        };
        let Ok(new_offer) = NewOffer::new(a.id, t.id, vec![line]) else {
            panic!("valid offer");
        };
        let Ok(offer) = OfferRepository::insert(&store, new_offer).await else {
            panic!("offer insert failed");
        };

        let blocked = ItemRepository::delete(&store, lamp.id, lamp.version).await;
        assert!(matches!(blocked, Err(RepositoryError::Constraint { .. })));

        assert!(OfferRepository::delete(&store, offer.id, offer.version).await.is_ok());
        let Ok(None) = OfferRepository::get(&store, offer.id).await else {
            panic!("offer and its items should be gone");
        };
        assert!(ItemRepository::delete(&store, lamp.id, lamp.version).await.is_ok());
    }

    #[tokio::test]
    async fn offer_items_version_guarded_and_unique() {
        let store = InMemoryStore::new();
        let a = user(&store, "alice").await;
        let b = user(&store, "bob").await;
        let lamp = item(&store, a.id, "lamp").await;
        let t = trade(&store, a.id, b.id).await;
        let Ok(new_offer) = NewOffer::new(a.id, t.id, Vec::new()) else {
            panic!("valid offer");
        };
        let Ok(offer) = OfferRepository::insert(&store, new_offer).await else {
            panic!("offer insert failed");
        };

        let Ok(line) = OfferItem::new(lamp.id, 1, None) else {
            panic!("valid line");
        };
        let Ok(with_lamp) =
            OfferRepository::add_item(&store, offer.id, line.clone(), offer.version).await
        else {
            panic!("add should succeed");
        };
        assert_eq!(with_lamp.items.len(), 1);
        assert_ne!(with_lamp.version, offer.version);

        let stale = OfferRepository::add_item(&store, offer.id, line.clone(), offer.version).await;
        assert!(matches!(stale, Err(RepositoryError::VersionConflict { .. })));

        let dup = OfferRepository::add_item(&store, offer.id, line, with_lamp.version).await;
        assert!(matches!(dup, Err(RepositoryError::Duplicate { .. })));

        let Ok(emptied) =
            OfferRepository::remove_item(&store, offer.id, lamp.id, with_lamp.version).await
        else {
            panic!("remove should succeed");
        };
        assert!(emptied.items.is_empty());
    }

    #[tokio::test]
    async fn offer_writes_recheck_trade_and_items() {
        let store = InMemoryStore::new();
        let a = user(&store, "alice").await;
        let b = user(&store, "bob").await;
        let lamp = item(&store, a.id, "lamp").await;
        let rug = item(&store, b.id, "rug").await;
        let t = trade(&store, a.id, b.id).await;
        let Ok(new_offer) = NewOffer::new(a.id, t.id, Vec::new()) else {
            panic!("valid offer");
        };
        let Ok(offer) = OfferRepository::insert(&store, new_offer).await else {
            panic!("offer insert failed");
        };

        let Ok(foreign) = OfferItem::new(rug.id, 1, None) else {
            panic!("valid line");
        };
        let rejected = OfferRepository::add_item(&store, offer.id, foreign, offer.version).await;
        assert!(matches!(rejected, Err(RepositoryError::Constraint { .. })));

        let mut hidden = details("lamp");
        hidden.availability = Availability::Unavailable;
        let Ok(_) = ItemRepository::update(&store, lamp.id, hidden, lamp.version).await else {
            panic!("item update failed");
        };
        let Ok(lamp_line) = OfferItem::new(lamp.id, 1, None) else {
            panic!("valid line");
        };
        let rejected =
            OfferRepository::add_item(&store, offer.id, lamp_line.clone(), offer.version).await;
        assert!(matches!(rejected, Err(RepositoryError::Constraint { .. })));

        let mut confirmed = t.clone();
        confirmed.initiator_confirmed = true;
        confirmed.receiver_confirmed = true;
        let Ok(done) = TradeRepository::update_confirmation(&store, &confirmed).await else {
            panic!("confirmation failed");
        };
        assert!(done.is_completed());

        let Ok(late) = NewOffer::new(b.id, t.id, Vec::new()) else {
            panic!("valid offer");
        };
        assert!(matches!(
            OfferRepository::insert(&store, late).await,
            Err(RepositoryError::Constraint { .. })
        ));
        assert!(matches!(
            OfferRepository::delete(&store, offer.id, offer.version).await,
            Err(RepositoryError::Constraint { .. })
        ));
    }

    #[tokio::test]
    async fn trade_delete_cascades_offers() {
        let store = InMemoryStore::new();
        let a = user(&store, "alice").await;
        let b = user(&store, "bob").await;
        let t = trade(&store, a.id, b.id).await;
        let Ok(new_offer) = NewOffer::new(b.id, t.id, Vec::new()) else {
            panic!("valid offer");
        };
        let Ok(offer) = OfferRepository::insert(&store, new_offer).await else {
            panic!("offer insert failed");
        };

        assert!(TradeRepository::delete(&store, t.id, t.version).await.is_ok());
        let Ok(None) = OfferRepository::get(&store, offer.id).await else {
            panic!("offer should be cascaded");
        };
    }

    #[tokio::test]
    async fn received_offers_exclude_own() {
        let store = InMemoryStore::new();
        let a = user(&store, "alice").await;
        let b = user(&store, "bob").await;
        let t = trade(&store, a.id, b.id).await;
        for proposer in [a.id, b.id] {
            let Ok(new_offer) = NewOffer::new(proposer, t.id, Vec::new()) else {
                panic!("valid offer");
            };
            let _ = OfferRepository::insert(&store, new_offer).await;
        }

        let Ok(received) = OfferRepository::list_received(&store, a.id).await else {
            panic!("list failed");
        };
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].user_id, b.id);
    }

    #[tokio::test]
    async fn user_delete_blocked_while_trading() {
        let store = InMemoryStore::new();
        let a = user(&store, "alice").await;
        let b = user(&store, "bob").await;
        let c = user(&store, "carol").await;
        let _ = item(&store, c.id, "chair").await;
        let _ = trade(&store, a.id, b.id).await;

        let blocked = UserRepository::delete(&store, a.id).await;
        assert!(matches!(blocked, Err(RepositoryError::Constraint { .. })));

        assert!(UserRepository::delete(&store, c.id).await.is_ok());
        let Ok(items) = ItemRepository::list(&store, &ItemFilter::default()).await else {
            panic!("list failed");
        };
        assert!(items.is_empty());
    }
}
