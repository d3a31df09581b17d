//! Offers: bundles of items a participant puts on a trade.

use std::sync::Arc;

use super::trade_service::ensure_visible;
use crate::auth::Principal;
use crate::domain::{
    Availability, ItemId, NewOffer, Offer, OfferId, OfferItem, Permission, Trade, TradeId, UserId,
    Version,
};
use crate::error::TradeHubError;
use crate::persistence::{ItemRepository, OfferRepository, TradeRepository};

/// Offer operations.
///
/// Only trade participants propose offers, only the proposer edits one,
/// and nothing on a completed trade changes.
#[derive(Debug, Clone)]
pub struct OfferService {
    offers: Arc<dyn OfferRepository>,
    trades: Arc<dyn TradeRepository>,
    items: Arc<dyn ItemRepository>,
}

impl OfferService {
    /// Creates a new `OfferService`.
    #[must_use]
    pub fn new(
        offers: Arc<dyn OfferRepository>,
        trades: Arc<dyn TradeRepository>,
        items: Arc<dyn ItemRepository>,
    ) -> Self {
        Self {
            offers,
            trades,
            items,
        }
    }

    /// Creates an offer on `trade_id`, optionally with initial items.
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::NotFound`] for a missing trade or item,
    /// [`TradeHubError::Forbidden`] for non-participants or foreign items,
    /// [`TradeHubError::Validation`] for duplicates and
    /// [`TradeHubError::Conflict`] for a completed trade or an unavailable
    /// item.
    pub async fn create(
        &self,
        actor: &Principal,
        trade_id: TradeId,
        lines: Vec<OfferItem>,
    ) -> Result<Offer, TradeHubError> {
        let trade = self.open_trade(trade_id).await?;
        if !trade.involves(actor.user_id) {
            return Err(TradeHubError::Forbidden(format!(
                "only participants of trade {trade_id} can make offers"
            )));
        }
        let new_offer = NewOffer::new(actor.user_id, trade_id, lines)?;
        for line in &new_offer.items {
            self.ensure_offerable(actor.user_id, line.item_id).await?;
        }
        let offer = self.offers.insert(new_offer).await?;
        tracing::info!(
            offer_id = %offer.id,
            trade_id = %trade_id,
            items = offer.items.len(),
            "offer created"
        );
        Ok(offer)
    }

    /// Adds a line item to an offer.
    ///
    /// # Errors
    ///
    /// As [`OfferService::create`], plus [`TradeHubError::Conflict`] if
    /// the item is already in the offer and
    /// [`TradeHubError::ConcurrencyConflict`] if `expected` is stale.
    pub async fn add_item(
        &self,
        actor: &Principal,
        offer_id: OfferId,
        line: OfferItem,
        expected: Version,
    ) -> Result<Offer, TradeHubError> {
        let offer = self.editable(actor, offer_id, expected).await?;
        if offer.contains(line.item_id) {
            return Err(TradeHubError::Conflict(format!(
                "item {} is already in offer {offer_id}",
                line.item_id
            )));
        }
        self.ensure_offerable(offer.user_id, line.item_id).await?;
        let item_id = line.item_id;
        let offer = self.offers.add_item(offer_id, line, expected).await?;
        tracing::info!(%offer_id, %item_id, "item added to offer");
        Ok(offer)
    }

    /// Removes a line item from an offer.
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::NotFound`], [`TradeHubError::Forbidden`],
    /// [`TradeHubError::Conflict`] for a completed trade or
    /// [`TradeHubError::ConcurrencyConflict`].
    pub async fn remove_item(
        &self,
        actor: &Principal,
        offer_id: OfferId,
        item_id: ItemId,
        expected: Version,
    ) -> Result<Offer, TradeHubError> {
        let offer = self.editable(actor, offer_id, expected).await?;
        if !offer.contains(item_id) {
            return Err(TradeHubError::not_found(
                "offer item",
                format!("{offer_id}/{item_id}"),
            ));
        }
        let offer = self.offers.remove_item(offer_id, item_id, expected).await?;
        tracing::info!(%offer_id, %item_id, "item removed from offer");
        Ok(offer)
    }

    /// Gets an offer visible to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::NotFound`] or [`TradeHubError::Forbidden`].
    pub async fn get(&self, actor: &Principal, offer_id: OfferId) -> Result<Offer, TradeHubError> {
        let offer = self.load(offer_id).await?;
        let trade = self.load_trade(offer.trade_id).await?;
        ensure_visible(actor, &trade)?;
        Ok(offer)
    }

    /// Deletes an offer and its line items.
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::NotFound`], [`TradeHubError::Forbidden`]
    /// unless the caller proposed it or holds
    /// [`Permission::ModerateListings`], [`TradeHubError::Conflict`] for a
    /// completed trade or [`TradeHubError::ConcurrencyConflict`].
    pub async fn delete(
        &self,
        actor: &Principal,
        offer_id: OfferId,
        expected: Version,
    ) -> Result<(), TradeHubError> {
        let offer = self.load(offer_id).await?;
        actor.require_self_or(offer.user_id, Permission::ModerateListings)?;
        self.open_trade(offer.trade_id).await?;
        self.offers.delete(offer_id, expected).await?;
        tracing::info!(%offer_id, actor = %actor.user_id, "offer deleted");
        Ok(())
    }

    /// Lists offers on a trade visible to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::NotFound`] or [`TradeHubError::Forbidden`].
    pub async fn list_by_trade(
        &self,
        actor: &Principal,
        trade_id: TradeId,
    ) -> Result<Vec<Offer>, TradeHubError> {
        let trade = self.load_trade(trade_id).await?;
        ensure_visible(actor, &trade)?;
        Ok(self.offers.list_by_trade(trade_id).await?)
    }

    /// Lists offers other users made on `user_id`'s trades.
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::Forbidden`] unless the caller is `user_id`
    /// or holds [`Permission::ViewAllTrades`].
    pub async fn list_received(
        &self,
        actor: &Principal,
        user_id: UserId,
    ) -> Result<Vec<Offer>, TradeHubError> {
        actor.require_self_or(user_id, Permission::ViewAllTrades)?;
        Ok(self.offers.list_received(user_id).await?)
    }

    async fn load(&self, id: OfferId) -> Result<Offer, TradeHubError> {
        self.offers
            .get(id)
            .await?
            .ok_or_else(|| TradeHubError::not_found("offer", id))
    }

    async fn load_trade(&self, id: TradeId) -> Result<Trade, TradeHubError> {
        self.trades
            .get(id)
            .await?
            .ok_or_else(|| TradeHubError::not_found("trade", id))
    }

    async fn open_trade(&self, id: TradeId) -> Result<Trade, TradeHubError> {
        let trade = self.load_trade(id).await?;
        if trade.is_completed() {
            return Err(TradeHubError::Conflict(format!(
                "trade {id} is completed; its offers are frozen"
            )));
        }
        Ok(trade)
    }

    /// Loads an offer the caller proposed, still at `expected`, on a trade
    /// still open.
    async fn editable(
        &self,
        actor: &Principal,
        id: OfferId,
        expected: Version,
    ) -> Result<Offer, TradeHubError> {
        let offer = self.load(id).await?;
        if offer.user_id != actor.user_id {
            return Err(TradeHubError::Forbidden(format!(
                "only the proposer can change offer {id}"
            )));
        }
        if offer.version != expected {
            tracing::warn!(offer_id = %id, "stale offer version");
            return Err(TradeHubError::ConcurrencyConflict {
                entity: "offer",
                id: id.to_string(),
            });
        }
        self.open_trade(offer.trade_id).await?;
        Ok(offer)
    }

    async fn ensure_offerable(
        &self,
        proposer: UserId,
        item_id: ItemId,
    ) -> Result<(), TradeHubError> {
        let item = self
            .items
            .get(item_id)
            .await?
            .ok_or_else(|| TradeHubError::not_found("item", item_id))?;
        if item.owner_id != proposer {
            return Err(TradeHubError::Forbidden(format!(
                "item {item_id} is not owned by the proposer"
            )));
        }
        if item.details.availability != Availability::Available {
            return Err(TradeHubError::Conflict(format!(
                "item {item_id} is not available"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Item, ItemDetails, ItemFilter, NewTrade, Role};
    use crate::persistence::{InMemoryStore, RepositoryResult};
    use crate::service::testing::{details, principal};
    use crate::service::{ItemService, TradeService};

    struct Fixture {
        offers: OfferService,
        items: ItemService,
        trades: TradeService,
        a: Principal,
        b: Principal,
        c: Principal,
        trade: Trade,
    }

    async fn fixture() -> Fixture {
        let store = InMemoryStore::new();
        let a = principal(&store, "alice", Role::User).await;
        let b = principal(&store, "bob", Role::User).await;
        let c = principal(&store, "carol", Role::User).await;
        let shared = Arc::new(store);
        let offers = OfferService::new(
            Arc::clone(&shared) as Arc<dyn OfferRepository>,
            Arc::clone(&shared) as Arc<dyn TradeRepository>,
            Arc::clone(&shared) as Arc<dyn ItemRepository>,
        );
        let items = ItemService::new(Arc::clone(&shared) as Arc<dyn ItemRepository>);
        let trades = TradeService::new(Arc::clone(&shared) as Arc<dyn TradeRepository>, shared);
        let Ok(trade) = trades.create(&a, b.user_id).await else {
            panic!("trade create failed");
        };
        Fixture {
            offers,
            items,
            trades,
            a,
            b,
            c,
            trade,
        }
    }

    async fn item(f: &Fixture, owner: &Principal, name: &str) -> Item {
        let Ok(item) = f.items.create(owner, details(name)).await else {
            panic!("item create failed");
        };
        item
    }

    fn line(item: &Item) -> OfferItem {
        let Ok(line) = OfferItem::new(item.id, 1, None) else {
            panic!("line invalid");
        };
        line
    }

    #[tokio::test]
    async fn participant_offers_own_items() {
        let f = fixture().await;
        let guitar = item(&f, &f.a, "guitar").await;
        let Ok(offer) = f.offers.create(&f.a, f.trade.id, vec![line(&guitar)]).await else {
            panic!("offer create failed");
        };
        assert_eq!(offer.items.len(), 1);

        let Ok(received) = f.offers.list_received(&f.b, f.b.user_id).await else {
            panic!("received listing failed");
        };
        assert_eq!(received.len(), 1);
        let Ok(mine) = f.offers.list_received(&f.a, f.a.user_id).await else {
            panic!("received listing failed");
        };
        assert!(mine.is_empty());
    }

    #[tokio::test]
    async fn outsiders_and_foreign_items_rejected() {
        let f = fixture().await;
        let bobs = item(&f, &f.b, "drum").await;

        assert!(matches!(
            f.offers.create(&f.c, f.trade.id, Vec::new()).await,
            Err(TradeHubError::Forbidden(_))
        ));
        assert!(matches!(
            f.offers.create(&f.a, f.trade.id, vec![line(&bobs)]).await,
            Err(TradeHubError::Forbidden(_))
        ));
        assert!(matches!(
            f.offers.get(&f.c, OfferId::new(1)).await,
            Err(TradeHubError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn add_and_remove_items_with_versions() {
        let f = fixture().await;
        let first = item(&f, &f.a, "book").await;
        let second = item(&f, &f.a, "pen").await;
        let Ok(offer) = f.offers.create(&f.a, f.trade.id, vec![line(&first)]).await else {
            panic!("offer create failed");
        };

        let dup = f.offers.add_item(&f.a, offer.id, line(&first), offer.version).await;
        assert!(matches!(dup, Err(TradeHubError::Conflict(_))));

        let Ok(grown) = f.offers.add_item(&f.a, offer.id, line(&second), offer.version).await else {
            panic!("add failed");
        };
        assert_eq!(grown.items.len(), 2);

        let stale = f
            .offers
            .remove_item(&f.a, offer.id, first.id, offer.version)
            .await;
        assert!(matches!(stale, Err(TradeHubError::ConcurrencyConflict { .. })));

        let Ok(shrunk) = f
            .offers
            .remove_item(&f.a, offer.id, first.id, grown.version)
            .await
        else {
            panic!("remove failed");
        };
        assert_eq!(shrunk.items.len(), 1);

        assert!(matches!(
            f.offers.add_item(&f.b, offer.id, line(&first), shrunk.version).await,
            Err(TradeHubError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn offered_item_survives_until_offer_deleted() {
        let f = fixture().await;
        let lamp = item(&f, &f.a, "lamp").await;
        let Ok(offer) = f.offers.create(&f.a, f.trade.id, vec![line(&lamp)]).await else {
            panic!("offer create failed");
        };

        assert!(matches!(
            f.items.delete(&f.a, lamp.id, lamp.version).await,
            Err(TradeHubError::Conflict(_))
        ));
        assert!(f.offers.delete(&f.a, offer.id, offer.version).await.is_ok());
        assert!(f.items.delete(&f.a, lamp.id, lamp.version).await.is_ok());
    }

    #[tokio::test]
    async fn completed_trade_freezes_offers() {
        let f = fixture().await;
        let Ok(offer) = f.offers.create(&f.b, f.trade.id, Vec::new()).await else {
            panic!("offer create failed");
        };
        let _ = f.trades.confirm(&f.a, f.trade.id).await;
        let _ = f.trades.confirm(&f.b, f.trade.id).await;

        assert!(matches!(
            f.offers.create(&f.a, f.trade.id, Vec::new()).await,
            Err(TradeHubError::Conflict(_))
        ));
        assert!(matches!(
            f.offers.delete(&f.b, offer.id, offer.version).await,
            Err(TradeHubError::Conflict(_))
        ));
    }

    /// Completes the trade whenever an item is looked up, so the trade
    /// closes between the service's checks and the offer write.
    #[derive(Debug)]
    struct CompletingItems {
        store: Arc<InMemoryStore>,
        trade_id: TradeId,
    }

    #[async_trait::async_trait]
    impl ItemRepository for CompletingItems {
        async fn insert(
            &self,
            owner_id: UserId,
            details: ItemDetails,
        ) -> RepositoryResult<Item> {
            ItemRepository::insert(self.store.as_ref(), owner_id, details).await
        }

        async fn get(&self, id: ItemId) -> RepositoryResult<Option<Item>> {
            let current = TradeRepository::get(self.store.as_ref(), self.trade_id).await?;
            if let Some(mut trade) = current {
                trade.initiator_confirmed = true;
                trade.receiver_confirmed = true;
                TradeRepository::update_confirmation(self.store.as_ref(), &trade).await?;
            }
            ItemRepository::get(self.store.as_ref(), id).await
        }

        async fn list(&self, filter: &ItemFilter) -> RepositoryResult<Vec<Item>> {
            ItemRepository::list(self.store.as_ref(), filter).await
        }

        async fn update(
            &self,
            id: ItemId,
            details: ItemDetails,
            expected: Version,
        ) -> RepositoryResult<Item> {
            ItemRepository::update(self.store.as_ref(), id, details, expected).await
        }

        async fn delete(&self, id: ItemId, expected: Version) -> RepositoryResult<()> {
            ItemRepository::delete(self.store.as_ref(), id, expected).await
        }
    }

    #[tokio::test]
    async fn trade_completing_mid_create_rejects_offer() {
        let store = Arc::new(InMemoryStore::new());
        let a = principal(store.as_ref(), "alice", Role::User).await;
        let b = principal(store.as_ref(), "bob", Role::User).await;
        let Ok(new_trade) = NewTrade::new(a.user_id, b.user_id) else {
            panic!("valid trade");
        };
        let Ok(trade) = TradeRepository::insert(store.as_ref(), new_trade).await else {
            panic!("trade insert failed");
        };
        let Ok(clock) = ItemRepository::insert(store.as_ref(), a.user_id, details("clock")).await
        else {
            panic!("item insert failed");
        };

        let offers = OfferService::new(
            Arc::clone(&store) as Arc<dyn OfferRepository>,
            Arc::clone(&store) as Arc<dyn TradeRepository>,
            Arc::new(CompletingItems {
                store: Arc::clone(&store),
                trade_id: trade.id,
            }),
        );

        let result = offers.create(&a, trade.id, vec![line(&clock)]).await;
        assert!(matches!(result, Err(TradeHubError::Conflict(_))));

        let Ok(Some(after)) = TradeRepository::get(store.as_ref(), trade.id).await else {
            panic!("trade vanished");
        };
        assert!(after.is_completed());
        let Ok(stored) = OfferRepository::list_by_trade(store.as_ref(), trade.id).await else {
            panic!("listing failed");
        };
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn stale_version_reported_before_business_rules() {
        let f = fixture().await;
        let first = item(&f, &f.a, "kite").await;
        let second = item(&f, &f.a, "yoyo").await;
        let Ok(offer) = f.offers.create(&f.a, f.trade.id, vec![line(&first)]).await else {
            panic!("offer create failed");
        };
        let Ok(_) = f.offers.add_item(&f.a, offer.id, line(&second), offer.version).await else {
            panic!("add failed");
        };

        let dup_with_stale = f.offers.add_item(&f.a, offer.id, line(&first), offer.version).await;
        assert!(matches!(
            dup_with_stale,
            Err(TradeHubError::ConcurrencyConflict { .. })
        ));
        let missing_with_stale = f
            .offers
            .remove_item(&f.a, offer.id, ItemId::new(999), offer.version)
            .await;
        assert!(matches!(
            missing_with_stale,
            Err(TradeHubError::ConcurrencyConflict { .. })
        ));
    }

    #[tokio::test]
    async fn unavailable_item_rejected() {
        let f = fixture().await;
        let mut hidden = details("vase");
        hidden.availability = Availability::Unavailable;
        let Ok(vase) = f.items.create(&f.a, hidden).await else {
            panic!("item create failed");
        };
        assert!(matches!(
            f.offers.create(&f.a, f.trade.id, vec![line(&vase)]).await,
            Err(TradeHubError::Conflict(_))
        ));
    }
}
