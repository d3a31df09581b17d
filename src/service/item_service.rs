//! Item listing, ownership checks and version-guarded edits.

use std::sync::Arc;

use crate::auth::Principal;
use crate::domain::{Item, ItemDetails, ItemFilter, ItemId, ItemPatch, Permission, Version};
use crate::error::TradeHubError;
use crate::persistence::ItemRepository;

/// Item operations.
///
/// Any authenticated user may read; only the owner (or a role with
/// [`Permission::ModerateListings`]) may write.
#[derive(Debug, Clone)]
pub struct ItemService {
    items: Arc<dyn ItemRepository>,
}

impl ItemService {
    /// Creates a new `ItemService`.
    #[must_use]
    pub fn new(items: Arc<dyn ItemRepository>) -> Self {
        Self { items }
    }

    /// Lists an item owned by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::Validation`] on invalid attributes.
    pub async fn create(
        &self,
        actor: &Principal,
        details: ItemDetails,
    ) -> Result<Item, TradeHubError> {
        let details = details.validated()?;
        let item = self.items.insert(actor.user_id, details).await?;
        tracing::info!(item_id = %item.id, owner_id = %item.owner_id, "item created");
        Ok(item)
    }

    /// Lists items passing `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::Persistence`] on store failure.
    pub async fn list(&self, filter: &ItemFilter) -> Result<Vec<Item>, TradeHubError> {
        Ok(self.items.list(filter).await?)
    }

    /// Gets one item.
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::NotFound`] if it does not exist.
    pub async fn get(&self, id: ItemId) -> Result<Item, TradeHubError> {
        self.items
            .get(id)
            .await?
            .ok_or_else(|| TradeHubError::not_found("item", id))
    }

    /// Replaces every editable attribute.
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::Forbidden`] for non-owners,
    /// [`TradeHubError::Validation`] on invalid attributes and
    /// [`TradeHubError::ConcurrencyConflict`] if `expected` is stale.
    pub async fn update(
        &self,
        actor: &Principal,
        id: ItemId,
        details: ItemDetails,
        expected: Version,
    ) -> Result<Item, TradeHubError> {
        let current = self.writable(actor, id).await?;
        let details = details.validated()?;
        self.write(current.id, details, expected).await
    }

    /// Changes only the attributes present in `patch`.
    ///
    /// # Errors
    ///
    /// As [`ItemService::update`], plus [`TradeHubError::Validation`] for
    /// an empty patch.
    pub async fn patch(
        &self,
        actor: &Principal,
        id: ItemId,
        patch: ItemPatch,
        expected: Version,
    ) -> Result<Item, TradeHubError> {
        if patch.is_empty() {
            return Err(TradeHubError::Validation(
                "patch must change at least one field".to_string(),
            ));
        }
        let current = self.writable(actor, id).await?;
        let details = patch.apply_to(&current.details)?;
        self.write(current.id, details, expected).await
    }

    /// Deletes an item not referenced by any offer.
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::Forbidden`] for non-owners,
    /// [`TradeHubError::ConcurrencyConflict`] if `expected` is stale and
    /// [`TradeHubError::Conflict`] while an offer includes the item.
    pub async fn delete(
        &self,
        actor: &Principal,
        id: ItemId,
        expected: Version,
    ) -> Result<(), TradeHubError> {
        self.writable(actor, id).await?;
        self.items.delete(id, expected).await?;
        tracing::info!(item_id = %id, actor = %actor.user_id, "item deleted");
        Ok(())
    }

    async fn writable(&self, actor: &Principal, id: ItemId) -> Result<Item, TradeHubError> {
        let item = self.get(id).await?;
        actor.require_self_or(item.owner_id, Permission::ModerateListings)?;
        Ok(item)
    }

    async fn write(
        &self,
        id: ItemId,
        details: ItemDetails,
        expected: Version,
    ) -> Result<Item, TradeHubError> {
        match self.items.update(id, details, expected).await {
            Ok(item) => {
                tracing::info!(item_id = %id, version = %item.version, "item updated");
                Ok(item)
            }
            Err(e) => {
                if e.is_version_conflict() {
                    tracing::warn!(item_id = %id, %expected, "stale item version");
                }
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::{Availability, Role};
    use crate::persistence::InMemoryStore;
    use crate::service::testing::{details, principal};

    async fn setup() -> (ItemService, Principal, Principal, Principal) {
        let store = InMemoryStore::new();
        let owner = principal(&store, "owner", Role::User).await;
        let other = principal(&store, "other", Role::User).await;
        let admin = principal(&store, "root", Role::Admin).await;
        (ItemService::new(Arc::new(store)), owner, other, admin)
    }

    #[tokio::test]
    async fn stale_token_rejected_after_update() {
        let (items, owner, _, _) = setup().await;
        let Ok(item) = items.create(&owner, details("console")).await else {
            panic!("create failed");
        };
        let t1 = item.version;

        let Ok(updated) = items.update(&owner, item.id, details("console v2"), t1).await else {
            panic!("update with current version failed");
        };
        let t2 = updated.version;
        assert_ne!(t1, t2);

        let stale = items.update(&owner, item.id, details("console v3"), t1).await;
        let Err(err) = stale else {
            panic!("stale version must fail");
        };
        assert!(err.is_retryable());

        let Ok(_) = items.update(&owner, item.id, details("console v3"), t2).await else {
            panic!("retry with fresh version failed");
        };
    }

    #[tokio::test]
    async fn patch_changes_only_given_fields() {
        let (items, owner, _, _) = setup().await;
        let Ok(item) = items.create(&owner, details("lamp")).await else {
            panic!("create failed");
        };
        let patch = ItemPatch {
            availability: Some(Availability::Unavailable),
            ..ItemPatch::default()
        };
        let Ok(patched) = items.patch(&owner, item.id, patch, item.version).await else {
            panic!("patch failed");
        };
        assert_eq!(patched.details.name, "lamp");
        assert_eq!(patched.details.availability, Availability::Unavailable);

        let empty = items
            .patch(&owner, item.id, ItemPatch::default(), patched.version)
            .await;
        assert!(matches!(empty, Err(TradeHubError::Validation(_))));
    }

    #[tokio::test]
    async fn only_owner_or_moderator_writes() {
        let (items, owner, other, admin) = setup().await;
        let Ok(item) = items.create(&owner, details("bike")).await else {
            panic!("create failed");
        };

        let denied = items.delete(&other, item.id, item.version).await;
        assert!(matches!(denied, Err(TradeHubError::Forbidden(_))));

        assert!(items.delete(&admin, item.id, item.version).await.is_ok());
        assert!(matches!(
            items.get(item.id).await,
            Err(TradeHubError::NotFound { entity: "item", .. })
        ));
    }

    #[tokio::test]
    async fn invalid_details_rejected() {
        let (items, owner, _, _) = setup().await;
        let mut bad = details("x");
        bad.value = Decimal::new(-1, 0);
        assert!(matches!(
            items.create(&owner, bad).await,
            Err(TradeHubError::Validation(_))
        ));
    }
}
