//! Repository traits (ports) for persistence abstraction.
//!
//! Services depend only on these traits. Two backends implement all of
//! them: [`super::PostgresStore`] for production and
//! [`super::InMemoryStore`] for tests and demo runs. Both enforce the same
//! referential rules and the same compare-and-set on [`Version`].

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    Item, ItemDetails, ItemFilter, ItemId, NewOffer, NewTrade, NewUser, Offer, OfferId, OfferItem,
    Role, Trade, TradeId, User, UserId, Version,
};

/// Error type for repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Entity not found.
    #[error("{entity_type} {id} not found")]
    NotFound {
        /// Type of entity.
        entity_type: &'static str,
        /// Entity identifier.
        id: String,
    },

    /// Unique key already taken.
    #[error("duplicate {entity_type}: {detail}")]
    Duplicate {
        /// Type of entity.
        entity_type: &'static str,
        /// Which key collided.
        detail: String,
    },

    /// Optimistic locking conflict: the presented version is stale.
    #[error("{entity_type} {id} has been modified since it was read")]
    VersionConflict {
        /// Type of entity.
        entity_type: &'static str,
        /// Entity identifier.
        id: String,
    },

    /// Referential integrity would be broken by the write.
    #[error("{entity_type} constraint violated: {detail}")]
    Constraint {
        /// Type of entity being written.
        entity_type: &'static str,
        /// What still references it, or what it references.
        detail: String,
    },

    /// Connection error.
    #[error("connection error: {0}")]
    Connection(String),

    /// Query error.
    #[error("query error: {0}")]
    Query(String),

    /// Stored data could not be mapped onto domain types.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl RepositoryError {
    /// Creates a not found error.
    #[must_use]
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a duplicate error.
    #[must_use]
    pub fn duplicate(entity_type: &'static str, detail: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type,
            detail: detail.into(),
        }
    }

    /// Creates a version conflict error.
    #[must_use]
    pub fn version_conflict(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::VersionConflict {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a constraint error.
    #[must_use]
    pub fn constraint(entity_type: &'static str, detail: impl Into<String>) -> Self {
        Self::Constraint {
            entity_type,
            detail: detail.into(),
        }
    }

    /// Creates a query error.
    #[must_use]
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a serialization error.
    #[must_use]
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Returns true if this is a version conflict error.
    #[must_use]
    pub fn is_version_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }
}

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Persistence for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync + fmt::Debug {
    /// Inserts a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Duplicate` if the username or email is
    /// taken.
    async fn insert(&self, user: NewUser) -> RepositoryResult<User>;

    /// Gets a user by id.
    async fn get(&self, id: UserId) -> RepositoryResult<Option<User>>;

    /// Finds a user by lowercase email.
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;

    /// Lists all users ordered by id.
    async fn list(&self) -> RepositoryResult<Vec<User>>;

    /// Changes a user's role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    async fn update_role(&self, id: UserId, role: Role) -> RepositoryResult<User>;

    /// Deletes a user together with their unreferenced items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist and
    /// `RepositoryError::Constraint` if trades, offers or offer items
    /// still reference the user or their items.
    async fn delete(&self, id: UserId) -> RepositoryResult<()>;

    /// Returns the number of users.
    async fn count(&self) -> RepositoryResult<u64>;
}

/// Persistence for listed items.
#[async_trait]
pub trait ItemRepository: Send + Sync + fmt::Debug {
    /// Inserts an item owned by `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Constraint` if the owner does not exist.
    async fn insert(&self, owner_id: UserId, details: ItemDetails) -> RepositoryResult<Item>;

    /// Gets an item by id.
    async fn get(&self, id: ItemId) -> RepositoryResult<Option<Item>>;

    /// Lists items passing `filter`, ordered by id.
    async fn list(&self, filter: &ItemFilter) -> RepositoryResult<Vec<Item>>;

    /// Replaces the editable attributes if the stored version still equals
    /// `expected`. Returns the item with its new version.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item does not exist and
    /// `RepositoryError::VersionConflict` if `expected` is stale.
    async fn update(
        &self,
        id: ItemId,
        details: ItemDetails,
        expected: Version,
    ) -> RepositoryResult<Item>;

    /// Deletes the item if the stored version still equals `expected`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound`, `RepositoryError::VersionConflict`,
    /// or `RepositoryError::Constraint` if an offer item references it.
    async fn delete(&self, id: ItemId, expected: Version) -> RepositoryResult<()>;
}

/// Persistence for trades.
#[async_trait]
pub trait TradeRepository: Send + Sync + fmt::Debug {
    /// Inserts a pending trade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Constraint` if either participant does not
    /// exist.
    async fn insert(&self, trade: NewTrade) -> RepositoryResult<Trade>;

    /// Gets a trade by id.
    async fn get(&self, id: TradeId) -> RepositoryResult<Option<Trade>>;

    /// Lists every trade ordered by id.
    async fn list(&self) -> RepositoryResult<Vec<Trade>>;

    /// Lists trades where `user_id` is initiator or receiver.
    async fn list_for_user(&self, user_id: UserId) -> RepositoryResult<Vec<Trade>>;

    /// Writes both confirmation flags of `trade` if the stored version
    /// still equals `trade.version`. Returns the trade with its new
    /// version.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` or
    /// `RepositoryError::VersionConflict`.
    async fn update_confirmation(&self, trade: &Trade) -> RepositoryResult<Trade>;

    /// Deletes a trade and, by cascade, its offers and their items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` or
    /// `RepositoryError::VersionConflict`.
    async fn delete(&self, id: TradeId, expected: Version) -> RepositoryResult<()>;
}

/// Persistence for offers and their line items.
#[async_trait]
pub trait OfferRepository: Send + Sync + fmt::Debug {
    /// Inserts an offer and its initial items atomically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Constraint` if the trade, user or any item
    /// does not exist.
    async fn insert(&self, offer: NewOffer) -> RepositoryResult<Offer>;

    /// Gets an offer with its items.
    async fn get(&self, id: OfferId) -> RepositoryResult<Option<Offer>>;

    /// Lists offers attached to a trade, ordered by id.
    async fn list_by_trade(&self, trade_id: TradeId) -> RepositoryResult<Vec<Offer>>;

    /// Lists offers on trades `user_id` takes part in, proposed by the
    /// other participant.
    async fn list_received(&self, user_id: UserId) -> RepositoryResult<Vec<Offer>>;

    /// Adds a line item if the offer's version still equals `expected`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound`, `RepositoryError::VersionConflict`,
    /// `RepositoryError::Duplicate` if the item is already in the offer, or
    /// `RepositoryError::Constraint` if the item does not exist.
    async fn add_item(
        &self,
        id: OfferId,
        line: OfferItem,
        expected: Version,
    ) -> RepositoryResult<Offer>;

    /// Removes a line item if the offer's version still equals `expected`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the offer or line is missing,
    /// or `RepositoryError::VersionConflict`.
    async fn remove_item(
        &self,
        id: OfferId,
        item_id: ItemId,
        expected: Version,
    ) -> RepositoryResult<Offer>;

    /// Deletes an offer and its line items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` or
    /// `RepositoryError::VersionConflict`.
    async fn delete(&self, id: OfferId, expected: Version) -> RepositoryResult<()>;
}
