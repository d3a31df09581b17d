//! Database rows and their conversion into domain types.
//!
//! Enums are stored as snake_case text; a row holding an unknown value
//! fails conversion with [`RepositoryError::Serialization`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::traits::RepositoryError;
use crate::domain::{
    Item, ItemDetails, ItemId, Offer, OfferId, OfferItem, Trade, TradeId, User, UserId, Version,
};

/// Column list matching [`UserRow`].
pub const USER_COLUMNS: &str = "id, username, email, password_hash, role, created_at";

/// Column list matching [`ItemRow`].
pub const ITEM_COLUMNS: &str = "id, owner_id, name, description, value, tags, condition, \
                                availability, version, created_at, updated_at";

/// Column list matching [`TradeRow`].
pub const TRADE_COLUMNS: &str =
    "id, initiator_id, receiver_id, initiator_confirmed, receiver_confirmed, version, created_at";

/// Column list matching [`OfferRow`].
pub const OFFER_COLUMNS: &str = "id, user_id, trade_id, version, created_at";

/// A row from the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    /// Primary key.
    pub id: i64,
    /// Unique handle.
    pub username: String,
    /// Unique lowercase email.
    pub email: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Role text.
    pub role: String,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::new(row.id),
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            role: row
                .role
                .parse()
                .map_err(|e| RepositoryError::serialization(format!("users.role: {e}")))?,
            created_at: row.created_at,
        })
    }
}

/// A row from the `items` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ItemRow {
    /// Primary key.
    pub id: i64,
    /// Owning user.
    pub owner_id: i64,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Estimated value.
    pub value: Decimal,
    /// Tag array.
    pub tags: Vec<String>,
    /// Condition text.
    pub condition: String,
    /// Availability text.
    pub availability: String,
    /// Concurrency token.
    pub version: Uuid,
    /// Listing timestamp.
    pub created_at: DateTime<Utc>,
    /// Last write timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ItemRow> for Item {
    type Error = RepositoryError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let condition = row
            .condition
            .parse()
            .map_err(|e| RepositoryError::serialization(format!("items.condition: {e}")))?;
        let availability = row
            .availability
            .parse()
            .map_err(|e| RepositoryError::serialization(format!("items.availability: {e}")))?;
        Ok(Self {
            id: ItemId::new(row.id),
            owner_id: UserId::new(row.owner_id),
            details: ItemDetails {
                name: row.name,
                description: row.description,
                value: row.value,
                tags: row.tags,
                condition,
                availability,
            },
            version: Version::from_uuid(row.version),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// A row from the `trades` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TradeRow {
    /// Primary key.
    pub id: i64,
    /// Proposing user.
    pub initiator_id: i64,
    /// Counterparty.
    pub receiver_id: i64,
    /// Initiator flag.
    pub initiator_confirmed: bool,
    /// Receiver flag.
    pub receiver_confirmed: bool,
    /// Concurrency token.
    pub version: Uuid,
    /// Proposal timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<TradeRow> for Trade {
    fn from(row: TradeRow) -> Self {
        Self {
            id: TradeId::new(row.id),
            created_at: row.created_at,
            initiator_id: UserId::new(row.initiator_id),
            receiver_id: UserId::new(row.receiver_id),
            initiator_confirmed: row.initiator_confirmed,
            receiver_confirmed: row.receiver_confirmed,
            version: Version::from_uuid(row.version),
        }
    }
}

/// A row from the `offers` table (without its items).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OfferRow {
    /// Primary key.
    pub id: i64,
    /// Proposing user.
    pub user_id: i64,
    /// Target trade.
    pub trade_id: i64,
    /// Concurrency token.
    pub version: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl OfferRow {
    /// Attaches line items to build the domain offer.
    #[must_use]
    pub fn with_items(self, items: Vec<OfferItem>) -> Offer {
        Offer {
            id: OfferId::new(self.id),
            user_id: UserId::new(self.user_id),
            trade_id: TradeId::new(self.trade_id),
            created_at: self.created_at,
            version: Version::from_uuid(self.version),
            items,
        }
    }
}

/// A row from the `offer_items` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OfferItemRow {
    /// Owning offer.
    pub offer_id: i64,
    /// Offered item.
    pub item_id: i64,
    /// Units offered.
    pub quantity: i32,
    /// Optional remark.
    pub notes: Option<String>,
}

impl From<OfferItemRow> for OfferItem {
    fn from(row: OfferItemRow) -> Self {
        Self {
            item_id: ItemId::new(row.item_id),
            quantity: row.quantity,
            notes: row.notes,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Availability, ItemCondition, Role};

    fn item_row() -> ItemRow {
        ItemRow {
            id: 7,
            owner_id: 1,
            name: "Lamp".to_string(),
            description: String::new(),
            value: Decimal::new(1999, 2),
            tags: vec!["home".to_string()],
            condition: "used_like_new".to_string(),
            availability: "available".to_string(),
            version: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn item_row_converts() {
        let Ok(item) = Item::try_from(item_row()) else {
            panic!("row should convert");
        };
        assert_eq!(item.id, ItemId::new(7));
        assert_eq!(item.details.condition, ItemCondition::UsedLikeNew);
        assert_eq!(item.details.availability, Availability::Available);
    }

    #[test]
    fn unknown_enum_text_is_serialization_error() {
        let mut row = item_row();
        row.condition = "mint".to_string();
        assert!(matches!(
            Item::try_from(row),
            Err(RepositoryError::Serialization(_))
        ));
    }

    #[test]
    fn user_row_parses_role() {
        let row = UserRow {
            id: 1,
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            password_hash: "x".to_string(),
            role: "admin".to_string(),
            created_at: Utc::now(),
        };
        let Ok(user) = User::try_from(row) else {
            panic!("row should convert");
        };
        assert_eq!(user.role, Role::Admin);
    }
}
