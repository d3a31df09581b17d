//! Offer DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ItemId, Offer, OfferId, OfferItem, TradeId, UserId, Version};
use crate::error::TradeHubError;

/// One line of an offer as submitted by a client.
#[derive(Debug, Deserialize, ToSchema)]
pub struct OfferItemRequest {
    /// Item to include; must belong to the proposer.
    #[schema(value_type = i64)]
    pub item_id: ItemId,
    /// 1 to 1000. Defaults to 1.
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    /// Optional note, at most 500 characters.
    #[serde(default)]
    pub notes: Option<String>,
}

impl OfferItemRequest {
    /// Validates into a domain line item.
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::Validation`] on out-of-range input.
    pub fn into_line(self) -> Result<OfferItem, TradeHubError> {
        OfferItem::new(self.item_id, self.quantity, self.notes)
    }
}

/// Request body for `POST /offers`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOfferRequest {
    /// Trade the offer is made on.
    #[schema(value_type = i64)]
    pub trade_id: TradeId,
    /// Initial items; may be empty.
    #[serde(default)]
    pub items: Vec<OfferItemRequest>,
}

/// Request body for `POST /offers/{offerId}/items`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddOfferItemRequest {
    /// The line to add.
    #[serde(flatten)]
    pub line: OfferItemRequest,
    /// Offer concurrency token from the last read.
    #[schema(value_type = uuid::Uuid)]
    pub version: Version,
}

/// Line item representation.
#[derive(Debug, Serialize, ToSchema)]
pub struct OfferItemDto {
    /// Item identifier.
    #[schema(value_type = i64)]
    pub item_id: ItemId,
    /// Quantity.
    pub quantity: i32,
    /// Note, if any.
    pub notes: Option<String>,
}

impl From<OfferItem> for OfferItemDto {
    fn from(line: OfferItem) -> Self {
        Self {
            item_id: line.item_id,
            quantity: line.quantity,
            notes: line.notes,
        }
    }
}

/// Offer representation.
#[derive(Debug, Serialize, ToSchema)]
pub struct OfferDto {
    /// Offer identifier.
    #[schema(value_type = i64)]
    pub id: OfferId,
    /// Proposing user.
    #[schema(value_type = i64)]
    pub user_id: UserId,
    /// Trade the offer belongs to.
    #[schema(value_type = i64)]
    pub trade_id: TradeId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Concurrency token to send with the next write.
    #[schema(value_type = uuid::Uuid)]
    pub version: Version,
    /// Line items ordered by item id.
    pub items: Vec<OfferItemDto>,
}

impl From<Offer> for OfferDto {
    fn from(offer: Offer) -> Self {
        Self {
            id: offer.id,
            user_id: offer.user_id,
            trade_id: offer.trade_id,
            created_at: offer.created_at,
            version: offer.version,
            items: offer.items.into_iter().map(OfferItemDto::from).collect(),
        }
    }
}

fn default_quantity() -> i32 {
    1
}
