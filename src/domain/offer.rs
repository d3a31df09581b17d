//! Offers: bundles of items a participant contributes to a trade.

use chrono::{DateTime, Utc};

use super::{ItemId, OfferId, TradeId, UserId, Version};
use crate::error::TradeHubError;

const MAX_QUANTITY: i32 = 1000;
const MAX_NOTES_CHARS: usize = 500;

/// An offer with its line items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offer {
    /// Store-assigned identifier.
    pub id: OfferId,
    /// Proposing user.
    pub user_id: UserId,
    /// Trade the offer belongs to.
    pub trade_id: TradeId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Concurrency token, replaced on every write.
    pub version: Version,
    /// Line items, ordered by item id.
    pub items: Vec<OfferItem>,
}

impl Offer {
    /// Returns `true` if `item_id` is already part of this offer.
    #[must_use]
    pub fn contains(&self, item_id: ItemId) -> bool {
        self.items.iter().any(|line| line.item_id == item_id)
    }
}

/// One item inside an offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferItem {
    /// Offered item.
    pub item_id: ItemId,
    /// Number of units offered.
    pub quantity: i32,
    /// Optional free-form remark.
    pub notes: Option<String>,
}

impl OfferItem {
    /// Builds a line item, checking quantity and notes bounds.
    ///
    /// Blank notes are stored as `None`.
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::Validation`] on out-of-range input.
    pub fn new(
        item_id: ItemId,
        quantity: i32,
        notes: Option<String>,
    ) -> Result<Self, TradeHubError> {
        if !(1..=MAX_QUANTITY).contains(&quantity) {
            return Err(TradeHubError::Validation(format!(
                "quantity must be between 1 and {MAX_QUANTITY}"
            )));
        }
        let notes = notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        if notes
            .as_deref()
            .is_some_and(|n| n.chars().count() > MAX_NOTES_CHARS)
        {
            return Err(TradeHubError::Validation(format!(
                "notes must be at most {MAX_NOTES_CHARS} characters"
            )));
        }
        Ok(Self {
            item_id,
            quantity,
            notes,
        })
    }
}

/// Insert payload for a new offer.
#[derive(Debug, Clone)]
pub struct NewOffer {
    /// Proposing user.
    pub user_id: UserId,
    /// Target trade.
    pub trade_id: TradeId,
    /// Initial line items, possibly empty.
    pub items: Vec<OfferItem>,
}

impl NewOffer {
    /// Builds an offer, rejecting duplicate items.
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::Validation`] if an item is listed twice.
    pub fn new(
        user_id: UserId,
        trade_id: TradeId,
        items: Vec<OfferItem>,
    ) -> Result<Self, TradeHubError> {
        for (index, line) in items.iter().enumerate() {
            if items
                .iter()
                .skip(index + 1)
                .any(|other| other.item_id == line.item_id)
            {
                return Err(TradeHubError::Validation(format!(
                    "item {} is listed more than once",
                    line.item_id
                )));
            }
        }
        Ok(Self {
            user_id,
            trade_id,
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_bounds() {
        assert!(OfferItem::new(ItemId::new(1), 0, None).is_err());
        assert!(OfferItem::new(ItemId::new(1), 1, None).is_ok());
        assert!(OfferItem::new(ItemId::new(1), 1001, None).is_err());
    }

    #[test]
    fn blank_notes_dropped() {
        let line = OfferItem::new(ItemId::new(1), 2, Some("   ".to_string()));
        assert!(matches!(line, Ok(OfferItem { notes: None, .. })));
    }

    #[test]
    fn long_notes_rejected() {
        let notes = Some("n".repeat(501));
        assert!(OfferItem::new(ItemId::new(1), 1, notes).is_err());
    }

    #[test]
    fn duplicate_items_rejected() {
        let line = |id| OfferItem {
            item_id: ItemId::new(id),
            quantity: 1,
            notes: None,
        };
        let result = NewOffer::new(
            UserId::new(1),
            TradeId::new(1),
            vec![line(5), line(6), line(5)],
        );
        assert!(result.is_err());
    }
}
