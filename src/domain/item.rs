//! Tradable items and their descriptive attributes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ItemId, UserId, Version};
use crate::error::TradeHubError;

const MAX_NAME_CHARS: usize = 100;
const MAX_DESCRIPTION_CHARS: usize = 1000;
const MAX_TAGS: usize = 10;
const MAX_TAG_CHARS: usize = 30;
/// Values are stored as `NUMERIC(14,2)`.
const VALUE_SCALE: u32 = 2;
const VALUE_LIMIT: i64 = 1_000_000_000_000;

/// Physical condition of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ItemCondition {
    /// Never used.
    New,
    /// Restored to working order by a third party.
    Refurbished,
    /// Used, no visible wear.
    UsedLikeNew,
    /// Used, minor wear.
    UsedGood,
    /// Used, clear wear but fully functional.
    UsedAcceptable,
    /// Used, damaged or partly working.
    UsedBad,
}

impl ItemCondition {
    /// Stable text form used in the store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Refurbished => "refurbished",
            Self::UsedLikeNew => "used_like_new",
            Self::UsedGood => "used_good",
            Self::UsedAcceptable => "used_acceptable",
            Self::UsedBad => "used_bad",
        }
    }
}

impl fmt::Display for ItemCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemCondition {
    type Err = TradeHubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "refurbished" => Ok(Self::Refurbished),
            "used_like_new" => Ok(Self::UsedLikeNew),
            "used_good" => Ok(Self::UsedGood),
            "used_acceptable" => Ok(Self::UsedAcceptable),
            "used_bad" => Ok(Self::UsedBad),
            other => Err(TradeHubError::Validation(format!(
                "unknown item condition: {other}"
            ))),
        }
    }
}

/// Whether an item can currently be put into offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// Open for trading.
    Available,
    /// Withdrawn by its owner.
    Unavailable,
}

impl Availability {
    /// Stable text form used in the store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Availability {
    type Err = TradeHubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "unavailable" => Ok(Self::Unavailable),
            other => Err(TradeHubError::Validation(format!(
                "unknown availability: {other}"
            ))),
        }
    }
}

/// A listed item as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Store-assigned identifier.
    pub id: ItemId,
    /// Owning user.
    pub owner_id: UserId,
    /// Editable attributes.
    pub details: ItemDetails,
    /// Concurrency token, replaced on every write.
    pub version: Version,
    /// Listing timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last successful write.
    pub updated_at: DateTime<Utc>,
}

/// The owner-editable attributes of an item.
///
/// Used as the payload for creation and full replacement; always passes
/// through [`ItemDetails::validated`] before reaching a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDetails {
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Estimated value, never negative.
    pub value: Decimal,
    /// Search tags, trimmed and de-duplicated.
    pub tags: Vec<String>,
    /// Physical condition.
    pub condition: ItemCondition,
    /// Trading availability.
    pub availability: Availability,
}

impl ItemDetails {
    /// Normalizes tags and checks every field constraint.
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::Validation`] naming the first offending
    /// field.
    pub fn validated(mut self) -> Result<Self, TradeHubError> {
        self.name = self.name.trim().to_string();
        let name_len = self.name.chars().count();
        if name_len == 0 || name_len > MAX_NAME_CHARS {
            return Err(TradeHubError::Validation(format!(
                "name must be between 1 and {MAX_NAME_CHARS} characters"
            )));
        }
        if self.description.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(TradeHubError::Validation(format!(
                "description must be at most {MAX_DESCRIPTION_CHARS} characters"
            )));
        }
        if self.value.is_sign_negative() && !self.value.is_zero() {
            return Err(TradeHubError::Validation(
                "value must not be negative".to_string(),
            ));
        }
        if self.value >= Decimal::new(VALUE_LIMIT, 0) {
            return Err(TradeHubError::Validation(format!(
                "value must be less than {VALUE_LIMIT}"
            )));
        }
        if self.value.normalize().scale() > VALUE_SCALE {
            return Err(TradeHubError::Validation(format!(
                "value must have at most {VALUE_SCALE} decimal places"
            )));
        }
        self.value = self.value.round_dp(VALUE_SCALE);

        let mut tags: Vec<String> = Vec::with_capacity(self.tags.len());
        for tag in &self.tags {
            let tag = tag.trim();
            let len = tag.chars().count();
            if len == 0 || len > MAX_TAG_CHARS {
                return Err(TradeHubError::Validation(format!(
                    "tags must be between 1 and {MAX_TAG_CHARS} characters"
                )));
            }
            if !tags.iter().any(|existing| existing == tag) {
                tags.push(tag.to_string());
            }
        }
        if tags.len() > MAX_TAGS {
            return Err(TradeHubError::Validation(format!(
                "at most {MAX_TAGS} tags are allowed"
            )));
        }
        self.tags = tags;
        Ok(self)
    }
}

/// Partial update: only `Some` fields change.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    /// New display name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New value.
    pub value: Option<Decimal>,
    /// Replacement tag set.
    pub tags: Option<Vec<String>>,
    /// New condition.
    pub condition: Option<ItemCondition>,
    /// New availability.
    pub availability: Option<Availability>,
}

impl ItemPatch {
    /// Returns `true` if the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.value.is_none()
            && self.tags.is_none()
            && self.condition.is_none()
            && self.availability.is_none()
    }

    /// Overlays the patch on `current` and validates the result.
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::Validation`] if the merged details are
    /// invalid.
    pub fn apply_to(self, current: &ItemDetails) -> Result<ItemDetails, TradeHubError> {
        ItemDetails {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            description: self
                .description
                .unwrap_or_else(|| current.description.clone()),
            value: self.value.unwrap_or(current.value),
            tags: self.tags.unwrap_or_else(|| current.tags.clone()),
            condition: self.condition.unwrap_or(current.condition),
            availability: self.availability.unwrap_or(current.availability),
        }
        .validated()
    }
}

/// Listing filter for `GET /items`.
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    /// Only items owned by this user.
    pub owner_id: Option<UserId>,
    /// Only items with this availability.
    pub availability: Option<Availability>,
    /// Only items carrying this tag (exact match).
    pub tag: Option<String>,
}

impl ItemFilter {
    /// Returns `true` if `item` passes every set criterion.
    #[must_use]
    pub fn matches(&self, item: &Item) -> bool {
        self.owner_id.is_none_or(|owner| item.owner_id == owner)
            && self
                .availability
                .is_none_or(|availability| item.details.availability == availability)
            && self
                .tag
                .as_deref()
                .is_none_or(|tag| item.details.tags.iter().any(|t| t == tag))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn details() -> ItemDetails {
        ItemDetails {
            name: "Road bike".to_string(),
            description: "Aluminium frame".to_string(),
            value: Decimal::new(25_000, 2),
            tags: vec!["bike".to_string()],
            condition: ItemCondition::UsedGood,
            availability: Availability::Available,
        }
    }

    #[test]
    fn valid_details_pass() {
        assert!(details().validated().is_ok());
    }

    #[test]
    fn name_is_trimmed_and_required() {
        let mut d = details();
        d.name = "   ".to_string();
        assert!(d.validated().is_err());

        let mut d = details();
        d.name = "  Lamp ".to_string();
        let Ok(d) = d.validated() else {
            panic!("valid name");
        };
        assert_eq!(d.name, "Lamp");
    }

    #[test]
    fn negative_value_rejected() {
        let mut d = details();
        d.value = Decimal::new(-1, 0);
        assert!(d.validated().is_err());
    }

    #[test]
    fn value_must_fit_storage() {
        let mut d = details();
        d.value = Decimal::new(1_000_000_000_000, 0);
        assert!(matches!(d.validated(), Err(TradeHubError::Validation(_))));

        let mut d = details();
        d.value = Decimal::new(999_999_999_999_99, 2);
        assert!(d.validated().is_ok());

        let mut d = details();
        d.value = Decimal::new(1_999, 3);
        assert!(matches!(d.validated(), Err(TradeHubError::Validation(_))));

        let mut d = details();
        d.value = Decimal::new(1_000_000_000_000_000_999, 3);
        assert!(matches!(d.validated(), Err(TradeHubError::Validation(_))));
    }

    #[test]
    fn trailing_zeros_beyond_cents_are_dropped() {
        let mut d = details();
        d.value = Decimal::new(125_000, 4);
        let Ok(d) = d.validated() else {
            panic!("12.5000 is a valid value");
        };
        assert_eq!(d.value, Decimal::new(1_250, 2));
        assert_eq!(d.value.scale(), 2);
    }

    #[test]
    fn tags_deduplicated_and_bounded() {
        let mut d = details();
        d.tags = vec![" a ".to_string(), "a".to_string(), "b".to_string()];
        let Ok(d) = d.validated() else {
            panic!("valid tags");
        };
        assert_eq!(d.tags, vec!["a".to_string(), "b".to_string()]);

        let mut d = details();
        d.tags = (0..11).map(|i| format!("t{i}")).collect();
        assert!(d.validated().is_err());
    }

    #[test]
    fn patch_keeps_unset_fields() {
        let patch = ItemPatch {
            availability: Some(Availability::Unavailable),
            ..ItemPatch::default()
        };
        let Ok(merged) = patch.apply_to(&details()) else {
            panic!("patch should apply");
        };
        assert_eq!(merged.name, "Road bike");
        assert_eq!(merged.availability, Availability::Unavailable);
    }

    #[test]
    fn empty_patch_detected() {
        assert!(ItemPatch::default().is_empty());
    }

    #[test]
    fn condition_text_round_trip() {
        for c in [
            ItemCondition::New,
            ItemCondition::Refurbished,
            ItemCondition::UsedLikeNew,
            ItemCondition::UsedGood,
            ItemCondition::UsedAcceptable,
            ItemCondition::UsedBad,
        ] {
            let Ok(parsed) = c.as_str().parse::<ItemCondition>() else {
                panic!("condition should parse");
            };
            assert_eq!(parsed, c);
        }
    }
}
