//! Item DTOs for create, replace, patch, get and list operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::{PaginationMeta, PaginationParams, default_page, default_per_page};
use crate::domain::{
    Availability, Item, ItemCondition, ItemDetails, ItemFilter, ItemId, ItemPatch, UserId, Version,
};

/// Request body for `POST /items`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateItemRequest {
    /// Display name, 1 to 100 characters.
    pub name: String,
    /// Free text, at most 1000 characters.
    #[serde(default)]
    pub description: String,
    /// Non-negative value below 10^12 with at most two decimal places,
    /// serialized as a decimal string.
    #[schema(value_type = String, example = "19.99")]
    pub value: Decimal,
    /// Up to 10 tags of 1 to 30 characters.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Physical condition.
    pub condition: ItemCondition,
    /// Defaults to `available`.
    #[serde(default = "default_availability")]
    pub availability: Availability,
}

impl CreateItemRequest {
    /// Converts into unvalidated domain attributes.
    #[must_use]
    pub fn into_details(self) -> ItemDetails {
        ItemDetails {
            name: self.name,
            description: self.description,
            value: self.value,
            tags: self.tags,
            condition: self.condition,
            availability: self.availability,
        }
    }
}

/// Request body for `PUT /items/{id}`: every attribute plus the version.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateItemRequest {
    /// New attributes.
    #[serde(flatten)]
    pub item: CreateItemRequest,
    /// Concurrency token from the last read.
    #[schema(value_type = uuid::Uuid)]
    pub version: Version,
}

/// Request body for `PATCH /items/{id}`: only the fields to change.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PatchItemRequest {
    /// New display name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New value.
    #[schema(value_type = Option<String>)]
    pub value: Option<Decimal>,
    /// Replacement tag set.
    pub tags: Option<Vec<String>>,
    /// New condition.
    pub condition: Option<ItemCondition>,
    /// New availability.
    pub availability: Option<Availability>,
    /// Concurrency token from the last read.
    #[schema(value_type = uuid::Uuid)]
    pub version: Version,
}

impl PatchItemRequest {
    /// Splits into the domain patch and the expected version.
    #[must_use]
    pub fn into_patch(self) -> (ItemPatch, Version) {
        (
            ItemPatch {
                name: self.name,
                description: self.description,
                value: self.value,
                tags: self.tags,
                condition: self.condition,
                availability: self.availability,
            },
            self.version,
        )
    }
}

/// Query parameters for `GET /items`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ItemListQuery {
    /// Only items owned by this user.
    #[param(value_type = Option<i64>)]
    pub owner_id: Option<UserId>,
    /// Only items with this availability.
    pub availability: Option<Availability>,
    /// Only items carrying this tag.
    pub tag: Option<String>,
    /// Page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100).
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl ItemListQuery {
    /// Splits into the store filter and pagination.
    #[must_use]
    pub fn split(self) -> (ItemFilter, PaginationParams) {
        (
            ItemFilter {
                owner_id: self.owner_id,
                availability: self.availability,
                tag: self.tag,
            },
            PaginationParams {
                page: self.page,
                per_page: self.per_page,
            },
        )
    }
}

/// Item representation returned by every item endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ItemDto {
    /// Item identifier.
    #[schema(value_type = i64)]
    pub id: ItemId,
    /// Owning user.
    #[schema(value_type = i64)]
    pub owner_id: UserId,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Value as a decimal string.
    #[schema(value_type = String, example = "19.99")]
    pub value: Decimal,
    /// Tags.
    pub tags: Vec<String>,
    /// Condition.
    pub condition: ItemCondition,
    /// Availability.
    pub availability: Availability,
    /// Concurrency token to send with the next write.
    #[schema(value_type = uuid::Uuid)]
    pub version: Version,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last write timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<Item> for ItemDto {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            owner_id: item.owner_id,
            name: item.details.name,
            description: item.details.description,
            value: item.details.value,
            tags: item.details.tags,
            condition: item.details.condition,
            availability: item.details.availability,
            version: item.version,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

/// Response body for `GET /items`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ItemListResponse {
    /// Items on this page.
    pub data: Vec<ItemDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

fn default_availability() -> Availability {
    Availability::Available
}
