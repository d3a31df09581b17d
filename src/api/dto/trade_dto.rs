//! Trade DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Trade, TradeId, TradeStatus, UserId, Version};

/// Request body for `POST /trades`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTradeRequest {
    /// The user the caller proposes to trade with.
    #[schema(value_type = i64)]
    pub receiver_id: UserId,
}

/// Request body for `PUT /trades/{id}`.
///
/// Only `{"confirmed": true}` is meaningful; confirmations cannot be
/// withdrawn.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ConfirmTradeRequest {
    /// Must be `true`.
    pub confirmed: bool,
}

/// Trade representation.
#[derive(Debug, Serialize, ToSchema)]
pub struct TradeDto {
    /// Trade identifier.
    #[schema(value_type = i64)]
    pub id: TradeId,
    /// Proposing user.
    #[schema(value_type = i64)]
    pub initiator_id: UserId,
    /// Counterparty.
    #[schema(value_type = i64)]
    pub receiver_id: UserId,
    /// Initiator has confirmed.
    pub initiator_confirmed: bool,
    /// Receiver has confirmed.
    pub receiver_confirmed: bool,
    /// Both sides have confirmed.
    pub completed: bool,
    /// Derived progress.
    pub status: TradeStatus,
    /// Concurrency token.
    #[schema(value_type = uuid::Uuid)]
    pub version: Version,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<Trade> for TradeDto {
    fn from(trade: Trade) -> Self {
        Self {
            id: trade.id,
            initiator_id: trade.initiator_id,
            receiver_id: trade.receiver_id,
            initiator_confirmed: trade.initiator_confirmed,
            receiver_confirmed: trade.receiver_confirmed,
            completed: trade.is_completed(),
            status: trade.status(),
            version: trade.version,
            created_at: trade.created_at,
        }
    }
}
