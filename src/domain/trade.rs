//! Trades and the two-party confirmation state machine.
//!
//! A trade starts [`TradeStatus::Pending`]. Each participant may set their
//! own confirmation flag, never the other's, and no operation clears a
//! flag. Completion is derived from the flags and never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{TradeId, UserId, Version};
use crate::error::TradeHubError;

/// Confirmation progress derived from the two flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TradeStatus {
    /// Neither side has confirmed.
    Pending,
    /// Exactly one side has confirmed.
    HalfConfirmed,
    /// Both sides have confirmed. Terminal.
    Completed,
}

/// Which side of a trade a user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Participant {
    /// The user who proposed the trade.
    Initiator,
    /// The user the trade was proposed to.
    Receiver,
}

/// A proposed exchange between two users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trade {
    /// Store-assigned identifier.
    pub id: TradeId,
    /// Proposal timestamp.
    pub created_at: DateTime<Utc>,
    /// Proposing user.
    pub initiator_id: UserId,
    /// Counterparty.
    pub receiver_id: UserId,
    /// Initiator's confirmation flag.
    pub initiator_confirmed: bool,
    /// Receiver's confirmation flag.
    pub receiver_confirmed: bool,
    /// Concurrency token, replaced on every write.
    pub version: Version,
}

impl Trade {
    /// `true` iff both participants confirmed.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.initiator_confirmed && self.receiver_confirmed
    }

    /// Current state of the confirmation machine.
    #[must_use]
    pub const fn status(&self) -> TradeStatus {
        match (self.initiator_confirmed, self.receiver_confirmed) {
            (true, true) => TradeStatus::Completed,
            (false, false) => TradeStatus::Pending,
            _ => TradeStatus::HalfConfirmed,
        }
    }

    /// Returns the caller's side, or `None` for outsiders.
    #[must_use]
    pub fn participant(&self, user_id: UserId) -> Option<Participant> {
        if user_id == self.initiator_id {
            Some(Participant::Initiator)
        } else if user_id == self.receiver_id {
            Some(Participant::Receiver)
        } else {
            None
        }
    }

    /// Returns `true` if `user_id` is initiator or receiver.
    #[must_use]
    pub fn involves(&self, user_id: UserId) -> bool {
        self.participant(user_id).is_some()
    }

    /// Returns the other participant, or `None` for outsiders.
    #[must_use]
    pub fn counterparty_of(&self, user_id: UserId) -> Option<UserId> {
        match self.participant(user_id)? {
            Participant::Initiator => Some(self.receiver_id),
            Participant::Receiver => Some(self.initiator_id),
        }
    }

    /// Sets the caller's own confirmation flag.
    ///
    /// Confirming an already confirmed side leaves the trade unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::Forbidden`] if `user_id` is not a
    /// participant; the flags are not touched.
    pub fn confirm(&mut self, user_id: UserId) -> Result<Participant, TradeHubError> {
        let side = self.participant(user_id).ok_or_else(|| {
            TradeHubError::Forbidden(format!(
                "user {user_id} is not a participant of trade {}",
                self.id
            ))
        })?;
        match side {
            Participant::Initiator => self.initiator_confirmed = true,
            Participant::Receiver => self.receiver_confirmed = true,
        }
        Ok(side)
    }
}

/// Insert payload for a new trade.
#[derive(Debug, Clone, Copy)]
pub struct NewTrade {
    /// Proposing user.
    pub initiator_id: UserId,
    /// Counterparty.
    pub receiver_id: UserId,
}

impl NewTrade {
    /// Builds a proposal, rejecting trades with oneself.
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::Validation`] if both sides are the same
    /// user.
    pub fn new(initiator_id: UserId, receiver_id: UserId) -> Result<Self, TradeHubError> {
        if initiator_id == receiver_id {
            return Err(TradeHubError::Validation(
                "cannot propose a trade to yourself".to_string(),
            ));
        }
        Ok(Self {
            initiator_id,
            receiver_id,
        })
    }
}
