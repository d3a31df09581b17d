//! Trade proposals and two-party confirmation.
//!
//! Confirmation reads the trade, flips the caller's flag on the in-memory
//! copy, then writes it back guarded by the version that was read. A
//! concurrent writer in between turns the write into
//! [`TradeHubError::ConcurrencyConflict`]; the caller re-reads and retries.

use std::sync::Arc;

use crate::auth::Principal;
use crate::domain::{NewTrade, Permission, Trade, TradeId, UserId};
use crate::error::TradeHubError;
use crate::persistence::{TradeRepository, UserRepository};

/// Trade operations.
#[derive(Debug, Clone)]
pub struct TradeService {
    trades: Arc<dyn TradeRepository>,
    users: Arc<dyn UserRepository>,
}

impl TradeService {
    /// Creates a new `TradeService`.
    #[must_use]
    pub fn new(trades: Arc<dyn TradeRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { trades, users }
    }

    /// Proposes a trade from the caller to `receiver_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::Validation`] for a self-trade and
    /// [`TradeHubError::NotFound`] if the receiver does not exist.
    pub async fn create(
        &self,
        actor: &Principal,
        receiver_id: UserId,
    ) -> Result<Trade, TradeHubError> {
        let new_trade = NewTrade::new(actor.user_id, receiver_id)?;
        if self.users.get(receiver_id).await?.is_none() {
            return Err(TradeHubError::not_found("user", receiver_id));
        }
        let trade = self.trades.insert(new_trade).await?;
        tracing::info!(
            trade_id = %trade.id,
            initiator = %trade.initiator_id,
            receiver = %trade.receiver_id,
            "trade proposed"
        );
        Ok(trade)
    }

    /// Gets a trade visible to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::NotFound`] or [`TradeHubError::Forbidden`]
    /// for outsiders without [`Permission::ViewAllTrades`].
    pub async fn get(&self, actor: &Principal, id: TradeId) -> Result<Trade, TradeHubError> {
        let trade = self.load(id).await?;
        ensure_visible(actor, &trade)?;
        Ok(trade)
    }

    /// Lists the caller's trades, or every trade for roles with
    /// [`Permission::ViewAllTrades`].
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::Persistence`] on store failure.
    pub async fn list(&self, actor: &Principal) -> Result<Vec<Trade>, TradeHubError> {
        let trades = if actor.can(Permission::ViewAllTrades) {
            self.trades.list().await?
        } else {
            self.trades.list_for_user(actor.user_id).await?
        };
        Ok(trades)
    }

    /// Lists trades of `user_id`. Callers may list their own; others need
    /// [`Permission::ViewAllTrades`].
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::Forbidden`] or [`TradeHubError::NotFound`]
    /// for an unknown user.
    pub async fn list_for_user(
        &self,
        actor: &Principal,
        user_id: UserId,
    ) -> Result<Vec<Trade>, TradeHubError> {
        actor.require_self_or(user_id, Permission::ViewAllTrades)?;
        if self.users.get(user_id).await?.is_none() {
            return Err(TradeHubError::not_found("user", user_id));
        }
        Ok(self.trades.list_for_user(user_id).await?)
    }

    /// Confirms the caller's side of a trade.
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::NotFound`], [`TradeHubError::Forbidden`]
    /// for non-participants and [`TradeHubError::ConcurrencyConflict`] if
    /// the trade changed since it was read.
    pub async fn confirm(&self, actor: &Principal, id: TradeId) -> Result<Trade, TradeHubError> {
        let mut trade = self.load(id).await?;
        let side = trade.confirm(actor.user_id).inspect_err(|_| {
            tracing::warn!(trade_id = %id, user_id = %actor.user_id, "confirm by non-participant");
        })?;

        let saved = self.trades.update_confirmation(&trade).await.map_err(|e| {
            if e.is_version_conflict() {
                tracing::warn!(trade_id = %id, user_id = %actor.user_id, "confirm lost a race");
            }
            TradeHubError::from(e)
        })?;

        tracing::info!(trade_id = %id, ?side, status = ?saved.status(), "trade confirmed");
        if saved.is_completed() {
            tracing::info!(trade_id = %id, "trade completed");
        }
        Ok(saved)
    }

    /// Deletes a trade that has not completed, together with its offers.
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::NotFound`], [`TradeHubError::Forbidden`]
    /// for outsiders without [`Permission::ModerateListings`] and
    /// [`TradeHubError::Conflict`] for a completed trade.
    pub async fn delete(&self, actor: &Principal, id: TradeId) -> Result<(), TradeHubError> {
        let trade = self.load(id).await?;
        if !trade.involves(actor.user_id) {
            actor.require(Permission::ModerateListings)?;
        }
        if trade.is_completed() {
            return Err(TradeHubError::Conflict(format!(
                "trade {id} is completed and cannot be deleted"
            )));
        }
        self.trades.delete(id, trade.version).await?;
        tracing::info!(trade_id = %id, actor = %actor.user_id, "trade deleted");
        Ok(())
    }

    async fn load(&self, id: TradeId) -> Result<Trade, TradeHubError> {
        self.trades
            .get(id)
            .await?
            .ok_or_else(|| TradeHubError::not_found("trade", id))
    }
}

/// Fails unless the caller takes part in `trade` or may view all trades.
pub(crate) fn ensure_visible(actor: &Principal, trade: &Trade) -> Result<(), TradeHubError> {
    if trade.involves(actor.user_id) {
        Ok(())
    } else {
        actor.require(Permission::ViewAllTrades)
    }
}
