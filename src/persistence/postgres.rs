//! PostgreSQL implementation of the repository traits.
//!
//! Version-guarded writes are single conditional statements
//! (`... WHERE id = $1 AND version = $2`). When such a statement touches
//! no row, a follow-up existence check tells a missing row apart from a
//! stale version.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::models::{
    ITEM_COLUMNS, ItemRow, OFFER_COLUMNS, OfferItemRow, OfferRow, TRADE_COLUMNS, TradeRow,
    USER_COLUMNS, UserRow,
};
use super::traits::{
    ItemRepository, OfferRepository, RepositoryError, RepositoryResult, TradeRepository,
    UserRepository,
};
use crate::config::TradeHubConfig;
use crate::domain::{
    Availability, Item, ItemDetails, ItemFilter, ItemId, NewOffer, NewTrade, NewUser, Offer,
    OfferId, OfferItem, Role, Trade, TradeId, User, UserId, Version,
};

/// Maps a driver error onto the repository taxonomy.
fn map_sqlx_error(entity_type: &'static str, err: sqlx::Error) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::duplicate(entity_type, db.message().to_string())
        }
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            RepositoryError::constraint(entity_type, db.message().to_string())
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            RepositoryError::Connection(err.to_string())
        }
        _ => RepositoryError::query(err.to_string()),
    }
}

/// Share-locks the trade until the transaction ends and rejects it when
/// missing or completed. Confirmations block on the lock, so a trade
/// cannot complete underneath an offer write.
async fn lock_open_trade(conn: &mut PgConnection, trade_id: TradeId) -> RepositoryResult<()> {
    let completed = sqlx::query_scalar::<_, bool>(
        "SELECT initiator_confirmed AND receiver_confirmed FROM trades \
         WHERE id = $1 FOR SHARE",
    )
    .bind(trade_id.get())
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| map_sqlx_error("offer", e))?;
    match completed {
        None => Err(RepositoryError::constraint(
            "offer",
            format!("trade {trade_id} does not exist"),
        )),
        Some(true) => Err(RepositoryError::constraint(
            "offer",
            format!("trade {trade_id} is completed"),
        )),
        Some(false) => Ok(()),
    }
}

/// Share-locks the item and checks it belongs to `proposer` and is
/// available.
async fn lock_offerable_item(
    conn: &mut PgConnection,
    item_id: ItemId,
    proposer: UserId,
) -> RepositoryResult<()> {
    let row = sqlx::query_as::<_, (i64, String)>(
        "SELECT owner_id, availability FROM items WHERE id = $1 FOR SHARE",
    )
    .bind(item_id.get())
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| map_sqlx_error("offer item", e))?;
    let Some((owner_id, availability)) = row else {
        return Err(RepositoryError::constraint(
            "offer item",
            format!("item {item_id} does not exist"),
        ));
    };
    if owner_id != proposer.get() {
        return Err(RepositoryError::constraint(
            "offer item",
            format!("item {item_id} is not owned by user {proposer}"),
        ));
    }
    if availability != Availability::Available.as_str() {
        return Err(RepositoryError::constraint(
            "offer item",
            format!("item {item_id} is not available"),
        ));
    }
    Ok(())
}

/// Share-locks the offer's trade and returns the offer's proposer, or
/// `None` if the offer does not exist.
async fn lock_offer_trade(
    conn: &mut PgConnection,
    offer_id: OfferId,
) -> RepositoryResult<Option<UserId>> {
    let row =
        sqlx::query_as::<_, (i64, i64)>("SELECT user_id, trade_id FROM offers WHERE id = $1")
            .bind(offer_id.get())
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("offer", e))?;
    let Some((user_id, trade_id)) = row else {
        return Ok(None);
    };
    lock_open_trade(conn, TradeId::new(trade_id)).await?;
    Ok(Some(UserId::new(user_id)))
}

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool sized from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Connection`] if the database is
    /// unreachable.
    pub async fn connect(config: &TradeHubConfig) -> RepositoryResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;
        Ok(Self::new(pool))
    }

    /// Applies pending schema migrations from `migrations/`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Query`] if a migration fails.
    pub async fn migrate(&self) -> RepositoryResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RepositoryError::query(format!("migration failed: {e}")))
    }

    /// Distinguishes "row missing" from "version stale" after a guarded
    /// write touched nothing.
    async fn missing_or_conflict(
        &self,
        table: &'static str,
        entity_type: &'static str,
        id: i64,
    ) -> RepositoryError {
        let query = format!("SELECT EXISTS (SELECT 1 FROM {table} WHERE id = $1)");
        match sqlx::query_scalar::<_, bool>(&query)
            .bind(id)
            .fetch_one(&self.pool)
            .await
        {
            Ok(true) => RepositoryError::version_conflict(entity_type, id.to_string()),
            Ok(false) => RepositoryError::not_found(entity_type, id.to_string()),
            Err(e) => map_sqlx_error(entity_type, e),
        }
    }

    /// Loads line items for the given offers, grouped by offer id.
    async fn load_offer_items(
        &self,
        offer_ids: &[i64],
    ) -> RepositoryResult<HashMap<i64, Vec<OfferItem>>> {
        let rows = sqlx::query_as::<_, OfferItemRow>(
            "SELECT offer_id, item_id, quantity, notes FROM offer_items \
             WHERE offer_id = ANY($1) ORDER BY offer_id, item_id",
        )
        .bind(offer_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("offer item", e))?;

        let mut grouped: HashMap<i64, Vec<OfferItem>> = HashMap::new();
        for row in rows {
            grouped.entry(row.offer_id).or_default().push(row.into());
        }
        Ok(grouped)
    }

    async fn assemble_offers(&self, rows: Vec<OfferRow>) -> RepositoryResult<Vec<Offer>> {
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut items = self.load_offer_items(&ids).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let lines = items.remove(&row.id).unwrap_or_default();
                row.with_items(lines)
            })
            .collect())
    }

    async fn load_offer(&self, id: OfferId) -> RepositoryResult<Option<Offer>> {
        let row = sqlx::query_as::<_, OfferRow>(&format!(
            "SELECT {OFFER_COLUMNS} FROM offers WHERE id = $1"
        ))
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("offer", e))?;

        match row {
            Some(row) => Ok(self.assemble_offers(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Re-reads an offer that was just written inside a committed
    /// transaction.
    async fn reload_offer(&self, id: OfferId) -> RepositoryResult<Offer> {
        self.load_offer(id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("offer", id.to_string()))
    }
}

#[async_trait]
impl UserRepository for PostgresStore {
    async fn insert(&self, user: NewUser) -> RepositoryResult<User> {
        sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (username, email, password_hash, role) \
             VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("user", e))?
        .try_into()
    }

    async fn get(&self, id: UserId) -> RepositoryResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("user", e))?
            .map(User::try_from)
            .transpose()
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("user", e))?
        .map(User::try_from)
        .transpose()
    }

    async fn list(&self) -> RepositoryResult<Vec<User>> {
        sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("user", e))?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    async fn update_role(&self, id: UserId, role: Role) -> RepositoryResult<User> {
        sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET role = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id.get())
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("user", e))?
        .ok_or_else(|| RepositoryError::not_found("user", id.to_string()))?
        .try_into()
    }

    async fn delete(&self, id: UserId) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("user", e))?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("user", id.to_string()));
        }
        Ok(())
    }

    async fn count(&self) -> RepositoryResult<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("user", e))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

#[async_trait]
impl ItemRepository for PostgresStore {
    async fn insert(&self, owner_id: UserId, details: ItemDetails) -> RepositoryResult<Item> {
        sqlx::query_as::<_, ItemRow>(&format!(
            "INSERT INTO items \
             (owner_id, name, description, value, tags, condition, availability, version) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {ITEM_COLUMNS}"
        ))
        .bind(owner_id.get())
        .bind(&details.name)
        .bind(&details.description)
        .bind(details.value)
        .bind(&details.tags)
        .bind(details.condition.as_str())
        .bind(details.availability.as_str())
        .bind(Uuid::from(Version::next()))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("item", e))?
        .try_into()
    }

    async fn get(&self, id: ItemId) -> RepositoryResult<Option<Item>> {
        sqlx::query_as::<_, ItemRow>(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("item", e))?
            .map(Item::try_from)
            .transpose()
    }

    async fn list(&self, filter: &ItemFilter) -> RepositoryResult<Vec<Item>> {
        let mut qb =
            QueryBuilder::<Postgres>::new(format!("SELECT {ITEM_COLUMNS} FROM items WHERE TRUE"));
        if let Some(owner_id) = filter.owner_id {
            qb.push(" AND owner_id = ").push_bind(owner_id.get());
        }
        if let Some(availability) = filter.availability {
            qb.push(" AND availability = ")
                .push_bind(availability.as_str());
        }
        if let Some(tag) = &filter.tag {
            qb.push(" AND ").push_bind(tag.clone()).push(" = ANY(tags)");
        }
        qb.push(" ORDER BY id");

        qb.build_query_as::<ItemRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("item", e))?
            .into_iter()
            .map(Item::try_from)
            .collect()
    }

    async fn update(
        &self,
        id: ItemId,
        details: ItemDetails,
        expected: Version,
    ) -> RepositoryResult<Item> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "UPDATE items SET name = $3, description = $4, value = $5, tags = $6, \
             condition = $7, availability = $8, version = $9, updated_at = now() \
             WHERE id = $1 AND version = $2 RETURNING {ITEM_COLUMNS}"
        ))
        .bind(id.get())
        .bind(Uuid::from(expected))
        .bind(&details.name)
        .bind(&details.description)
        .bind(details.value)
        .bind(&details.tags)
        .bind(details.condition.as_str())
        .bind(details.availability.as_str())
        .bind(Uuid::from(Version::next()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("item", e))?;

        match row {
            Some(row) => row.try_into(),
            None => Err(self.missing_or_conflict("items", "item", id.get()).await),
        }
    }

    async fn delete(&self, id: ItemId, expected: Version) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1 AND version = $2")
            .bind(id.get())
            .bind(Uuid::from(expected))
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("item", e))?;
        if result.rows_affected() == 0 {
            return Err(self.missing_or_conflict("items", "item", id.get()).await);
        }
        Ok(())
    }
}

#[async_trait]
impl TradeRepository for PostgresStore {
    async fn insert(&self, trade: NewTrade) -> RepositoryResult<Trade> {
        let row = sqlx::query_as::<_, TradeRow>(&format!(
            "INSERT INTO trades (initiator_id, receiver_id, version) \
             VALUES ($1, $2, $3) RETURNING {TRADE_COLUMNS}"
        ))
        .bind(trade.initiator_id.get())
        .bind(trade.receiver_id.get())
        .bind(Uuid::from(Version::next()))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("trade", e))?;
        Ok(row.into())
    }

    async fn get(&self, id: TradeId) -> RepositoryResult<Option<Trade>> {
        let row = sqlx::query_as::<_, TradeRow>(&format!(
            "SELECT {TRADE_COLUMNS} FROM trades WHERE id = $1"
        ))
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("trade", e))?;
        Ok(row.map(Trade::from))
    }

    async fn list(&self) -> RepositoryResult<Vec<Trade>> {
        let rows = sqlx::query_as::<_, TradeRow>(&format!(
            "SELECT {TRADE_COLUMNS} FROM trades ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("trade", e))?;
        Ok(rows.into_iter().map(Trade::from).collect())
    }

    async fn list_for_user(&self, user_id: UserId) -> RepositoryResult<Vec<Trade>> {
        let rows = sqlx::query_as::<_, TradeRow>(&format!(
            "SELECT {TRADE_COLUMNS} FROM trades \
             WHERE initiator_id = $1 OR receiver_id = $1 ORDER BY id"
        ))
        .bind(user_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("trade", e))?;
        Ok(rows.into_iter().map(Trade::from).collect())
    }

    async fn update_confirmation(&self, trade: &Trade) -> RepositoryResult<Trade> {
        let row = sqlx::query_as::<_, TradeRow>(&format!(
            "UPDATE trades SET initiator_confirmed = $3, receiver_confirmed = $4, version = $5 \
             WHERE id = $1 AND version = $2 RETURNING {TRADE_COLUMNS}"
        ))
        .bind(trade.id.get())
        .bind(Uuid::from(trade.version))
        .bind(trade.initiator_confirmed)
        .bind(trade.receiver_confirmed)
        .bind(Uuid::from(Version::next()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("trade", e))?;

        match row {
            Some(row) => Ok(row.into()),
            None => Err(self.missing_or_conflict("trades", "trade", trade.id.get()).await),
        }
    }

    async fn delete(&self, id: TradeId, expected: Version) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM trades WHERE id = $1 AND version = $2")
            .bind(id.get())
            .bind(Uuid::from(expected))
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("trade", e))?;
        if result.rows_affected() == 0 {
            return Err(self.missing_or_conflict("trades", "trade", id.get()).await);
        }
        Ok(())
    }
}

#[async_trait]
impl OfferRepository for PostgresStore {
    async fn insert(&self, offer: NewOffer) -> RepositoryResult<Offer> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("offer", e))?;

        lock_open_trade(&mut tx, offer.trade_id).await?;
        for line in &offer.items {
            lock_offerable_item(&mut tx, line.item_id, offer.user_id).await?;
        }

        let row = sqlx::query_as::<_, OfferRow>(&format!(
            "INSERT INTO offers (user_id, trade_id, version) VALUES ($1, $2, $3) \
             RETURNING {OFFER_COLUMNS}"
        ))
        .bind(offer.user_id.get())
        .bind(offer.trade_id.get())
        .bind(Uuid::from(Version::next()))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("offer", e))?;

        for line in &offer.items {
            sqlx::query(
                "INSERT INTO offer_items (offer_id, item_id, quantity, notes) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(row.id)
            .bind(line.item_id.get())
            .bind(line.quantity)
            .bind(line.notes.as_deref())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("offer item", e))?;
        }

        tx.commit().await.map_err(|e| map_sqlx_error("offer", e))?;

        let mut items = offer.items;
        items.sort_by_key(|line| line.item_id);
        Ok(row.with_items(items))
    }

    async fn get(&self, id: OfferId) -> RepositoryResult<Option<Offer>> {
        self.load_offer(id).await
    }

    async fn list_by_trade(&self, trade_id: TradeId) -> RepositoryResult<Vec<Offer>> {
        let rows = sqlx::query_as::<_, OfferRow>(&format!(
            "SELECT {OFFER_COLUMNS} FROM offers WHERE trade_id = $1 ORDER BY id"
        ))
        .bind(trade_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("offer", e))?;
        self.assemble_offers(rows).await
    }

    async fn list_received(&self, user_id: UserId) -> RepositoryResult<Vec<Offer>> {
        let rows = sqlx::query_as::<_, OfferRow>(
            "SELECT o.id, o.user_id, o.trade_id, o.version, o.created_at \
             FROM offers o JOIN trades t ON t.id = o.trade_id \
             WHERE (t.initiator_id = $1 OR t.receiver_id = $1) AND o.user_id <> $1 \
             ORDER BY o.id",
        )
        .bind(user_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("offer", e))?;
        self.assemble_offers(rows).await
    }

    async fn add_item(
        &self,
        id: OfferId,
        line: OfferItem,
        expected: Version,
    ) -> RepositoryResult<Offer> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("offer", e))?;

        let bumped = sqlx::query("UPDATE offers SET version = $3 WHERE id = $1 AND version = $2")
            .bind(id.get())
            .bind(Uuid::from(expected))
            .bind(Uuid::from(Version::next()))
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("offer", e))?;
        if bumped.rows_affected() == 0 {
            drop(tx);
            return Err(self.missing_or_conflict("offers", "offer", id.get()).await);
        }

        let proposer = lock_offer_trade(&mut tx, id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("offer", id.to_string()))?;
        lock_offerable_item(&mut tx, line.item_id, proposer).await?;

        sqlx::query(
            "INSERT INTO offer_items (offer_id, item_id, quantity, notes) VALUES ($1, $2, $3, $4)",
        )
        .bind(id.get())
        .bind(line.item_id.get())
        .bind(line.quantity)
        .bind(line.notes.as_deref())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("offer item", e))?;

        tx.commit().await.map_err(|e| map_sqlx_error("offer", e))?;
        self.reload_offer(id).await
    }

    async fn remove_item(
        &self,
        id: OfferId,
        item_id: ItemId,
        expected: Version,
    ) -> RepositoryResult<Offer> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("offer", e))?;

        let bumped = sqlx::query("UPDATE offers SET version = $3 WHERE id = $1 AND version = $2")
            .bind(id.get())
            .bind(Uuid::from(expected))
            .bind(Uuid::from(Version::next()))
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("offer", e))?;
        if bumped.rows_affected() == 0 {
            drop(tx);
            return Err(self.missing_or_conflict("offers", "offer", id.get()).await);
        }

        if lock_offer_trade(&mut tx, id).await?.is_none() {
            return Err(RepositoryError::not_found("offer", id.to_string()));
        }

        let removed = sqlx::query("DELETE FROM offer_items WHERE offer_id = $1 AND item_id = $2")
            .bind(id.get())
            .bind(item_id.get())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("offer item", e))?;
        if removed.rows_affected() == 0 {
            return Err(RepositoryError::not_found(
                "offer item",
                format!("{id}/{item_id}"),
            ));
        }

        tx.commit().await.map_err(|e| map_sqlx_error("offer", e))?;
        self.reload_offer(id).await
    }

    async fn delete(&self, id: OfferId, expected: Version) -> RepositoryResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("offer", e))?;

        if lock_offer_trade(&mut tx, id).await?.is_none() {
            return Err(RepositoryError::not_found("offer", id.to_string()));
        }

        let result = sqlx::query("DELETE FROM offers WHERE id = $1 AND version = $2")
            .bind(id.get())
            .bind(Uuid::from(expected))
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("offer", e))?;
        if result.rows_affected() == 0 {
            drop(tx);
            return Err(self.missing_or_conflict("offers", "offer", id.get()).await);
        }

        tx.commit().await.map_err(|e| map_sqlx_error("offer", e))?;
        Ok(())
    }
}
