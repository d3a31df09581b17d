//! Demo data for `--seed`.
//!
//! Creates an admin, two traders with a few items each, a trade between
//! the traders and one offer on it. Skipped entirely when any user
//! exists, so repeated runs are harmless.

use anyhow::Context;
use rust_decimal::Decimal;

use crate::auth::hash_password;
use crate::domain::{
    Availability, ItemCondition, ItemDetails, NewOffer, NewTrade, NewUser, OfferItem, Role, User,
};
use crate::persistence::{ItemRepository, OfferRepository, TradeRepository, UserRepository};

/// Password shared by every seeded account.
pub const DEMO_PASSWORD: &str = "tradehub-demo";

/// What [`run`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Demo data was written.
    Seeded,
    /// Users already existed; nothing was written.
    Skipped,
}

/// Seeds `store` if it has no users.
///
/// # Errors
///
/// Returns an error if any write fails.
pub async fn run<S>(store: &S) -> anyhow::Result<SeedOutcome>
where
    S: UserRepository + ItemRepository + TradeRepository + OfferRepository,
{
    if UserRepository::count(store).await? > 0 {
        tracing::info!("users present, skipping seed");
        return Ok(SeedOutcome::Skipped);
    }

    let hash = hash_password(DEMO_PASSWORD).context("hashing demo password")?;
    let admin = account(store, "admin", Role::Admin, &hash).await?;
    let alice = account(store, "alice", Role::User, &hash).await?;
    let bob = account(store, "bob", Role::User, &hash).await?;

    let guitar = ItemRepository::insert(
        store,
        alice.id,
        item(
            "Acoustic guitar",
            "6-string, new strings",
            12_000,
            &["music", "instruments"],
            ItemCondition::UsedGood,
        ),
    )
    .await?;
    ItemRepository::insert(
        store,
        alice.id,
        item(
            "Board game bundle",
            "Three strategy games",
            4_500,
            &["games"],
            ItemCondition::UsedLikeNew,
        ),
    )
    .await?;
    ItemRepository::insert(
        store,
        bob.id,
        item(
            "Road bike",
            "54cm frame",
            30_000,
            &["sports", "cycling"],
            ItemCondition::Refurbished,
        ),
    )
    .await?;

    let trade = TradeRepository::insert(store, NewTrade::new(alice.id, bob.id)?).await?;
    let line = OfferItem::new(guitar.id, 1, Some("Includes soft case".to_string()))?;
    let offer =
        OfferRepository::insert(store, NewOffer::new(alice.id, trade.id, vec![line])?).await?;

    tracing::info!(
        admin = %admin.id,
        alice = %alice.id,
        bob = %bob.id,
        trade = %trade.id,
        offer = %offer.id,
        "demo data seeded"
    );
    Ok(SeedOutcome::Seeded)
}

async fn account<S: UserRepository>(
    store: &S,
    name: &str,
    role: Role,
    hash: &str,
) -> anyhow::Result<User> {
    let user = UserRepository::insert(
        store,
        NewUser {
            username: name.to_string(),
            email: format!("{name}@tradehub.local"),
            password_hash: hash.to_string(),
            role,
        },
    )
    .await
    .with_context(|| format!("seeding user {name}"))?;
    Ok(user)
}

fn item(
    name: &str,
    description: &str,
    cents: i64,
    tags: &[&str],
    condition: ItemCondition,
) -> ItemDetails {
    ItemDetails {
        name: name.to_string(),
        description: description.to_string(),
        value: Decimal::new(cents, 2),
        tags: tags.iter().map(|t| (*t).to_string()).collect(),
        condition,
        availability: Availability::Available,
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::ItemFilter;
    use crate::persistence::InMemoryStore;

    #[tokio::test]
    async fn seeds_once() {
        let store = InMemoryStore::new();
        let Ok(first) = run(&store).await else {
            panic!("seed failed");
        };
        assert_eq!(first, SeedOutcome::Seeded);

        let Ok(users) = UserRepository::list(&store).await else {
            panic!("list failed");
        };
        assert_eq!(users.len(), 3);
        let Ok(items) = ItemRepository::list(&store, &ItemFilter::default()).await else {
            panic!("list failed");
        };
        assert_eq!(items.len(), 3);

        let Ok(second) = run(&store).await else {
            panic!("second seed failed");
        };
        assert_eq!(second, SeedOutcome::Skipped);
        let Ok(count) = UserRepository::count(&store).await else {
            panic!("count failed");
        };
        assert_eq!(count, 3);
    }
}
