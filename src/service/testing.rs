//! Fixtures shared by the service tests.

use rust_decimal::Decimal;

use crate::auth::Principal;
use crate::domain::{Availability, ItemCondition, ItemDetails, NewUser, Role};
use crate::persistence::{InMemoryStore, UserRepository};

/// Stores a user and returns the principal a token for them would decode to.
#[allow(clippy::panic)]
pub(crate) async fn principal(store: &InMemoryStore, name: &str, role: Role) -> Principal {
    let Ok(user) = UserRepository::insert(
        store,
        NewUser {
            username: name.to_string(),
            email: format!("{name}@example.com"),
            password_hash: String::new(),
            role,
        },
    )
    .await
    else {
        panic!("fixture user {name} could not be stored");
    };
    Principal {
        user_id: user.id,
        email: user.email,
        role,
    }
}

/// Valid, available item attributes.
pub(crate) fn details(name: &str) -> ItemDetails {
    ItemDetails {
        name: name.to_string(),
        description: "mint condition".to_string(),
        value: Decimal::new(1999, 2),
        tags: vec!["games".to_string()],
        condition: ItemCondition::UsedLikeNew,
        availability: Availability::Available,
    }
}
