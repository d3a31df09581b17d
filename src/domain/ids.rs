//! Type-safe entity identifiers.
//!
//! Every entity gets a newtype over the `BIGSERIAL` key assigned by the
//! store, so a [`TradeId`] can never be passed where an [`ItemId`] is
//! expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Serialize,
            Deserialize,
            ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw store key.
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Returns the raw store key.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }
    };
}

entity_id!(
    /// Identifier of a registered user.
    UserId
);
entity_id!(
    /// Identifier of a listed item.
    ItemId
);
entity_id!(
    /// Identifier of a trade between two users.
    TradeId
);
entity_id!(
    /// Identifier of an offer attached to a trade.
    OfferId
);

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn display_is_raw_number() {
        assert_eq!(ItemId::new(7).to_string(), "7");
    }

    #[test]
    fn serializes_transparently() {
        let Ok(json) = serde_json::to_string(&TradeId::new(42)) else {
            panic!("serialization failed");
        };
        assert_eq!(json, "42");
    }

    #[test]
    fn parses_from_path_segment() {
        let Ok(id) = "19".parse::<OfferId>() else {
            panic!("valid id");
        };
        assert_eq!(id.get(), 19);
        assert!("abc".parse::<OfferId>().is_err());
    }

    #[test]
    fn ids_order_by_raw_key() {
        assert!(UserId::new(1) < UserId::new(2));
    }
}
