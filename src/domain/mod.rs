//! Domain layer: entities, identifiers and the business rules that do not
//! need a store.
//!
//! The trade confirmation state machine lives in [`trade`]; the
//! optimistic-concurrency token in [`version`].

pub mod ids;
pub mod item;
pub mod offer;
pub mod trade;
pub mod user;
pub mod version;

pub use ids::{ItemId, OfferId, TradeId, UserId};
pub use item::{Availability, Item, ItemCondition, ItemDetails, ItemFilter, ItemPatch};
pub use offer::{NewOffer, Offer, OfferItem};
pub use trade::{NewTrade, Participant, Trade, TradeStatus};
pub use user::{NewUser, Permission, Role, User};
pub use version::Version;
