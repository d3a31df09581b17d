//! Data Transfer Objects for REST request/response serialization.
//!
//! Monetary values are serialized as decimal strings. Every mutable
//! resource carries its `version`, which clients echo back on writes.

pub mod auth_dto;
pub mod common_dto;
pub mod item_dto;
pub mod offer_dto;
pub mod trade_dto;
pub mod user_dto;

pub use auth_dto::*;
pub use common_dto::*;
pub use item_dto::*;
pub use offer_dto::*;
pub use trade_dto::*;
pub use user_dto::*;
