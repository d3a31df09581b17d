//! Persistence layer: repository ports and their two backends.
//!
//! Services talk to the [`traits`] only. [`PostgresStore`] uses
//! `sqlx::PgPool` for async PostgreSQL access; [`InMemoryStore`] keeps
//! everything in process and is used by tests and by
//! `PERSISTENCE_ENABLED=false` runs.

pub mod memory;
pub mod models;
pub mod postgres;
pub mod traits;

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use traits::{
    ItemRepository, OfferRepository, RepositoryError, RepositoryResult, TradeRepository,
    UserRepository,
};
