//! # tradehub
//!
//! REST backend for a peer-to-peer item trading marketplace.
//!
//! Users list items, propose trades to each other, attach offers made of
//! their items, and confirm trades. A trade completes once both
//! participants have confirmed. Every mutable row carries a version token
//! and every write is a compare-and-set against it, so concurrent edits
//! fail loudly with 409 instead of overwriting each other.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP + bearer JWT)
//!     │
//!     ├── REST Handlers, DTOs, extractors (api/)
//!     │
//!     ├── AuthService, UserService, ItemService,
//!     │   TradeService, OfferService (service/)
//!     │
//!     ├── Entities and rules (domain/)
//!     │
//!     ├── Repository traits (persistence/)
//!     │
//!     └── PostgreSQL (sqlx) or in-memory store
//! ```

pub mod api;
pub mod app_state;
pub mod auth;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod seed;
pub mod service;
