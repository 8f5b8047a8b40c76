//! Data models
//!
//! Shared between order-server and frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! Order and food IDs are `i64` (SQLite INTEGER PRIMARY KEY); client IDs are
//! the opaque user ids handed over by the identity provider.

pub mod client;
pub mod food;
pub mod notification;
pub mod order;
pub mod order_log;

// Re-exports
pub use client::*;
pub use food::*;
pub use notification::*;
pub use order::*;
pub use order_log::*;
