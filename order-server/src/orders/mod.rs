//! Order Lifecycle Module
//!
//! - **checkout**: cart → persisted order (validation, idempotency key)
//! - **status**: admin status changes through the authoritative procedures
//! - **amount**: in-process and database-side totals
//! - **notifications**: customer notification relay
//! - **query**: read-side views for customers and staff
//!
//! # Data Flow
//!
//! ```text
//! cart token → CartCodec → hydrate → checkout → orders + order_line
//!                                                    ↓
//!                            apply_status → procedures → order_log + notification
//!                                                    ↓
//!                                     amount (detail views, dashboards)
//! ```

pub mod amount;
pub mod checkout;
pub mod error;
pub mod notifications;
pub mod query;
pub mod status;

pub use checkout::{CheckoutOutcome, checkout};
pub use error::{CheckoutError, OrderError};
pub use notifications::{ClearReceipt, ClearScope};
pub use status::{FieldFailure, StatusField, StatusReport, apply_status, delete_order};
