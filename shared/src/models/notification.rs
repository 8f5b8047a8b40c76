//! Notification Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order snapshot attached to a notification.
///
/// Captured when the notification is written; later order changes never
/// touch it. Line-level fields are only set for item events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderContext {
    pub customer_name: Option<String>,
    pub order_id: Option<i64>,
    pub order_status: Option<String>,
    pub order_date: Option<i64>,
    pub food_name: Option<String>,
    pub item_price: Option<Decimal>,
    pub item_quantity: Option<u32>,
    pub item_total: Option<Decimal>,
}

/// Notification entity; only `is_read` ever changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: String,
    pub message: String,
    pub created_at: i64,
    pub is_read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<OrderContext>,
}

/// Create notification payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationCreate {
    pub user_id: String,
    pub message: String,
    pub context: Option<OrderContext>,
}
