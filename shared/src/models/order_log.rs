//! Order Log Model (append-only audit trail)

use serde::{Deserialize, Serialize};

/// One audit entry written alongside every order write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderLog {
    pub id: i64,
    pub order_id: i64,
    pub client_id: String,
    pub created_at: i64,
    pub log_message: String,
}
