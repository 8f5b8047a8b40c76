//! Client Profile Model

use serde::{Deserialize, Serialize};

/// Customer profile as known to the ordering service.
///
/// The id is the external user id; identity itself lives upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ClientProfile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl ClientProfile {
    /// "First Last", used as the customer name on notifications
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}
