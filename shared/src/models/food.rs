//! Food Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Food entity (catalog item)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id: i64,
    pub name: String,
    pub restaurant: String,
    pub category: String,
    /// Current catalog price, 2 decimal places
    pub price: Decimal,
    pub description: Option<String>,
    pub image_file_name: Option<String>,
}

/// Create food payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodCreate {
    pub name: String,
    pub restaurant: String,
    pub category: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub image_file_name: Option<String>,
}
