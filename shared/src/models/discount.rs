//! Discount Model

use serde::{Deserialize, Serialize};

/// Scope of a storewide discount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscountType {
    #[serde(rename = "Entire Order")]
    EntireOrder,
    Category,
    Food,
}

/// Catalog discount (折扣), read-only to the POS core
///
/// `category_ids` / `food_ids` are only consulted for the matching type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub discount_type: DiscountType,
    /// Percentage off (0-100)
    pub percent: f64,
    /// Validity window start (Unix millis, inclusive)
    pub start_date: i64,
    /// Validity window end (Unix millis, inclusive)
    pub expiration_date: i64,
    #[serde(default)]
    pub category_ids: Vec<i64>,
    #[serde(default)]
    pub food_ids: Vec<i64>,
}

/// Storewide discount as recorded on a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedDiscount {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub discount_type: DiscountType,
    pub percent: f64,
}

impl From<&Discount> for AppliedDiscount {
    fn from(d: &Discount) -> Self {
        Self {
            id: d.id,
            name: d.name.clone(),
            discount_type: d.discount_type,
            percent: d.percent,
        }
    }
}
