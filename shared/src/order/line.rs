//! Order line value type

use crate::models::FoodSnapshot;
use serde::{Deserialize, Serialize};

/// Maximum quantity on one line
pub const MAX_QUANTITY: u32 = 9999;
/// Maximum unit price accepted into an order
pub const MAX_PRICE: f64 = 1_000_000.0;

/// Finite, non-negative and at most [`MAX_PRICE`]
pub fn is_valid_price(price: f64) -> bool {
    price.is_finite() && (0.0..=MAX_PRICE).contains(&price)
}

/// In `1..=MAX_QUANTITY`
pub fn is_valid_quantity(quantity: u32) -> bool {
    (1..=MAX_QUANTITY).contains(&quantity)
}

/// One line of a table's order (订单行)
///
/// Embedded in `TableRecord.order`; not independently addressable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub food: FoodSnapshot,
    /// Always >= 1; a line that would reach 0 is removed instead
    pub quantity: u32,
    /// Line-level percentage (0-100)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    /// Kitchen instruction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl OrderLine {
    pub fn new(food: FoodSnapshot) -> Self {
        Self {
            food,
            quantity: 1,
            discount: None,
            note: None,
        }
    }

    pub fn has_discount(&self) -> bool {
        self.discount.is_some_and(|d| d > 0.0)
    }

    /// Room for one more unit
    pub fn can_increment(&self) -> bool {
        self.quantity < MAX_QUANTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_limits() {
        assert!(is_valid_price(0.0));
        assert!(is_valid_price(MAX_PRICE));
        assert!(!is_valid_price(MAX_PRICE + 0.01));
        assert!(!is_valid_price(-1.0));
        assert!(!is_valid_price(f64::NAN));
        assert!(!is_valid_price(f64::INFINITY));
    }

    #[test]
    fn test_quantity_limits() {
        assert!(!is_valid_quantity(0));
        assert!(is_valid_quantity(1));
        assert!(is_valid_quantity(MAX_QUANTITY));
        assert!(!is_valid_quantity(MAX_QUANTITY + 1));
    }
}
