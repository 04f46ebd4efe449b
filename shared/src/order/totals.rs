//! Derived money view of an order

use serde::{Deserialize, Serialize};

/// Totals computed by the pricing engine
///
/// All amounts are rounded to 2 decimal places.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: f64,
    pub line_discount_total: f64,
    pub storewide_discount_total: f64,
    pub tax: f64,
    pub service_charge: f64,
    pub total: f64,
}

impl OrderTotals {
    pub fn total_discount(&self) -> f64 {
        self.line_discount_total + self.storewide_discount_total
    }

    pub fn taxable_base(&self) -> f64 {
        self.subtotal - self.total_discount()
    }
}
