//! Transaction Model

use super::AppliedDiscount;
use crate::order::OrderTotals;
use serde::{Deserialize, Serialize};

/// Completed sale (交易记录), immutable once appended to the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub table_id: i64,
    pub table_name: String,
    pub staff_id: i64,
    pub staff_name: String,
    pub items: Vec<TransactionItem>,
    #[serde(default)]
    pub storewide_discount: Option<AppliedDiscount>,
    #[serde(flatten)]
    pub totals: OrderTotals,
    pub created_at: i64,
}

/// Line snapshot on a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionItem {
    pub food_id: i64,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
    #[serde(default)]
    pub discount: Option<f64>,
    #[serde(default)]
    pub note: Option<String>,
    /// price * quantity after the line discount
    pub line_total: f64,
}
