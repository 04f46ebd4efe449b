//! Data models
//!
//! Shared between pos-server and terminals (via API).
//! All IDs are `i64` (see [`crate::util::snowflake_id`]), all timestamps
//! are Unix milliseconds.

pub mod category;
pub mod dining_table;
pub mod discount;
pub mod food;
pub mod staff;
pub mod transaction;

// Re-exports
pub use category::*;
pub use dining_table::*;
pub use discount::*;
pub use food::*;
pub use staff::*;
pub use transaction::*;
