//! Order domain shared by every table viewer
//!
//! - [`OrderLine`]: one food snapshot plus quantity / discount / note
//! - [`OrderTotals`]: derived money view of an order
//! - [`lifecycle`]: the table-status state machine and the patches it writes

pub mod lifecycle;
pub mod line;
pub mod totals;

// Re-exports
pub use lifecycle::{TableTransition, TransitionOutcome};
pub use line::{MAX_PRICE, MAX_QUANTITY, OrderLine, is_valid_price, is_valid_quantity};
pub use totals::OrderTotals;
