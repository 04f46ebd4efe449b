//! Pricing Engine
//!
//! Pure computation over order lines and an optional storewide discount.
//! Uses rust_decimal internally, f64 on the wire.

mod calculator;
pub mod matcher;

pub use calculator::*;
pub use matcher::*;
