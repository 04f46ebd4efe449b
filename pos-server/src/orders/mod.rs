//! Order building for one table
//!
//! - [`OrderBuilder`]: local line edits, save, payment, live mirror
//! - [`ItemEditor`]: text form for editing a single line

mod builder;
mod editor;

pub use builder::{LineItem, OrderBuilder};
pub use editor::{ItemEdit, ItemEditor, parse_discount, parse_quantity};
