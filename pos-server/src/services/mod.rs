//! External collaborators of the POS core
//!
//! - [`Catalog`] - categories, foods and storewide discounts (read-only to the core)
//! - [`StaffRoster`] - staff members for the PIN gate
//! - [`TransactionLedger`] - completed sales, append-only
//! - [`seed`] - `catalog.json` / `staff.json` loaded at startup

pub mod catalog;
pub mod ledger;
pub mod roster;
pub mod seed;

pub use catalog::{Catalog, MemoryCatalog};
pub use ledger::{LedgerError, MemoryLedger, RedbLedger, TransactionLedger};
pub use roster::{MemoryStaffRoster, StaffRoster};
pub use seed::CatalogSeed;
