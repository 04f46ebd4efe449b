//! Shared types for the restaurant POS
//!
//! Data model (tables, order lines, catalog snapshots, transactions), the
//! table-status state machine every viewer agrees on, and the unified error
//! system used by `pos-server` and its HTTP clients.

pub mod error;
pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
