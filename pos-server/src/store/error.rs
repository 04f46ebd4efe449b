//! Table store errors

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Table not found: {0}")]
    TableNotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Change feed lagged, {0} updates skipped")]
    Lagged(u64),

    #[error("Change feed closed")]
    Closed,
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::TableNotFound(id) => AppError::table_not_found(id),
            other => AppError::with_message(ErrorCode::StoreUnavailable, other.to_string()),
        }
    }
}
