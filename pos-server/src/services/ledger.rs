//! Transaction ledger
//!
//! Append-only record of completed sales. A transaction is immutable once
//! appended: items carry their own price snapshot.
//!
//! # Tables (redb)
//!
//! | Table | Key | Value |
//! |-------|-----|-------|
//! | `transactions` | `transaction_id` | JSON-serialized `Transaction` |

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::Transaction;
use thiserror::Error;

const TRANSACTIONS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("transactions");

#[async_trait]
pub trait TransactionLedger: Send + Sync {
    /// Returns the transaction id
    async fn append(&self, transaction: Transaction) -> AppResult<i64>;

    /// Newest first
    async fn list(&self) -> AppResult<Vec<Transaction>>;

    async fn get(&self, transaction_id: i64) -> AppResult<Transaction>;
}

fn not_found(transaction_id: i64) -> AppError {
    AppError::new(ErrorCode::TransactionNotFound).with_detail("transaction_id", transaction_id)
}

fn duplicate(transaction_id: i64) -> AppError {
    AppError::with_message(ErrorCode::AlreadyExists, "Transaction already recorded")
        .with_detail("transaction_id", transaction_id)
}

fn newest_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

// =============================================================================
// MemoryLedger
// =============================================================================

#[derive(Clone, Default)]
pub struct MemoryLedger {
    transactions: Arc<RwLock<Vec<Transaction>>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionLedger for MemoryLedger {
    async fn append(&self, transaction: Transaction) -> AppResult<i64> {
        let mut transactions = self.transactions.write();
        if transactions.iter().any(|t| t.id == transaction.id) {
            return Err(duplicate(transaction.id));
        }
        let id = transaction.id;
        transactions.push(transaction);
        Ok(id)
    }

    async fn list(&self) -> AppResult<Vec<Transaction>> {
        let mut all = self.transactions.read().clone();
        newest_first(&mut all);
        Ok(all)
    }

    async fn get(&self, transaction_id: i64) -> AppResult<Transaction> {
        self.transactions
            .read()
            .iter()
            .find(|t| t.id == transaction_id)
            .cloned()
            .ok_or_else(|| not_found(transaction_id))
    }
}

// =============================================================================
// RedbLedger
// =============================================================================

/// Ledger storage errors
#[derive(Debug, Error)]
pub enum LedgerError {
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
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        AppError::database(err.to_string())
    }
}

/// Durable ledger backed by redb
#[derive(Clone)]
pub struct RedbLedger {
    db: Arc<Database>,
}

impl RedbLedger {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        Self::init(Database::create(path)?)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self, LedgerError> {
        Self::init(Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?)
    }

    fn init(db: Database) -> Result<Self, LedgerError> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(TRANSACTIONS_TABLE)?;
        }
        write_txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Returns `false` when the id is already taken
    fn insert(&self, transaction: &Transaction) -> Result<bool, LedgerError> {
        let txn = self.db.begin_write()?;
        let inserted = {
            let mut table = txn.open_table(TRANSACTIONS_TABLE)?;
            if table.get(transaction.id)?.is_some() {
                false
            } else {
                let value = serde_json::to_vec(transaction)?;
                table.insert(transaction.id, value.as_slice())?;
                true
            }
        };
        txn.commit()?;
        Ok(inserted)
    }

    fn load(&self, transaction_id: i64) -> Result<Option<Transaction>, LedgerError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TRANSACTIONS_TABLE)?;
        match table.get(transaction_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn load_all(&self) -> Result<Vec<Transaction>, LedgerError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TRANSACTIONS_TABLE)?;
        let mut all = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            all.push(serde_json::from_slice(value.value())?);
        }
        Ok(all)
    }
}

#[async_trait]
impl TransactionLedger for RedbLedger {
    async fn append(&self, transaction: Transaction) -> AppResult<i64> {
        if !self.insert(&transaction)? {
            return Err(duplicate(transaction.id));
        }
        Ok(transaction.id)
    }

    async fn list(&self) -> AppResult<Vec<Transaction>> {
        let mut all = self.load_all()?;
        newest_first(&mut all);
        Ok(all)
    }

    async fn get(&self, transaction_id: i64) -> AppResult<Transaction> {
        self.load(transaction_id)?
            .ok_or_else(|| not_found(transaction_id))
    }
}
