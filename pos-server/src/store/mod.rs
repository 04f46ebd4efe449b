//! Table Record Store
//!
//! The single source of truth every table viewer reads from and writes to.
//!
//! | Operation | Semantics |
//! |-----------|-----------|
//! | `create` / `delete` / `list` | table lifecycle |
//! | `read` | one-shot snapshot |
//! | `write` | partial-field write, last writer wins |
//! | `write_if` | conditional write against an expected prior state |
//! | `subscribe` | live whole-record snapshots of one table |
//! | `subscribe_query` | live filtered result set over all tables |
//!
//! Writes to one record are serialized by the backend. There is no
//! cross-record transaction.

mod error;
mod memory;
mod redb_store;
mod subscription;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryTableStore;
pub use redb_store::RedbTableStore;
pub use subscription::{
    ChangeFeed, QueryEvent, QuerySubscription, StoreEvent, TableChange, TableFilter,
    TableSubscription,
};

use async_trait::async_trait;
use shared::models::{Precondition, TablePatch, TableRecord};

/// Default capacity of the change feed
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Result of a conditional write
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    Applied(TableRecord),
    /// Precondition failed; carries the record as it currently is
    Rejected(TableRecord),
}

impl WriteOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub fn into_record(self) -> TableRecord {
        match self {
            Self::Applied(r) | Self::Rejected(r) => r,
        }
    }
}

/// Storage abstraction for table records
#[async_trait]
pub trait TableStore: Send + Sync {
    async fn create(&self, name: &str) -> StoreResult<TableRecord>;

    /// `false` when the table did not exist
    async fn delete(&self, table_id: i64) -> StoreResult<bool>;

    /// All tables, ordered by id
    async fn list(&self) -> StoreResult<Vec<TableRecord>>;

    async fn read(&self, table_id: i64) -> StoreResult<Option<TableRecord>>;

    async fn write(&self, table_id: i64, patch: TablePatch) -> StoreResult<TableRecord>;

    async fn write_if(
        &self,
        table_id: i64,
        expected: Precondition,
        patch: TablePatch,
    ) -> StoreResult<WriteOutcome>;

    fn subscribe(&self, table_id: i64) -> TableSubscription;

    fn subscribe_query(&self, filter: TableFilter) -> QuerySubscription;
}

/// Apply a patch in place and bump the revision
pub(crate) fn commit_patch(record: &mut TableRecord, patch: &TablePatch) {
    patch.apply_to(record);
    record.revision += 1;
}
