//! redb-backed table store
//!
//! # Tables
//!
//! | Table | Key | Value |
//! |-------|-----|-------|
//! | `dining_tables` | `table_id` | JSON-serialized `TableRecord` |
//!
//! Every write is one redb write transaction; redb serializes writers, so
//! read-modify-write of a single record is atomic. Change events are
//! published after commit.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use shared::models::{Precondition, TablePatch, TableRecord};
use shared::util::{now_millis, snowflake_id};

use super::subscription::SnapshotSource;
use super::{
    ChangeFeed, QuerySubscription, StoreError, StoreResult, TableChange, TableFilter, TableStore,
    TableSubscription, WriteOutcome, commit_patch,
};

/// key = table_id, value = JSON-serialized TableRecord
const TABLES_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("dining_tables");

struct RedbTables {
    db: Database,
}

impl RedbTables {
    fn get_txn(&self, txn: &WriteTransaction, table_id: i64) -> StoreResult<Option<TableRecord>> {
        let table = txn.open_table(TABLES_TABLE)?;
        match table.get(table_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn put_txn(&self, txn: &WriteTransaction, record: &TableRecord) -> StoreResult<()> {
        let mut table = txn.open_table(TABLES_TABLE)?;
        let value = serde_json::to_vec(record)?;
        table.insert(record.id, value.as_slice())?;
        Ok(())
    }
}

impl SnapshotSource for RedbTables {
    fn load(&self, table_id: i64) -> StoreResult<Option<TableRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLES_TABLE)?;
        match table.get(table_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn load_all(&self) -> StoreResult<Vec<TableRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLES_TABLE)?;

        let mut records = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            records.push(serde_json::from_slice(value.value())?);
        }
        // redb iterates in key order
        Ok(records)
    }
}

/// Durable table store
#[derive(Clone)]
pub struct RedbTableStore {
    inner: Arc<RedbTables>,
    feed: ChangeFeed,
}

impl RedbTableStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>, channel_capacity: usize) -> StoreResult<Self> {
        let db = Database::create(path)?;
        Self::init(db, channel_capacity)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db, super::DEFAULT_CHANNEL_CAPACITY)
    }

    fn init(db: Database, channel_capacity: usize) -> StoreResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(TABLES_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self {
            inner: Arc::new(RedbTables { db }),
            feed: ChangeFeed::new(channel_capacity),
        })
    }

    fn publish(&self, record: &TableRecord) {
        self.feed.publish(TableChange::updated(record.clone()));
    }
}

#[async_trait]
impl TableStore for RedbTableStore {
    async fn create(&self, name: &str) -> StoreResult<TableRecord> {
        let txn = self.inner.db.begin_write()?;
        let mut id = snowflake_id();
        while self.inner.get_txn(&txn, id)?.is_some() {
            id = snowflake_id();
        }
        let record = TableRecord::new(id, name, now_millis());
        self.inner.put_txn(&txn, &record)?;
        txn.commit()?;
        self.publish(&record);
        Ok(record)
    }

    async fn delete(&self, table_id: i64) -> StoreResult<bool> {
        let txn = self.inner.db.begin_write()?;
        let removed_revision = {
            let mut table = txn.open_table(TABLES_TABLE)?;
            let removed = table.remove(table_id)?;
            match removed {
                Some(guard) => Some(serde_json::from_slice::<TableRecord>(guard.value())?.revision),
                None => None,
            }
        };
        txn.commit()?;
        match removed_revision {
            Some(revision) => {
                self.feed.publish(TableChange::deleted(table_id, revision));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list(&self) -> StoreResult<Vec<TableRecord>> {
        self.inner.load_all()
    }

    async fn read(&self, table_id: i64) -> StoreResult<Option<TableRecord>> {
        self.inner.load(table_id)
    }

    async fn write(&self, table_id: i64, patch: TablePatch) -> StoreResult<TableRecord> {
        let txn = self.inner.db.begin_write()?;
        let mut record = self
            .inner
            .get_txn(&txn, table_id)?
            .ok_or(StoreError::TableNotFound(table_id))?;
        commit_patch(&mut record, &patch);
        self.inner.put_txn(&txn, &record)?;
        txn.commit()?;
        self.publish(&record);
        Ok(record)
    }

    async fn write_if(
        &self,
        table_id: i64,
        expected: Precondition,
        patch: TablePatch,
    ) -> StoreResult<WriteOutcome> {
        let txn = self.inner.db.begin_write()?;
        let mut record = self
            .inner
            .get_txn(&txn, table_id)?
            .ok_or(StoreError::TableNotFound(table_id))?;
        if !expected.matches(&record) {
            txn.abort()?;
            return Ok(WriteOutcome::Rejected(record));
        }
        commit_patch(&mut record, &patch);
        self.inner.put_txn(&txn, &record)?;
        txn.commit()?;
        self.publish(&record);
        Ok(WriteOutcome::Applied(record))
    }

    fn subscribe(&self, table_id: i64) -> TableSubscription {
        TableSubscription::new(table_id, self.inner.clone(), &self.feed)
    }

    fn subscribe_query(&self, filter: TableFilter) -> QuerySubscription {
        QuerySubscription::new(filter, self.inner.clone(), &self.feed)
    }
}
