//! In-process table store

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use shared::models::{Precondition, TablePatch, TableRecord};
use shared::util::{now_millis, snowflake_id};

use super::subscription::SnapshotSource;
use super::{
    ChangeFeed, QuerySubscription, StoreError, StoreResult, TableChange, TableFilter, TableStore,
    TableSubscription, WriteOutcome, commit_patch,
};

#[derive(Default)]
struct MemoryTables {
    tables: RwLock<HashMap<i64, TableRecord>>,
}

impl SnapshotSource for MemoryTables {
    fn load(&self, table_id: i64) -> StoreResult<Option<TableRecord>> {
        Ok(self.tables.read().get(&table_id).cloned())
    }

    fn load_all(&self) -> StoreResult<Vec<TableRecord>> {
        let mut all: Vec<_> = self.tables.read().values().cloned().collect();
        all.sort_by_key(|r| r.id);
        Ok(all)
    }
}

/// Table store held in memory, for tests and single-terminal setups
///
/// Changes are published while the write lock is held, so the feed order
/// matches commit order.
#[derive(Clone)]
pub struct MemoryTableStore {
    inner: Arc<MemoryTables>,
    feed: ChangeFeed,
}

impl MemoryTableStore {
    pub fn new() -> Self {
        Self::with_capacity(super::DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(MemoryTables::default()),
            feed: ChangeFeed::new(capacity),
        }
    }

    /// Insert a record as-is (fixtures, imports)
    pub fn insert(&self, record: TableRecord) {
        let mut tables = self.inner.tables.write();
        tables.insert(record.id, record.clone());
        self.feed.publish(TableChange::updated(record));
    }

    pub fn feed(&self) -> &ChangeFeed {
        &self.feed
    }
}

impl Default for MemoryTableStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TableStore for MemoryTableStore {
    async fn create(&self, name: &str) -> StoreResult<TableRecord> {
        let mut tables = self.inner.tables.write();
        let mut id = snowflake_id();
        while tables.contains_key(&id) {
            id = snowflake_id();
        }
        let record = TableRecord::new(id, name, now_millis());
        tables.insert(id, record.clone());
        self.feed.publish(TableChange::updated(record.clone()));
        Ok(record)
    }

    async fn delete(&self, table_id: i64) -> StoreResult<bool> {
        let mut tables = self.inner.tables.write();
        match tables.remove(&table_id) {
            Some(removed) => {
                self.feed.publish(TableChange::deleted(table_id, removed.revision));
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
        let mut tables = self.inner.tables.write();
        let record = tables
            .get_mut(&table_id)
            .ok_or(StoreError::TableNotFound(table_id))?;
        commit_patch(record, &patch);
        let record = record.clone();
        self.feed.publish(TableChange::updated(record.clone()));
        Ok(record)
    }

    async fn write_if(
        &self,
        table_id: i64,
        expected: Precondition,
        patch: TablePatch,
    ) -> StoreResult<WriteOutcome> {
        let mut tables = self.inner.tables.write();
        let record = tables
            .get_mut(&table_id)
            .ok_or(StoreError::TableNotFound(table_id))?;
        if !expected.matches(record) {
            return Ok(WriteOutcome::Rejected(record.clone()));
        }
        commit_patch(record, &patch);
        let record = record.clone();
        self.feed.publish(TableChange::updated(record.clone()));
        Ok(WriteOutcome::Applied(record))
    }

    fn subscribe(&self, table_id: i64) -> TableSubscription {
        TableSubscription::new(table_id, self.inner.clone(), &self.feed)
    }

    fn subscribe_query(&self, filter: TableFilter) -> QuerySubscription {
        QuerySubscription::new(filter, self.inner.clone(), &self.feed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{QueryEvent, StoreEvent};
    use shared::models::TableStatus;

    fn serving() -> TablePatch {
        TablePatch {
            status: Some(TableStatus::Serving),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_read_list_delete() {
        let store = MemoryTableStore::new();
        let t1 = store.create("T1").await.unwrap();
        let t2 = store.create("T2").await.unwrap();

        assert_eq!(store.read(t1.id).await.unwrap().unwrap().name, "T1");
        assert_eq!(store.list().await.unwrap().len(), 2);

        assert!(store.delete(t2.id).await.unwrap());
        assert!(!store.delete(t2.id).await.unwrap());
        assert!(store.read(t2.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_missing_table_fails() {
        let store = MemoryTableStore::new();
        let err = store.write(42, serving()).await.unwrap_err();
        assert!(matches!(err, StoreError::TableNotFound(42)));
    }

    #[tokio::test]
    async fn test_write_bumps_revision() {
        let store = MemoryTableStore::new();
        let t = store.create("T1").await.unwrap();
        let rec = store.write(t.id, serving()).await.unwrap();
        assert_eq!(rec.revision, 1);
        assert_eq!(rec.status, TableStatus::Serving);
    }

    #[tokio::test]
    async fn test_write_if_rejects_without_writing() {
        let store = MemoryTableStore::new();
        let t = store.create("T1").await.unwrap();

        let outcome = store
            .write_if(t.id, Precondition::status(TableStatus::OrderReady), serving())
            .await
            .unwrap();
        assert!(!outcome.is_applied());
        assert_eq!(store.read(t.id).await.unwrap().unwrap().revision, 0);

        let outcome = store
            .write_if(t.id, Precondition::status(TableStatus::Available), serving())
            .await
            .unwrap();
        assert!(outcome.is_applied());
    }

    #[tokio::test]
    async fn test_subscribe_delivers_current_then_changes() {
        let store = MemoryTableStore::new();
        let t = store.create("T1").await.unwrap();
        let mut sub = store.subscribe(t.id);

        match sub.recv().await.unwrap() {
            StoreEvent::Snapshot(rec) => assert_eq!(rec.status, TableStatus::Available),
            other => panic!("unexpected {:?}", other),
        }

        store.write(t.id, serving()).await.unwrap();
        match sub.recv().await.unwrap() {
            StoreEvent::Snapshot(rec) => assert_eq!(rec.status, TableStatus::Serving),
            other => panic!("unexpected {:?}", other),
        }

        store.delete(t.id).await.unwrap();
        assert!(matches!(sub.recv().await.unwrap(), StoreEvent::Missing));
    }

    #[tokio::test]
    async fn test_subscribe_ignores_other_tables() {
        let store = MemoryTableStore::new();
        let t1 = store.create("T1").await.unwrap();
        let t2 = store.create("T2").await.unwrap();
        let mut sub = store.subscribe(t1.id);
        sub.recv().await.unwrap();

        store.write(t2.id, serving()).await.unwrap();
        store.write(t1.id, serving()).await.unwrap();

        match sub.recv().await.unwrap() {
            StoreEvent::Snapshot(rec) => assert_eq!(rec.id, t1.id),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_subscribe_missing_table() {
        let store = MemoryTableStore::new();
        let mut sub = store.subscribe(7);
        assert!(matches!(sub.recv().await.unwrap(), StoreEvent::Missing));
    }

    #[tokio::test]
    async fn test_lagged_subscriber_reports_then_resyncs() {
        let store = MemoryTableStore::with_capacity(2);
        let t = store.create("T1").await.unwrap();
        let mut sub = store.subscribe(t.id);
        sub.recv().await.unwrap();

        for _ in 0..5 {
            store.write(t.id, serving()).await.unwrap();
        }

        assert!(matches!(sub.recv().await.unwrap(), StoreEvent::Unavailable(_)));
        match sub.recv().await.unwrap() {
            StoreEvent::Snapshot(rec) => assert_eq!(rec.revision, 5),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_query_subscription_filters() {
        let store = MemoryTableStore::new();
        let t1 = store.create("T1").await.unwrap();
        store.create("T2").await.unwrap();
        let mut sub = store.subscribe_query(TableFilter::status(TableStatus::Serving));

        match sub.recv().await.unwrap() {
            QueryEvent::Snapshot(rows) => assert!(rows.is_empty()),
            other => panic!("unexpected {:?}", other),
        }

        store.write(t1.id, serving()).await.unwrap();
        match sub.recv().await.unwrap() {
            QueryEvent::Snapshot(rows) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].id, t1.id);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_late_write_after_delete_does_not_revive() {
        let store = MemoryTableStore::new();
        let table = store.create("T1").await.unwrap();
        let mut sub = store.subscribe(table.id);
        let mut query = store.subscribe_query(TableFilter::all());
        sub.recv().await.unwrap();
        query.recv().await.unwrap();

        // committed before the delete, published after it
        let mut late = table.clone();
        late.revision += 1;
        late.name = "Late".to_string();
        store.delete(table.id).await.unwrap();
        store.feed().publish(TableChange::updated(late));
        let other = store.create("T2").await.unwrap();

        assert!(matches!(sub.recv().await.unwrap(), StoreEvent::Missing));
        let next = tokio::time::timeout(std::time::Duration::from_millis(50), sub.recv()).await;
        assert!(next.is_err());

        let mut rows = Vec::new();
        for _ in 0..3 {
            match query.recv().await.unwrap() {
                QueryEvent::Snapshot(current) => rows = current,
                event => panic!("unexpected {:?}", event),
            }
        }
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, other.id);
    }
}
