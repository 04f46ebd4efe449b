//! Live subscriptions over the table change feed
//!
//! ```text
//!  writer ──commit──▶ ChangeFeed (broadcast::Sender<TableChange>)
//!                        │
//!          ┌─────────────┼──────────────┐
//!          ▼             ▼              ▼
//!   TableSubscription  TableSubscription  QuerySubscription
//!   (POS, table 3)     (tracker, table 3) (kitchen queue)
//! ```
//!
//! Each subscription yields whole-record snapshots only. Events carrying a
//! revision at or below the last one delivered are dropped, so every
//! subscriber sees a monotonic sequence per table even when writers publish
//! out of order. A delete carries the removed record's revision plus one and
//! stays behind as a tombstone: a write that committed before the delete but
//! published after it cannot bring the table back. A lagged receiver reports
//! `Unavailable` once, then reloads from the backend on the next `recv`.

use std::collections::BTreeMap;
use std::sync::Arc;

use shared::error::AppError;
use shared::models::{TableRecord, TableStatus};
use tokio::sync::broadcast;

use super::error::{StoreError, StoreResult};

/// One committed write; `record == None` means the table was deleted
#[derive(Debug, Clone)]
pub struct TableChange {
    pub table_id: i64,
    pub record: Option<TableRecord>,
    /// Record revision, or the tombstone revision for a delete
    pub revision: u64,
}

impl TableChange {
    pub fn updated(record: TableRecord) -> Self {
        Self {
            table_id: record.id,
            revision: record.revision,
            record: Some(record),
        }
    }

    /// `last_revision` is the revision of the record that was removed
    pub fn deleted(table_id: i64, last_revision: u64) -> Self {
        Self {
            table_id,
            record: None,
            revision: last_revision + 1,
        }
    }
}

/// Synchronous point reads used to seed and resync subscriptions
pub(crate) trait SnapshotSource: Send + Sync {
    fn load(&self, table_id: i64) -> StoreResult<Option<TableRecord>>;
    fn load_all(&self) -> StoreResult<Vec<TableRecord>>;
}

/// Broadcast change feed shared by every backend
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<TableChange>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn publish(&self, change: TableChange) {
        // no receivers is fine
        let _ = self.tx.send(change);
    }

    pub fn receiver(&self) -> broadcast::Receiver<TableChange> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Event delivered to a single-table subscriber
#[derive(Debug, Clone)]
pub enum StoreEvent {
    Snapshot(TableRecord),
    /// Table does not exist (never created, or deleted)
    Missing,
    /// Feed failed; keep the last snapshot and show "disconnected"
    Unavailable(AppError),
}

/// Multi-record query filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableFilter {
    pub status: Option<TableStatus>,
    pub has_order: bool,
}

impl TableFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn status(status: TableStatus) -> Self {
        Self {
            status: Some(status),
            has_order: false,
        }
    }

    /// Serving tables with at least one line
    pub fn kitchen() -> Self {
        Self {
            status: Some(TableStatus::Serving),
            has_order: true,
        }
    }

    pub fn matches(&self, record: &TableRecord) -> bool {
        self.status.is_none_or(|s| s == record.status) && (!self.has_order || record.has_order())
    }
}

/// Event delivered to a query subscriber: the full filtered set, by id
#[derive(Debug, Clone)]
pub enum QueryEvent {
    Snapshot(Vec<TableRecord>),
    Unavailable(AppError),
}

enum FeedState {
    /// Needs a fresh read from the backend before the next change
    Resync,
    Live,
    Closed,
}

/// Live view of one table. Dropping it unsubscribes.
pub struct TableSubscription {
    table_id: i64,
    source: Arc<dyn SnapshotSource>,
    rx: broadcast::Receiver<TableChange>,
    state: FeedState,
    last_revision: Option<u64>,
}

impl TableSubscription {
    pub(crate) fn new(table_id: i64, source: Arc<dyn SnapshotSource>, feed: &ChangeFeed) -> Self {
        let rx = feed.receiver();
        Self {
            table_id,
            source,
            rx,
            state: FeedState::Resync,
            last_revision: None,
        }
    }

    pub fn table_id(&self) -> i64 {
        self.table_id
    }

    /// Wait for the next event. `None` once the feed is closed and reported.
    pub async fn recv(&mut self) -> Option<StoreEvent> {
        loop {
            match self.state {
                FeedState::Closed => return None,
                FeedState::Resync => {
                    // drain anything already covered by the fresh read
                    self.rx = self.rx.resubscribe();
                    self.state = FeedState::Live;
                    return Some(match self.source.load(self.table_id) {
                        Ok(record) => self.deliver(record),
                        Err(e) => {
                            self.state = FeedState::Resync;
                            StoreEvent::Unavailable(e.into())
                        }
                    });
                }
                FeedState::Live => match self.rx.recv().await {
                    Ok(change) if change.table_id == self.table_id => {
                        if let Some(event) = self.accept(change) {
                            return Some(event);
                        }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(table_id = self.table_id, skipped, "Table subscription lagged");
                        self.state = FeedState::Resync;
                        return Some(StoreEvent::Unavailable(StoreError::Lagged(skipped).into()));
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        self.state = FeedState::Closed;
                        return Some(StoreEvent::Unavailable(StoreError::Closed.into()));
                    }
                },
            }
        }
    }

    fn accept(&mut self, change: TableChange) -> Option<StoreEvent> {
        if self.last_revision.is_some_and(|last| change.revision <= last) {
            return None;
        }
        self.last_revision = Some(change.revision);
        Some(match change.record {
            Some(rec) => StoreEvent::Snapshot(rec),
            None => StoreEvent::Missing,
        })
    }

    /// Result of a fresh read; a missing table keeps any tombstone
    fn deliver(&mut self, record: Option<TableRecord>) -> StoreEvent {
        match record {
            Some(rec) => {
                self.last_revision = Some(rec.revision);
                StoreEvent::Snapshot(rec)
            }
            None => StoreEvent::Missing,
        }
    }
}

/// Live filtered view over all tables. Dropping it unsubscribes.
pub struct QuerySubscription {
    filter: TableFilter,
    source: Arc<dyn SnapshotSource>,
    rx: broadcast::Receiver<TableChange>,
    state: FeedState,
    records: BTreeMap<i64, TableRecord>,
    /// Deleted table id -> tombstone revision
    tombstones: BTreeMap<i64, u64>,
}

impl QuerySubscription {
    pub(crate) fn new(filter: TableFilter, source: Arc<dyn SnapshotSource>, feed: &ChangeFeed) -> Self {
        let rx = feed.receiver();
        Self {
            filter,
            source,
            rx,
            state: FeedState::Resync,
            records: BTreeMap::new(),
            tombstones: BTreeMap::new(),
        }
    }

    pub fn filter(&self) -> TableFilter {
        self.filter
    }

    /// Wait for the next result set. `None` once the feed is closed and reported.
    pub async fn recv(&mut self) -> Option<QueryEvent> {
        match self.state {
            FeedState::Closed => None,
            FeedState::Resync => {
                self.rx = self.rx.resubscribe();
                match self.source.load_all() {
                    Ok(all) => {
                        self.records = all.into_iter().map(|r| (r.id, r)).collect();
                        self.state = FeedState::Live;
                        Some(QueryEvent::Snapshot(self.current()))
                    }
                    Err(e) => Some(QueryEvent::Unavailable(e.into())),
                }
            }
            FeedState::Live => match self.rx.recv().await {
                Ok(change) => {
                    self.apply(change);
                    Some(QueryEvent::Snapshot(self.current()))
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Query subscription lagged");
                    self.state = FeedState::Resync;
                    Some(QueryEvent::Unavailable(StoreError::Lagged(skipped).into()))
                }
                Err(broadcast::error::RecvError::Closed) => {
                    self.state = FeedState::Closed;
                    Some(QueryEvent::Unavailable(StoreError::Closed.into()))
                }
            },
        }
    }

    fn apply(&mut self, change: TableChange) {
        match change.record {
            Some(rec) => {
                let stale = self
                    .records
                    .get(&rec.id)
                    .is_some_and(|known| rec.revision <= known.revision)
                    || self
                        .tombstones
                        .get(&rec.id)
                        .is_some_and(|tombstone| rec.revision <= *tombstone);
                if !stale {
                    self.records.insert(rec.id, rec);
                }
            }
            None => {
                self.records.remove(&change.table_id);
                self.tombstones.insert(change.table_id, change.revision);
            }
        }
    }

    fn current(&self) -> Vec<TableRecord> {
        self.records
            .values()
            .filter(|r| self.filter.matches(r))
            .cloned()
            .collect()
    }
}
