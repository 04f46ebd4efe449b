//! Kitchen Queue Projector (后厨队列)
//!
//! Projects the tables that have an order in the kitchen, oldest first,
//! and drives the two kitchen transitions:
//!
//! ```text
//!   serving/pending ──accept──▶ serving/in_progress ──prepared──▶ order_ready
//! ```
//!
//! Both transitions are conditional writes. If the table moved on in the
//! meantime (served, paid, reset), the action is skipped and reported as
//! [`TransitionOutcome::Stale`] instead of failing.

use std::cmp::Ordering;
use std::sync::Arc;

use shared::error::AppResult;
use shared::models::{TablePatch, TableRecord};
use shared::order::{TableTransition, TransitionOutcome, lifecycle};

use crate::store::{
    QueryEvent, QuerySubscription, StoreError, TableFilter, TableStore, WriteOutcome,
};

/// Oldest order first; tables without a placement time go last, by id
pub fn queue_order(a: &TableRecord, b: &TableRecord) -> Ordering {
    match (a.order_placed_at, b.order_placed_at) {
        (Some(x), Some(y)) => x.cmp(&y).then(a.id.cmp(&b.id)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.id.cmp(&b.id),
    }
}

/// Keep only kitchen-relevant tables and sort them for display
pub fn project(records: impl IntoIterator<Item = TableRecord>) -> Vec<TableRecord> {
    let filter = TableFilter::kitchen();
    let mut queue: Vec<_> = records.into_iter().filter(|r| filter.matches(r)).collect();
    queue.sort_by(queue_order);
    queue
}

#[derive(Clone)]
pub struct KitchenQueue {
    store: Arc<dyn TableStore>,
}

impl KitchenQueue {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    /// Current queue from a one-shot read
    pub async fn queue(&self) -> AppResult<Vec<TableRecord>> {
        Ok(project(self.store.list().await?))
    }

    /// Live queue; every event carries the full, sorted queue
    pub fn subscribe(&self) -> KitchenFeed {
        KitchenFeed {
            inner: self.store.subscribe_query(TableFilter::kitchen()),
        }
    }

    /// pending -> in_progress
    pub async fn accept_order(&self, table_id: i64) -> AppResult<TransitionOutcome> {
        self.transition(table_id, TableTransition::AcceptOrder, lifecycle::accept_order())
            .await
    }

    /// serving -> order_ready
    pub async fn mark_prepared(&self, table_id: i64) -> AppResult<TransitionOutcome> {
        self.transition(table_id, TableTransition::MarkPrepared, lifecycle::mark_prepared())
            .await
    }

    async fn transition(
        &self,
        table_id: i64,
        transition: TableTransition,
        patch: TablePatch,
    ) -> AppResult<TransitionOutcome> {
        let outcome = self
            .store
            .write_if(table_id, transition.precondition(), patch)
            .await;

        match outcome {
            Ok(WriteOutcome::Applied(record)) => {
                tracing::info!(
                    table_id,
                    transition = transition.name(),
                    revision = record.revision,
                    "Kitchen transition applied"
                );
                Ok(TransitionOutcome::Applied(record))
            }
            Ok(WriteOutcome::Rejected(current)) => {
                let reason = format!(
                    "table is {:?} with {} line(s)",
                    current.status,
                    current.order.len()
                );
                tracing::warn!(table_id, transition = transition.name(), %reason, "Skipped stale kitchen action");
                Ok(TransitionOutcome::Stale { table_id, reason })
            }
            Err(StoreError::TableNotFound(_)) => {
                tracing::warn!(table_id, transition = transition.name(), "Skipped kitchen action on deleted table");
                Ok(TransitionOutcome::Stale {
                    table_id,
                    reason: "table no longer exists".to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Live kitchen queue. Dropping it unsubscribes.
pub struct KitchenFeed {
    inner: QuerySubscription,
}

impl KitchenFeed {
    /// Next queue state, already sorted. `None` once the feed is closed.
    pub async fn recv(&mut self) -> Option<QueryEvent> {
        Some(match self.inner.recv().await? {
            QueryEvent::Snapshot(records) => QueryEvent::Snapshot(project(records)),
            unavailable => unavailable,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTableStore;
    use shared::models::{FoodSnapshot, KitchenStatus, StaffMember, TableStatus};
    use shared::order::OrderLine;

    fn lines() -> Vec<OrderLine> {
        vec![OrderLine::new(FoodSnapshot {
            id: 1,
            name: "Noodles".to_string(),
            price: 12.0,
            description: String::new(),
            category_id: 1,
        })]
    }

    async fn place(store: &MemoryTableStore, name: &str, at: i64) -> TableRecord {
        let staff = StaffMember::new(1, "Alice", "1234");
        let table = store.create(name).await.unwrap();
        store
            .write(table.id, lifecycle::place_order(&table, lines(), &staff, at))
            .await
            .unwrap()
    }

    #[test]
    fn test_queue_order_missing_placed_at_last() {
        let mut a = TableRecord::new(1, "A", 0);
        let mut b = TableRecord::new(2, "B", 0);
        let c = TableRecord::new(3, "C", 0);
        a.order_placed_at = Some(200);
        b.order_placed_at = Some(100);

        let mut all = vec![c.clone(), a.clone(), b.clone()];
        all.sort_by(queue_order);
        let ids: Vec<_> = all.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[tokio::test]
    async fn test_queue_sorted_and_filtered() {
        let store = Arc::new(MemoryTableStore::new());
        let late = place(&store, "Late", 2_000).await;
        let early = place(&store, "Early", 1_000).await;
        store.create("Empty").await.unwrap();

        let kitchen = KitchenQueue::new(store.clone());
        let queue = kitchen.queue().await.unwrap();
        let ids: Vec<_> = queue.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![early.id, late.id]);
    }

    #[tokio::test]
    async fn test_accept_then_prepare() {
        let store = Arc::new(MemoryTableStore::new());
        let table = place(&store, "T1", 1_000).await;
        let kitchen = KitchenQueue::new(store.clone());

        let outcome = kitchen.accept_order(table.id).await.unwrap();
        let TransitionOutcome::Applied(record) = outcome else {
            panic!("expected applied");
        };
        assert_eq!(record.kitchen_status, Some(KitchenStatus::InProgress));

        let outcome = kitchen.mark_prepared(table.id).await.unwrap();
        let TransitionOutcome::Applied(record) = outcome else {
            panic!("expected applied");
        };
        assert_eq!(record.status, TableStatus::OrderReady);
        assert!(kitchen.queue().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_prepared_after_clear_is_stale() {
        let store = Arc::new(MemoryTableStore::new());
        let table = place(&store, "T1", 1_000).await;
        store.write(table.id, lifecycle::clear()).await.unwrap();

        let kitchen = KitchenQueue::new(store.clone());
        let outcome = kitchen.mark_prepared(table.id).await.unwrap();
        assert!(matches!(outcome, TransitionOutcome::Stale { .. }));

        let record = store.read(table.id).await.unwrap().unwrap();
        assert_eq!(record.status, TableStatus::Available);
    }

    #[tokio::test]
    async fn test_action_on_deleted_table_is_stale() {
        let store = Arc::new(MemoryTableStore::new());
        let table = place(&store, "T1", 1_000).await;
        store.delete(table.id).await.unwrap();

        let kitchen = KitchenQueue::new(store.clone());
        let outcome = kitchen.accept_order(table.id).await.unwrap();
        assert!(!outcome.is_applied());
    }

    #[tokio::test]
    async fn test_feed_tracks_new_orders() {
        let store = Arc::new(MemoryTableStore::new());
        let kitchen = KitchenQueue::new(store.clone());
        let mut feed = kitchen.subscribe();

        let Some(QueryEvent::Snapshot(initial)) = feed.recv().await else {
            panic!("expected snapshot");
        };
        assert!(initial.is_empty());

        let table = store.create("T1").await.unwrap();
        let Some(QueryEvent::Snapshot(queue)) = feed.recv().await else {
            panic!("expected snapshot");
        };
        assert!(queue.is_empty());

        let staff = StaffMember::new(1, "Alice", "1234");
        store
            .write(table.id, lifecycle::place_order(&table, lines(), &staff, 5))
            .await
            .unwrap();
        let Some(QueryEvent::Snapshot(queue)) = feed.recv().await else {
            panic!("expected snapshot");
        };
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].order_placed_at, Some(5));
    }
}
