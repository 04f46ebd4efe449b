//! Pending-Order Tracker (取餐跟踪)
//!
//! Single-table view for front-of-house: shows where the order is in the
//! kitchen and completes the `order_ready -> available` hand-off.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{KitchenStatus, TableRecord, TableStatus};
use shared::order::{TableTransition, lifecycle};

use crate::store::{StoreEvent, TableStore, TableSubscription, WriteOutcome};

/// Display status derived from `(status, kitchen_status)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingDisplay {
    #[serde(rename = "Pending in Kitchen")]
    PendingInKitchen,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Ready for Pickup")]
    ReadyForPickup,
}

impl PendingDisplay {
    pub fn of(record: &TableRecord) -> Self {
        match (record.status, record.kitchen_status) {
            (TableStatus::OrderReady, _) => Self::ReadyForPickup,
            (TableStatus::Serving, Some(KitchenStatus::InProgress)) => Self::InProgress,
            _ => Self::PendingInKitchen,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::PendingInKitchen => "Pending in Kitchen",
            Self::InProgress => "In Progress",
            Self::ReadyForPickup => "Ready for Pickup",
        }
    }
}

/// What the tracker screen should do after an update
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerView {
    /// Keep showing the order
    Tracking {
        record: TableRecord,
        display: PendingDisplay,
    },
    /// Table is available (or gone); leave the screen
    AlreadyCleared,
    /// Feed failed; keep the last view and show "disconnected"
    Disconnected,
}

impl TrackerView {
    /// `available` and missing both mean there is nothing left to serve
    pub fn from_record(record: Option<TableRecord>) -> Self {
        match record {
            Some(record) if record.status != TableStatus::Available => Self::Tracking {
                display: PendingDisplay::of(&record),
                record,
            },
            _ => Self::AlreadyCleared,
        }
    }

    pub fn should_redirect(&self) -> bool {
        matches!(self, Self::AlreadyCleared)
    }
}

/// Result of a successful `mark_as_served`
#[derive(Debug, Clone, PartialEq)]
pub struct Served {
    pub record: TableRecord,
    /// Always set; the tracked table is no longer servable
    pub navigate_away: bool,
}

pub struct PendingOrderTracker {
    table_id: i64,
    store: Arc<dyn TableStore>,
    subscription: Option<TableSubscription>,
    last: Option<TableRecord>,
    connected: bool,
}

impl PendingOrderTracker {
    pub fn new(table_id: i64, store: Arc<dyn TableStore>) -> Self {
        Self {
            table_id,
            store,
            subscription: None,
            last: None,
            connected: false,
        }
    }

    pub fn table_id(&self) -> i64 {
        self.table_id
    }

    pub fn record(&self) -> Option<&TableRecord> {
        self.last.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Display status of the last snapshot seen
    pub fn display(&self) -> Option<PendingDisplay> {
        self.last
            .as_ref()
            .filter(|r| r.status != TableStatus::Available)
            .map(PendingDisplay::of)
    }

    /// One-shot read, without subscribing
    pub async fn refresh(&mut self) -> AppResult<TrackerView> {
        let record = self.store.read(self.table_id).await?;
        self.connected = true;
        self.last = record.clone();
        Ok(TrackerView::from_record(record))
    }

    pub fn attach(&mut self) {
        self.subscription = Some(self.store.subscribe(self.table_id));
    }

    /// Navigating away unsubscribes
    pub fn detach(&mut self) {
        self.subscription = None;
    }

    /// Wait for the next snapshot. `None` when detached or the feed closed.
    pub async fn next_update(&mut self) -> Option<TrackerView> {
        let event = self.subscription.as_mut()?.recv().await?;
        Some(self.apply_event(event))
    }

    pub fn apply_event(&mut self, event: StoreEvent) -> TrackerView {
        match event {
            StoreEvent::Snapshot(record) => {
                self.connected = true;
                self.last = Some(record.clone());
                let view = TrackerView::from_record(Some(record));
                if view.should_redirect() {
                    tracing::info!(table_id = self.table_id, "Tracked table already cleared");
                }
                view
            }
            StoreEvent::Missing => {
                self.connected = true;
                self.last = None;
                TrackerView::AlreadyCleared
            }
            StoreEvent::Unavailable(err) => {
                tracing::warn!(table_id = self.table_id, error = %err, "Tracker feed disconnected");
                self.connected = false;
                TrackerView::Disconnected
            }
        }
    }

    /// order_ready -> available
    ///
    /// Fails with `OrderNotReady` unless the table is currently `order_ready`;
    /// the check and the clear are one conditional write.
    pub async fn mark_as_served(&mut self) -> AppResult<Served> {
        let transition = TableTransition::MarkServed;
        let outcome = self
            .store
            .write_if(self.table_id, transition.precondition(), lifecycle::mark_served())
            .await?;

        match outcome {
            WriteOutcome::Applied(record) => {
                tracing::info!(table_id = self.table_id, "Order served, table cleared");
                self.last = Some(record.clone());
                self.detach();
                Ok(Served {
                    record,
                    navigate_away: true,
                })
            }
            WriteOutcome::Rejected(current) => {
                self.last = Some(current.clone());
                Err(AppError::new(ErrorCode::OrderNotReady)
                    .with_detail("table_id", self.table_id)
                    .with_detail("status", format!("{:?}", current.status)))
            }
        }
    }
}
