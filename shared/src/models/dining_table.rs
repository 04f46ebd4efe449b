//! Dining Table Model
//!
//! One [`TableRecord`] per physical table. Every viewer (POS, kitchen,
//! pending-order tracker) reads and writes the same record through the
//! table store; partial writes are expressed as a [`TablePatch`].

use crate::order::OrderLine;
use serde::{Deserialize, Serialize};

/// Top-level table status (桌台状态)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    #[default]
    Available,
    Serving,
    OrderReady,
}

/// Kitchen sub-state, only meaningful while `Serving`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KitchenStatus {
    Pending,
    InProgress,
}

/// Dining table record (桌台)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRecord {
    pub id: i64,
    pub name: String,
    /// Missing in stored JSON means `available`
    #[serde(default)]
    pub status: TableStatus,
    /// Name of the staff member holding the session
    #[serde(default)]
    pub occupied_by: Option<String>,
    #[serde(default)]
    pub staff_id: Option<i64>,
    #[serde(default)]
    pub order: Vec<OrderLine>,
    /// Stamped on first entry into `serving` only
    #[serde(default)]
    pub order_placed_at: Option<i64>,
    #[serde(default)]
    pub kitchen_status: Option<KitchenStatus>,
    pub created_at: i64,
    /// Bumped by the store on every committed write
    #[serde(default)]
    pub revision: u64,
}

impl TableRecord {
    pub fn new(id: i64, name: impl Into<String>, created_at: i64) -> Self {
        Self {
            id,
            name: name.into(),
            status: TableStatus::Available,
            occupied_by: None,
            staff_id: None,
            order: Vec::new(),
            order_placed_at: None,
            kitchen_status: None,
            created_at,
            revision: 0,
        }
    }

    /// Derived from `status`, never stored
    pub fn is_occupied(&self) -> bool {
        self.status != TableStatus::Available
    }

    /// Occupied by someone other than `staff_id`
    pub fn is_held_by_other(&self, staff_id: i64) -> bool {
        self.is_occupied() && self.staff_id.is_some_and(|id| id != staff_id)
    }

    pub fn has_order(&self) -> bool {
        !self.order.is_empty()
    }
}

/// Partial-field write against a [`TableRecord`]
///
/// `None` leaves the field untouched; `Some(None)` nulls a nullable field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TablePatch {
    pub name: Option<String>,
    pub status: Option<TableStatus>,
    pub occupied_by: Option<Option<String>>,
    pub staff_id: Option<Option<i64>>,
    pub order: Option<Vec<OrderLine>>,
    pub order_placed_at: Option<Option<i64>>,
    pub kitchen_status: Option<Option<KitchenStatus>>,
}

impl TablePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn apply_to(&self, record: &mut TableRecord) {
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(by) = &self.occupied_by {
            record.occupied_by = by.clone();
        }
        if let Some(staff_id) = self.staff_id {
            record.staff_id = staff_id;
        }
        if let Some(order) = &self.order {
            record.order = order.clone();
        }
        if let Some(at) = self.order_placed_at {
            record.order_placed_at = at;
        }
        if let Some(ks) = self.kitchen_status {
            record.kitchen_status = ks;
        }
    }
}

/// Expected prior state for a conditional write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Precondition {
    pub status: Option<TableStatus>,
    /// Record must carry at least one order line
    pub has_order: bool,
    /// Record must be free or held by this staff member
    pub held_by: Option<i64>,
}

impl Precondition {
    pub fn status(status: TableStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn with_order(mut self) -> Self {
        self.has_order = true;
        self
    }

    pub fn held_by(mut self, staff_id: i64) -> Self {
        self.held_by = Some(staff_id);
        self
    }

    pub fn matches(&self, record: &TableRecord) -> bool {
        if self.status.is_some_and(|s| s != record.status) {
            return false;
        }
        if self.has_order && !record.has_order() {
            return false;
        }
        !self
            .held_by
            .is_some_and(|staff_id| record.is_held_by_other(staff_id))
    }
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableCreate {
    pub name: String,
}

/// Update dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableUpdate {
    pub name: Option<String>,
}
