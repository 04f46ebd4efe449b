//! Table status state machine (桌台状态机)
//!
//! ```text
//!   available ──save(non-empty)──▶ serving ──prepared──▶ order_ready
//!       ▲                          │  pending ─accept─▶ in_progress
//!       │                          │
//!       └──── served / save(empty) / pay / reset ◀──────┘
//! ```
//!
//! Every transition is expressed as a [`TablePatch`] plus the
//! [`Precondition`] under which it is valid. Writers may apply the patch
//! unconditionally (last writer wins) or through the store's conditional
//! write.

use super::OrderLine;
use crate::models::{KitchenStatus, Precondition, StaffMember, TablePatch, TableRecord, TableStatus};

/// Named transitions of the shared table contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableTransition {
    /// POS save with a non-empty order
    PlaceOrder,
    /// Kitchen picks the order up
    AcceptOrder,
    /// Kitchen finished cooking
    MarkPrepared,
    /// Front-of-house handed the food over
    MarkServed,
    /// Full reset from any state
    Clear,
}

impl TableTransition {
    pub fn precondition(&self) -> Precondition {
        match self {
            Self::AcceptOrder | Self::MarkPrepared => {
                Precondition::status(TableStatus::Serving).with_order()
            }
            Self::MarkServed => Precondition::status(TableStatus::OrderReady),
            Self::PlaceOrder | Self::Clear => Precondition::default(),
        }
    }

    pub fn is_allowed(&self, record: &TableRecord) -> bool {
        self.precondition().matches(record)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::PlaceOrder => "place_order",
            Self::AcceptOrder => "accept_order",
            Self::MarkPrepared => "mark_prepared",
            Self::MarkServed => "mark_served",
            Self::Clear => "clear",
        }
    }
}

/// Result of a kitchen / serve transition
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    Applied(TableRecord),
    /// Precondition no longer held; nothing was written
    Stale { table_id: i64, reason: String },
}

impl TransitionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Reset occupancy, order and kitchen state
pub fn clear() -> TablePatch {
    TablePatch {
        name: None,
        status: Some(TableStatus::Available),
        occupied_by: Some(None),
        staff_id: Some(None),
        order: Some(Vec::new()),
        order_placed_at: Some(None),
        kitchen_status: Some(None),
    }
}

/// Patch written by a POS save
///
/// An empty order clears the table. `order_placed_at` and the kitchen
/// sub-state are only stamped when the table was not already serving, so
/// re-saving keeps its queue position.
pub fn place_order(
    prior: &TableRecord,
    lines: Vec<OrderLine>,
    staff: &StaffMember,
    now: i64,
) -> TablePatch {
    if lines.is_empty() {
        return clear();
    }

    let mut patch = TablePatch {
        status: Some(TableStatus::Serving),
        occupied_by: Some(Some(staff.name.clone())),
        staff_id: Some(Some(staff.id)),
        order: Some(lines),
        ..Default::default()
    };
    if prior.status != TableStatus::Serving {
        patch.order_placed_at = Some(Some(now));
        patch.kitchen_status = Some(Some(KitchenStatus::Pending));
    }
    patch
}

pub fn accept_order() -> TablePatch {
    TablePatch {
        kitchen_status: Some(Some(KitchenStatus::InProgress)),
        ..Default::default()
    }
}

pub fn mark_prepared() -> TablePatch {
    TablePatch {
        status: Some(TableStatus::OrderReady),
        ..Default::default()
    }
}

pub fn mark_served() -> TablePatch {
    clear()
}
