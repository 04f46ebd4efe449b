//! Order Builder (点单)
//!
//! Owns the order lines for one table on one terminal.
//!
//! ```text
//!   add / inc / dec / remove / edit      (local, guarded by the PIN gate)
//!              │
//!              ▼
//!        local lines ──save_order──▶ TableStore.write ──▶ change feed
//!              ▲                                              │
//!              └──────────── snapshot overwrites ◀────────────┘
//! ```
//!
//! The local mirror is disposable: any snapshot from the store replaces
//! it. Line ids are local only and are never written to the store.

use std::sync::Arc;

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    AppliedDiscount, Discount, Food, Precondition, StaffMember, TableRecord, Transaction,
    TransactionItem,
};
use shared::order::{MAX_PRICE, MAX_QUANTITY, OrderLine, OrderTotals, is_valid_price, lifecycle};
use shared::util::{now_millis, snowflake_id};

use super::editor::{ItemEdit, ItemEditor};
use crate::auth::{KeypadResult, SessionState, StaffSessionGate};
use crate::pricing::{PricingConfig, compute_totals, is_eligible, line_total};
use crate::services::{Catalog, TransactionLedger};
use crate::store::{StoreEvent, TableStore, TableSubscription, WriteOutcome};

/// Conditional save attempts before giving up with `TableStale`
const SAVE_ATTEMPTS: usize = 3;

fn quantity_limit(line_id: u64) -> AppError {
    AppError::new(ErrorCode::InvalidQuantity)
        .with_detail("line_id", line_id)
        .with_detail("max", MAX_QUANTITY)
}

/// Order line with its terminal-local id
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub line_id: u64,
    pub line: OrderLine,
}

pub struct OrderBuilder {
    table_id: i64,
    store: Arc<dyn TableStore>,
    ledger: Arc<dyn TransactionLedger>,
    pricing: PricingConfig,
    gate: StaffSessionGate,
    lines: Vec<LineItem>,
    next_line_id: u64,
    storewide: Option<Discount>,
    totals: OrderTotals,
    /// Last snapshot received from the store
    remote: Option<TableRecord>,
    subscription: Option<TableSubscription>,
    connected: bool,
    editor: Option<ItemEditor>,
    pending_payment: Option<Transaction>,
}

impl std::fmt::Debug for OrderBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderBuilder")
            .field("table_id", &self.table_id)
            .field("lines", &self.lines.len())
            .field("storewide", &self.storewide.as_ref().map(|d| d.id))
            .field("connected", &self.connected)
            .field("pending_payment", &self.pending_payment.as_ref().map(|t| t.id))
            .finish()
    }
}

impl OrderBuilder {
    pub fn new(
        table_id: i64,
        store: Arc<dyn TableStore>,
        ledger: Arc<dyn TransactionLedger>,
        pricing: PricingConfig,
    ) -> Self {
        Self {
            table_id,
            store,
            ledger,
            pricing,
            gate: StaffSessionGate::new(),
            lines: Vec::new(),
            next_line_id: 1,
            storewide: None,
            totals: OrderTotals::default(),
            remote: None,
            subscription: None,
            connected: false,
            editor: None,
            pending_payment: None,
        }
    }

    // ========== Read-only view ==========

    pub fn table_id(&self) -> i64 {
        self.table_id
    }

    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    pub fn line(&self, line_id: u64) -> Option<&OrderLine> {
        self.lines.iter().find(|l| l.line_id == line_id).map(|l| &l.line)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines stripped of local ids, as written to the store
    pub fn order_lines(&self) -> Vec<OrderLine> {
        self.lines.iter().map(|l| l.line.clone()).collect()
    }

    /// Derived totals, refreshed on every mutation
    pub fn totals(&self) -> &OrderTotals {
        &self.totals
    }

    pub fn storewide_discount(&self) -> Option<&Discount> {
        self.storewide.as_ref()
    }

    pub fn remote(&self) -> Option<&TableRecord> {
        self.remote.as_ref()
    }

    /// `false` shows the "disconnected" indicator
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    // ========== Session ==========

    pub fn session(&self) -> &SessionState {
        self.gate.state()
    }

    pub fn current_staff(&self) -> Option<&StaffMember> {
        self.gate.current_staff()
    }

    /// Staff this terminal may offer for the table
    pub fn selectable_staff(&self, roster: &[StaffMember]) -> Vec<StaffMember> {
        StaffSessionGate::selectable_staff(roster, self.remote.as_ref())
    }

    pub fn select_staff(&mut self, staff: StaffMember) -> AppResult<()> {
        self.gate.select_staff(staff, self.remote.as_ref())
    }

    pub fn cancel_staff_selection(&mut self) {
        self.gate.cancel();
    }

    pub fn submit_pin(&mut self, pin: &str) -> AppResult<StaffMember> {
        self.gate.submit_pin(pin)
    }

    pub fn push_digit(&mut self, digit: char) -> AppResult<KeypadResult> {
        self.gate.push_digit(digit)
    }

    pub fn pop_digit(&mut self) {
        self.gate.pop_digit();
    }

    pub fn clear_pin_input(&mut self) {
        self.gate.clear_input();
    }

    /// Blocked while lines exist, unless forced
    pub fn logout(&mut self, force: bool) -> AppResult<()> {
        self.gate.logout(self.lines.len(), force)
    }

    // ========== Line mutations ==========

    /// Merge into an undiscounted line of the same food, else append
    pub fn add_item(&mut self, food: &Food) -> AppResult<u64> {
        self.gate.require_staff()?;
        if !is_valid_price(food.price) {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                format!("Price must be between 0 and {}", MAX_PRICE),
            )
            .with_detail("food_id", food.id)
            .with_detail("price", food.price));
        }
        let line_id = match self
            .lines
            .iter_mut()
            .find(|l| l.line.food.id == food.id && !l.line.has_discount())
        {
            Some(existing) => {
                if !existing.line.can_increment() {
                    return Err(quantity_limit(existing.line_id));
                }
                existing.line.quantity += 1;
                existing.line_id
            }
            None => {
                let line_id = self.alloc_line_id();
                self.lines.push(LineItem {
                    line_id,
                    line: OrderLine::new(food.snapshot()),
                });
                line_id
            }
        };
        self.recompute();
        Ok(line_id)
    }

    pub fn increment_quantity(&mut self, line_id: u64) -> AppResult<()> {
        self.gate.require_staff()?;
        let idx = self.position(line_id)?;
        if !self.lines[idx].line.can_increment() {
            return Err(quantity_limit(line_id));
        }
        self.lines[idx].line.quantity += 1;
        self.recompute();
        Ok(())
    }

    /// Decrementing a quantity-1 line removes it
    pub fn decrement_quantity(&mut self, line_id: u64) -> AppResult<()> {
        self.gate.require_staff()?;
        let idx = self.position(line_id)?;
        if self.lines[idx].line.quantity <= 1 {
            self.remove_at(idx);
        } else {
            self.lines[idx].line.quantity -= 1;
        }
        self.recompute();
        Ok(())
    }

    pub fn remove_item(&mut self, line_id: u64) -> AppResult<()> {
        self.gate.require_staff()?;
        let idx = self.position(line_id)?;
        self.remove_at(idx);
        self.recompute();
        Ok(())
    }

    pub fn edit_item(&mut self, line_id: u64, edit: &ItemEdit) -> AppResult<()> {
        self.gate.require_staff()?;
        let idx = self.position(line_id)?;
        if edit.apply_to(&mut self.lines[idx].line) {
            self.recompute();
        }
        Ok(())
    }

    // ========== Item editor ==========

    pub fn open_editor(&mut self, line_id: u64) -> AppResult<&mut ItemEditor> {
        self.gate.require_staff()?;
        let idx = self.position(line_id)?;
        let editor = ItemEditor::from_line(line_id, &self.lines[idx].line);
        Ok(self.editor.insert(editor))
    }

    pub fn editor(&self) -> Option<&ItemEditor> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut ItemEditor> {
        self.editor.as_mut()
    }

    /// Apply the editor form to its line and close it
    pub fn commit_editor(&mut self) -> AppResult<()> {
        let editor = self
            .editor
            .as_ref()
            .ok_or_else(|| AppError::invalid_request("No item editor open"))?;
        let (line_id, edit) = (editor.line_id, editor.to_edit());
        self.edit_item(line_id, &edit)?;
        self.editor = None;
        Ok(())
    }

    pub fn cancel_editor(&mut self) {
        self.editor = None;
    }

    // ========== Storewide discount ==========

    /// Discounts that may be applied right now
    pub async fn available_discounts(&self, catalog: &dyn Catalog, now: i64) -> AppResult<Vec<Discount>> {
        catalog.list_active_discounts(now).await
    }

    /// Replaces any storewide discount already applied
    pub fn apply_storewide_discount(&mut self, discount: Discount, now: i64) -> AppResult<()> {
        self.gate.require_staff()?;
        if !is_eligible(&discount, now) {
            return Err(AppError::new(ErrorCode::DiscountNotActive).with_detail("discount_id", discount.id));
        }
        self.storewide = Some(discount);
        self.recompute();
        Ok(())
    }

    pub fn clear_storewide_discount(&mut self) -> AppResult<()> {
        self.gate.require_staff()?;
        self.storewide = None;
        self.recompute();
        Ok(())
    }

    // ========== Store writes ==========

    /// Write the order to the table
    ///
    /// An empty order clears the table. The write is conditional on the
    /// status it was computed from, so `order_placed_at` is stamped exactly
    /// once per entry into `serving`.
    pub async fn save_order(&mut self) -> AppResult<TableRecord> {
        let staff = self.gate.require_staff()?.clone();
        let lines = self.order_lines();

        for attempt in 1..=SAVE_ATTEMPTS {
            let prior = self
                .store
                .read(self.table_id)
                .await?
                .ok_or_else(|| AppError::table_not_found(self.table_id))?;
            if prior.is_held_by_other(staff.id) {
                return Err(AppError::table_occupied(
                    prior.id,
                    prior.occupied_by.clone().unwrap_or_default(),
                ));
            }

            let patch = lifecycle::place_order(&prior, lines.clone(), &staff, now_millis());
            let expected = Precondition::status(prior.status).held_by(staff.id);
            match self.store.write_if(self.table_id, expected, patch).await? {
                WriteOutcome::Applied(record) => {
                    tracing::info!(
                        table_id = self.table_id,
                        staff_id = staff.id,
                        lines = lines.len(),
                        status = ?record.status,
                        "Order saved"
                    );
                    self.apply_snapshot(record.clone());
                    return Ok(record);
                }
                WriteOutcome::Rejected(current) => {
                    tracing::debug!(
                        table_id = self.table_id,
                        attempt,
                        status = ?current.status,
                        "Table changed during save, retrying"
                    );
                }
            }
        }

        tracing::warn!(table_id = self.table_id, "Order save gave up after concurrent updates");
        Err(AppError::new(ErrorCode::TableStale).with_detail("table_id", self.table_id))
    }

    /// Record the sale and free the table
    ///
    /// The table is cleared first, conditionally on the state the bill was
    /// read from; the transaction is appended only once that write applied.
    /// If the append fails the transaction stays pending and the next `pay`
    /// records that same transaction instead of building a new one.
    pub async fn pay(&mut self) -> AppResult<Transaction> {
        if let Some(transaction) = self.pending_payment.clone() {
            return self.record_payment(transaction).await;
        }
        if self.lines.is_empty() {
            return Err(AppError::order_empty().with_detail("table_id", self.table_id));
        }
        let staff = self.gate.require_staff()?.clone();

        let mut cleared = None;
        for attempt in 1..=SAVE_ATTEMPTS {
            let prior = self
                .store
                .read(self.table_id)
                .await?
                .ok_or_else(|| AppError::table_not_found(self.table_id))?;
            if prior.is_held_by_other(staff.id) {
                return Err(AppError::table_occupied(
                    prior.id,
                    prior.occupied_by.clone().unwrap_or_default(),
                ));
            }

            let expected = Precondition::status(prior.status).held_by(staff.id);
            match self.store.write_if(self.table_id, expected, lifecycle::clear()).await? {
                WriteOutcome::Applied(record) => {
                    cleared = Some((prior, record));
                    break;
                }
                WriteOutcome::Rejected(current) => {
                    tracing::debug!(
                        table_id = self.table_id,
                        attempt,
                        status = ?current.status,
                        "Table changed during payment, retrying"
                    );
                }
            }
        }
        let Some((prior, record)) = cleared else {
            tracing::warn!(table_id = self.table_id, "Payment gave up after concurrent updates");
            return Err(AppError::new(ErrorCode::TableStale).with_detail("table_id", self.table_id));
        };

        let totals = compute_totals(&self.order_lines(), self.storewide.as_ref(), &self.pricing);
        let transaction = Transaction {
            id: snowflake_id(),
            table_id: prior.id,
            table_name: prior.name.clone(),
            staff_id: staff.id,
            staff_name: staff.name.clone(),
            items: self
                .lines
                .iter()
                .map(|l| TransactionItem {
                    food_id: l.line.food.id,
                    name: l.line.food.name.clone(),
                    price: l.line.food.price,
                    quantity: l.line.quantity,
                    discount: l.line.discount,
                    note: l.line.note.clone(),
                    line_total: line_total(&l.line),
                })
                .collect(),
            storewide_discount: self.storewide.as_ref().map(AppliedDiscount::from),
            totals,
            created_at: now_millis(),
        };

        self.remote = Some(record);
        self.pending_payment = Some(transaction.clone());
        self.record_payment(transaction).await
    }

    /// Transaction whose table is cleared but which is not in the ledger yet
    pub fn pending_payment(&self) -> Option<&Transaction> {
        self.pending_payment.as_ref()
    }

    async fn record_payment(&mut self, transaction: Transaction) -> AppResult<Transaction> {
        match self.ledger.append(transaction.clone()).await {
            Ok(_) => {}
            // an earlier attempt got through before reporting failure
            Err(e) if e.code == ErrorCode::AlreadyExists => {
                tracing::debug!(transaction_id = transaction.id, "Transaction already recorded");
            }
            Err(e) => {
                tracing::error!(
                    table_id = self.table_id,
                    transaction_id = transaction.id,
                    error = %e,
                    "Table cleared but transaction not recorded"
                );
                return Err(e);
            }
        }

        tracing::info!(
            table_id = self.table_id,
            transaction_id = transaction.id,
            total = transaction.totals.total,
            "Payment recorded"
        );
        self.pending_payment = None;
        self.storewide = None;
        self.replace_lines(Vec::new());
        Ok(transaction)
    }

    // ========== Live sync ==========

    /// Start mirroring the table; the first update is the current snapshot
    pub fn attach(&mut self) {
        self.subscription = Some(self.store.subscribe(self.table_id));
    }

    /// Stop mirroring (navigating away)
    pub fn detach(&mut self) {
        self.subscription = None;
        self.connected = false;
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Wait for and apply the next store event
    ///
    /// `None` when detached or the feed is gone.
    pub async fn next_update(&mut self) -> Option<StoreEvent> {
        let event = self.subscription.as_mut()?.recv().await?;
        self.apply_event(&event);
        Some(event)
    }

    pub fn apply_event(&mut self, event: &StoreEvent) {
        match event {
            StoreEvent::Snapshot(record) => {
                self.connected = true;
                self.apply_snapshot(record.clone());
            }
            StoreEvent::Missing => {
                self.connected = true;
                tracing::warn!(table_id = self.table_id, "Table no longer exists");
                self.remote = None;
                self.replace_lines(Vec::new());
            }
            StoreEvent::Unavailable(err) => {
                if self.connected {
                    tracing::warn!(table_id = self.table_id, error = %err, "Table feed disconnected");
                }
                self.connected = false;
            }
        }
    }

    // ========== Internals ==========

    fn apply_snapshot(&mut self, record: TableRecord) {
        self.replace_lines(record.order.clone());
        self.remote = Some(record);
    }

    /// Overwrite local lines, keeping ids where the same food sits at the
    /// same position
    fn replace_lines(&mut self, incoming: Vec<OrderLine>) {
        let previous = std::mem::take(&mut self.lines);
        let mut lines = Vec::with_capacity(incoming.len());
        for (idx, line) in incoming.into_iter().enumerate() {
            let line_id = match previous.get(idx) {
                Some(prev) if prev.line.food.id == line.food.id => prev.line_id,
                _ => self.alloc_line_id(),
            };
            lines.push(LineItem { line_id, line });
        }
        self.lines = lines;
        let editor_gone = self
            .editor
            .as_ref()
            .is_some_and(|e| !self.lines.iter().any(|l| l.line_id == e.line_id));
        if editor_gone {
            self.editor = None;
        }
        self.recompute();
    }

    fn position(&self, line_id: u64) -> AppResult<usize> {
        self.lines
            .iter()
            .position(|l| l.line_id == line_id)
            .ok_or_else(|| AppError::new(ErrorCode::OrderItemNotFound).with_detail("line_id", line_id))
    }

    fn remove_at(&mut self, idx: usize) {
        let removed = self.lines.remove(idx);
        if self.editor.as_ref().is_some_and(|e| e.line_id == removed.line_id) {
            self.editor = None;
        }
    }

    fn alloc_line_id(&mut self) -> u64 {
        let id = self.next_line_id;
        self.next_line_id += 1;
        id
    }

    fn recompute(&mut self) {
        self.totals = compute_totals(&self.order_lines(), self.storewide.as_ref(), &self.pricing);
    }
}
