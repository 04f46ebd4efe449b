//! End-to-end table flow across terminals
//!
//! POS saves -> kitchen accepts / prepares -> front-of-house serves, with
//! every viewer attached to the same store.

use std::sync::Arc;

use pos_server::kitchen::KitchenQueue;
use pos_server::pending::{PendingDisplay, PendingOrderTracker, TrackerView};
use pos_server::services::{MemoryLedger, TransactionLedger};
use pos_server::store::{MemoryTableStore, QueryEvent, StoreEvent, TableStore};
use pos_server::{ErrorCode, PricingConfig, TableLifecycleManager};
use shared::models::{Food, KitchenStatus, StaffMember, TableStatus};
use shared::order::TransitionOutcome;

fn food(id: i64, name: &str, price: f64) -> Food {
    Food {
        id,
        name: name.to_string(),
        price,
        description: String::new(),
        category_id: 1,
    }
}

fn alice() -> StaffMember {
    StaffMember::new(1, "Alice", "1234")
}

fn bob() -> StaffMember {
    StaffMember::new(2, "Bob", "5678")
}

struct Fixture {
    store: Arc<MemoryTableStore>,
    ledger: Arc<MemoryLedger>,
    tables: TableLifecycleManager,
}

fn fixture() -> Fixture {
    let store = Arc::new(MemoryTableStore::new());
    Fixture {
        tables: TableLifecycleManager::new(store.clone()),
        ledger: Arc::new(MemoryLedger::new()),
        store,
    }
}

#[tokio::test]
async fn test_full_service_cycle() {
    let fx = fixture();
    let table = fx.tables.create_table("Table 1").await.unwrap();

    // POS terminal
    let mut pos = fx
        .tables
        .open_for_order(table.id, fx.ledger.clone(), PricingConfig::default())
        .await
        .unwrap();
    pos.select_staff(alice()).unwrap();
    pos.submit_pin("1234").unwrap();
    let line = pos.add_item(&food(1, "Ramen", 100.0)).unwrap();
    pos.increment_quantity(line).unwrap();
    assert_eq!(pos.totals().total, 240.0);

    let saved = pos.save_order().await.unwrap();
    assert_eq!(saved.status, TableStatus::Serving);

    // Kitchen
    let kitchen = KitchenQueue::new(fx.store.clone());
    let queue = kitchen.queue().await.unwrap();
    assert_eq!(queue.len(), 1);
    assert!(kitchen.accept_order(table.id).await.unwrap().is_applied());

    // Tracker sees the kitchen progress
    let mut tracker = PendingOrderTracker::new(table.id, fx.store.clone());
    tracker.attach();
    let view = tracker.next_update().await.unwrap();
    assert!(matches!(
        view,
        TrackerView::Tracking {
            display: PendingDisplay::InProgress,
            ..
        }
    ));

    let err = tracker.mark_as_served().await.unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderNotReady);

    assert!(kitchen.mark_prepared(table.id).await.unwrap().is_applied());
    let view = tracker.next_update().await.unwrap();
    assert!(matches!(
        view,
        TrackerView::Tracking {
            display: PendingDisplay::ReadyForPickup,
            ..
        }
    ));

    let served = tracker.mark_as_served().await.unwrap();
    assert!(served.navigate_away);

    // POS mirror follows the clear
    loop {
        match pos.next_update().await.unwrap() {
            StoreEvent::Snapshot(record) if record.status == TableStatus::Available => break,
            StoreEvent::Snapshot(_) => continue,
            other => panic!("unexpected event: {:?}", other),
        }
    }
    assert!(pos.is_empty());
    assert!(pos.remote().unwrap().occupied_by.is_none());
}

#[tokio::test]
async fn test_pay_then_late_kitchen_action_is_stale() {
    let fx = fixture();
    let table = fx.tables.create_table("Table 2").await.unwrap();

    let mut pos = fx
        .tables
        .open_for_order(table.id, fx.ledger.clone(), PricingConfig::default())
        .await
        .unwrap();
    pos.select_staff(alice()).unwrap();
    pos.submit_pin("1234").unwrap();
    pos.add_item(&food(1, "Dumplings", 8.5)).unwrap();
    pos.save_order().await.unwrap();

    let transaction = pos.pay().await.unwrap();
    assert_eq!(fx.ledger.list().await.unwrap().len(), 1);
    assert_eq!(transaction.table_name, "Table 2");

    let kitchen = KitchenQueue::new(fx.store.clone());
    let outcome = kitchen.mark_prepared(table.id).await.unwrap();
    assert!(matches!(outcome, TransitionOutcome::Stale { .. }));

    let record = fx.store.read(table.id).await.unwrap().unwrap();
    assert_eq!(record.status, TableStatus::Available);
}

#[tokio::test]
async fn test_second_terminal_restricted_to_occupying_staff() {
    let fx = fixture();
    let table = fx.tables.create_table("Table 3").await.unwrap();

    let mut first = fx
        .tables
        .open_for_order(table.id, fx.ledger.clone(), PricingConfig::default())
        .await
        .unwrap();
    first.select_staff(alice()).unwrap();
    first.submit_pin("1234").unwrap();
    first.add_item(&food(1, "Tea", 3.0)).unwrap();
    first.save_order().await.unwrap();

    let mut second = fx
        .tables
        .open_for_order(table.id, fx.ledger.clone(), PricingConfig::default())
        .await
        .unwrap();
    // opened after the save, so the first snapshot already shows the lines
    assert_eq!(second.lines().len(), 1);

    let roster = vec![alice(), bob()];
    let selectable = second.selectable_staff(&roster);
    assert_eq!(selectable.len(), 1);
    assert_eq!(selectable[0].id, 1);

    let err = second.select_staff(bob()).unwrap_err();
    assert_eq!(err.code, ErrorCode::TableOccupied);
}

#[tokio::test]
async fn test_resave_keeps_queue_position() {
    let fx = fixture();
    let early = fx.tables.create_table("Early").await.unwrap();
    let late = fx.tables.create_table("Late").await.unwrap();

    let mut pos_early = fx
        .tables
        .open_for_order(early.id, fx.ledger.clone(), PricingConfig::default())
        .await
        .unwrap();
    pos_early.select_staff(alice()).unwrap();
    pos_early.submit_pin("1234").unwrap();
    pos_early.add_item(&food(1, "Soup", 5.0)).unwrap();
    let first_save = pos_early.save_order().await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let mut pos_late = fx
        .tables
        .open_for_order(late.id, fx.ledger.clone(), PricingConfig::default())
        .await
        .unwrap();
    pos_late.select_staff(bob()).unwrap();
    pos_late.submit_pin("5678").unwrap();
    pos_late.add_item(&food(2, "Salad", 7.0)).unwrap();
    pos_late.save_order().await.unwrap();

    // adding to the early table must not move it behind the late one
    pos_early.add_item(&food(3, "Bread", 2.0)).unwrap();
    let resaved = pos_early.save_order().await.unwrap();
    assert_eq!(resaved.order_placed_at, first_save.order_placed_at);
    assert_eq!(resaved.kitchen_status, Some(KitchenStatus::Pending));

    let kitchen = KitchenQueue::new(fx.store.clone());
    let ids: Vec<_> = kitchen.queue().await.unwrap().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![early.id, late.id]);
}

#[tokio::test]
async fn test_kitchen_feed_follows_lifecycle() {
    let fx = fixture();
    let table = fx.tables.create_table("Table 4").await.unwrap();
    let kitchen = KitchenQueue::new(fx.store.clone());
    let mut feed = kitchen.subscribe();
    assert!(matches!(feed.recv().await, Some(QueryEvent::Snapshot(q)) if q.is_empty()));

    let mut pos = fx
        .tables
        .open_for_order(table.id, fx.ledger.clone(), PricingConfig::default())
        .await
        .unwrap();
    pos.select_staff(alice()).unwrap();
    pos.submit_pin("1234").unwrap();
    pos.add_item(&food(1, "Curry", 11.0)).unwrap();
    pos.save_order().await.unwrap();

    let Some(QueryEvent::Snapshot(queue)) = feed.recv().await else {
        panic!("expected queue snapshot");
    };
    assert_eq!(queue.len(), 1);

    fx.tables.reset_table(table.id).await.unwrap();
    let Some(QueryEvent::Snapshot(queue)) = feed.recv().await else {
        panic!("expected queue snapshot");
    };
    assert!(queue.is_empty());
}
