//! redb backends survive a reopen

use pos_server::services::{RedbLedger, TransactionLedger};
use pos_server::store::{RedbTableStore, StoreEvent, TableStore};
use shared::models::{FoodSnapshot, StaffMember, TableStatus, Transaction};
use shared::order::{OrderLine, OrderTotals, lifecycle};

fn lines() -> Vec<OrderLine> {
    vec![OrderLine::new(FoodSnapshot {
        id: 9,
        name: "Pho".to_string(),
        price: 13.5,
        description: "Beef".to_string(),
        category_id: 2,
    })]
}

#[tokio::test]
async fn test_table_store_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tables.redb");
    let staff = StaffMember::new(4, "Dana", "4321");

    let table_id = {
        let store = RedbTableStore::open(&path, 16).unwrap();
        let table = store.create("Window").await.unwrap();
        store
            .write(table.id, lifecycle::place_order(&table, lines(), &staff, 1_000))
            .await
            .unwrap();
        table.id
    };

    let store = RedbTableStore::open(&path, 16).unwrap();
    let record = store.read(table_id).await.unwrap().unwrap();
    assert_eq!(record.name, "Window");
    assert_eq!(record.status, TableStatus::Serving);
    assert_eq!(record.order_placed_at, Some(1_000));
    assert_eq!(record.revision, 1);
    assert_eq!(record.order[0].food.description, "Beef");

    let mut sub = store.subscribe(table_id);
    let Some(StoreEvent::Snapshot(first)) = sub.recv().await else {
        panic!("expected snapshot");
    };
    assert_eq!(first.revision, 1);

    store.write(table_id, lifecycle::clear()).await.unwrap();
    let Some(StoreEvent::Snapshot(cleared)) = sub.recv().await else {
        panic!("expected snapshot");
    };
    assert_eq!(cleared.status, TableStatus::Available);
    assert_eq!(cleared.revision, 2);
}

#[tokio::test]
async fn test_ledger_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("transactions.redb");

    let transaction = Transaction {
        id: 77,
        table_id: 1,
        table_name: "Window".to_string(),
        staff_id: 4,
        staff_name: "Dana".to_string(),
        items: vec![],
        storewide_discount: None,
        totals: OrderTotals::default(),
        created_at: 5,
    };

    {
        let ledger = RedbLedger::open(&path).unwrap();
        ledger.append(transaction.clone()).await.unwrap();
    }

    let ledger = RedbLedger::open(&path).unwrap();
    assert_eq!(ledger.get(77).await.unwrap(), transaction);
    assert_eq!(ledger.list().await.unwrap().len(), 1);
}
