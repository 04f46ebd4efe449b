//! Table Lifecycle Manager (桌台管理)
//!
//! Creates, renames, resets and deletes dining tables, and hands a table
//! over to an [`OrderBuilder`].

use std::sync::Arc;

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{TablePatch, TableRecord};
use shared::order::lifecycle;
use shared::util::normalize_name;

use crate::orders::OrderBuilder;
use crate::pricing::PricingConfig;
use crate::services::TransactionLedger;
use crate::store::{StoreEvent, TableStore};

#[derive(Clone)]
pub struct TableLifecycleManager {
    store: Arc<dyn TableStore>,
}

impl TableLifecycleManager {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn TableStore> {
        &self.store
    }

    pub async fn list_tables(&self) -> AppResult<Vec<TableRecord>> {
        Ok(self.store.list().await?)
    }

    pub async fn get_table(&self, table_id: i64) -> AppResult<TableRecord> {
        self.store
            .read(table_id)
            .await?
            .ok_or_else(|| AppError::table_not_found(table_id))
    }

    pub async fn create_table(&self, name: &str) -> AppResult<TableRecord> {
        let name = normalize_name(name)
            .ok_or_else(|| AppError::validation("Table name must not be empty").with_detail("field", "name"))?;
        let record = self.store.create(&name).await?;
        tracing::info!(table_id = record.id, name = %record.name, "Table created");
        Ok(record)
    }

    pub async fn rename_table(&self, table_id: i64, name: &str) -> AppResult<TableRecord> {
        let name = normalize_name(name)
            .ok_or_else(|| AppError::validation("Table name must not be empty").with_detail("field", "name"))?;
        Ok(self.store.write(table_id, TablePatch::rename(name)).await?)
    }

    /// Occupied tables cannot be deleted
    pub async fn delete_table(&self, table_id: i64) -> AppResult<()> {
        let record = self.get_table(table_id).await?;
        if record.is_occupied() {
            return Err(AppError::new(ErrorCode::TableHasOrders)
                .with_detail("table_id", table_id)
                .with_detail("status", format!("{:?}", record.status)));
        }
        if !self.store.delete(table_id).await? {
            return Err(AppError::table_not_found(table_id));
        }
        tracing::info!(table_id, "Table deleted");
        Ok(())
    }

    /// Full clear from any state
    pub async fn reset_table(&self, table_id: i64) -> AppResult<TableRecord> {
        let record = self.store.write(table_id, lifecycle::clear()).await?;
        tracing::info!(table_id, "Table reset");
        Ok(record)
    }

    /// Attach an Order Builder to the table, seeded with its current snapshot
    pub async fn open_for_order(
        &self,
        table_id: i64,
        ledger: Arc<dyn TransactionLedger>,
        pricing: PricingConfig,
    ) -> AppResult<OrderBuilder> {
        let mut builder = OrderBuilder::new(table_id, self.store.clone(), ledger, pricing);
        builder.attach();
        match builder.next_update().await {
            Some(StoreEvent::Snapshot(_)) => Ok(builder),
            Some(StoreEvent::Missing) => Err(AppError::table_not_found(table_id)),
            Some(StoreEvent::Unavailable(err)) => Err(err),
            None => Err(AppError::store_unavailable("Table feed closed")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemoryLedger;
    use crate::store::MemoryTableStore;
    use shared::models::{StaffMember, TableStatus};

    fn manager() -> TableLifecycleManager {
        TableLifecycleManager::new(Arc::new(MemoryTableStore::new()))
    }

    #[tokio::test]
    async fn test_create_trims_name() {
        let tables = manager();
        let record = tables.create_table("  Patio 1 ").await.unwrap();
        assert_eq!(record.name, "Patio 1");
        assert_eq!(record.status, TableStatus::Available);

        let err = tables.create_table("   ").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn test_rename_and_list() {
        let tables = manager();
        let record = tables.create_table("T1").await.unwrap();
        tables.rename_table(record.id, "Bar 1").await.unwrap();

        let all = tables.list_tables().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Bar 1");

        let err = tables.rename_table(999, "X").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TableNotFound);
    }

    #[tokio::test]
    async fn test_delete_refuses_occupied() {
        let tables = manager();
        let record = tables.create_table("T1").await.unwrap();
        let staff = StaffMember::new(1, "Alice", "1234");
        let lines = vec![shared::order::OrderLine::new(shared::models::FoodSnapshot {
            id: 1,
            name: "Tea".to_string(),
            price: 2.0,
            description: String::new(),
            category_id: 1,
        })];
        tables
            .store()
            .write(record.id, lifecycle::place_order(&record, lines, &staff, 1))
            .await
            .unwrap();

        let err = tables.delete_table(record.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TableHasOrders);

        tables.reset_table(record.id).await.unwrap();
        tables.delete_table(record.id).await.unwrap();
        assert!(tables.list_tables().await.unwrap().is_empty());

        let err = tables.delete_table(record.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TableNotFound);
    }

    #[tokio::test]
    async fn test_open_for_order() {
        let tables = manager();
        let record = tables.create_table("T1").await.unwrap();
        let ledger = Arc::new(MemoryLedger::new());

        let builder = tables
            .open_for_order(record.id, ledger.clone(), PricingConfig::default())
            .await
            .unwrap();
        assert!(builder.is_connected());
        assert_eq!(builder.remote().unwrap().id, record.id);

        let err = tables
            .open_for_order(999, ledger, PricingConfig::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::TableNotFound);
    }
}
