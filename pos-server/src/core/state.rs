use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::core::config::StoreBackend;
use crate::core::{Config, Result, ServerError};
use crate::kitchen::KitchenQueue;
use crate::services::{
    Catalog, MemoryCatalog, MemoryLedger, MemoryStaffRoster, RedbLedger, StaffRoster,
    TransactionLedger, seed,
};
use crate::store::{MemoryTableStore, RedbTableStore, TableStore};
use crate::tables::TableLifecycleManager;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 所有字段都是 Arc，Clone 只是浅拷贝，可直接作为 axum 的 Router state。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | store | Arc<dyn TableStore> | 桌台存储 (唯一数据源) |
/// | ledger | Arc<dyn TransactionLedger> | 交易账本 |
/// | catalog | Arc<dyn Catalog> | 菜品 / 折扣目录 |
/// | roster | Arc<dyn StaffRoster> | 员工名册 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 桌台存储
    pub store: Arc<dyn TableStore>,
    /// 交易账本
    pub ledger: Arc<dyn TransactionLedger>,
    /// 菜品目录
    pub catalog: Arc<dyn Catalog>,
    /// 员工名册
    pub roster: Arc<dyn StaffRoster>,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`initialize()`](Self::initialize) 方法代替
    pub fn new(
        config: Config,
        store: Arc<dyn TableStore>,
        ledger: Arc<dyn TransactionLedger>,
        catalog: Arc<dyn Catalog>,
        roster: Arc<dyn StaffRoster>,
    ) -> Self {
        Self {
            config,
            store,
            ledger,
            catalog,
            roster,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构 (仅 redb 后端)
    /// 2. 桌台存储 + 交易账本 (work_dir/database/)
    /// 3. 菜品目录、员工名册 (内存实现，从 work_dir 下的 catalog.json / staff.json 加载)
    pub async fn initialize(config: &Config) -> Result<Self> {
        if config.channel_capacity == 0 {
            return Err(ServerError::Config(
                "CHANNEL_CAPACITY must be positive".to_string(),
            ));
        }

        let (store, ledger): (Arc<dyn TableStore>, Arc<dyn TransactionLedger>) =
            match config.store_backend {
                StoreBackend::Memory => {
                    tracing::info!("Using in-memory table store");
                    (
                        Arc::new(MemoryTableStore::with_capacity(config.channel_capacity)),
                        Arc::new(MemoryLedger::new()),
                    )
                }
                StoreBackend::Redb => {
                    config.ensure_work_dir_structure().with_context(|| {
                        format!("Failed to create work directory {}", config.work_dir)
                    })?;
                    let db_dir = config.database_dir();
                    tracing::info!(path = %db_dir.display(), "Using redb table store");
                    (
                        Arc::new(RedbTableStore::open(
                            db_dir.join("tables.redb"),
                            config.channel_capacity,
                        )?),
                        Arc::new(RedbLedger::open(db_dir.join("transactions.redb"))?),
                    )
                }
            };

        let catalog = MemoryCatalog::new();
        let roster = MemoryStaffRoster::new();
        seed::load_into(Path::new(&config.work_dir), &catalog, &roster)?;

        Ok(Self::new(
            config.clone(),
            store,
            ledger,
            Arc::new(catalog),
            Arc::new(roster),
        ))
    }

    /// 全内存状态 (测试用)
    pub fn in_memory(config: Config) -> Self {
        Self::new(
            config,
            Arc::new(MemoryTableStore::new()),
            Arc::new(MemoryLedger::new()),
            Arc::new(MemoryCatalog::new()),
            Arc::new(MemoryStaffRoster::new()),
        )
    }

    /// 桌台管理
    pub fn tables(&self) -> TableLifecycleManager {
        TableLifecycleManager::new(self.store.clone())
    }

    /// 后厨队列
    pub fn kitchen(&self) -> KitchenQueue {
        KitchenQueue::new(self.store.clone())
    }
}
