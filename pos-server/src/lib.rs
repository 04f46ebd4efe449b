//! POS Server - 餐厅点单 / 后厨 / 取餐核心
//!
//! # 架构概述
//!
//! 所有终端共享同一份桌台记录 (`TableRecord`)，通过桌台存储的实时订阅
//! 看到彼此的修改：
//!
//! - **桌台存储** (`store`): 内存 / redb 两种后端，广播整条记录快照
//! - **定价** (`pricing`): 小计、折扣、税、服务费
//! - **点单** (`orders`): 本地编辑、保存、结账
//! - **员工会话** (`auth`): 选人 + PIN 登录
//! - **后厨队列** (`kitchen`): 接单、出餐
//! - **取餐跟踪** (`pending`): 显示状态、确认出餐
//! - **桌台管理** (`tables`): 建台、改名、清台、删台
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! pos-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── store/         # 桌台存储 + 订阅
//! ├── pricing/       # 定价引擎
//! ├── orders/        # 点单
//! ├── auth/          # PIN 会话
//! ├── kitchen/       # 后厨队列
//! ├── pending/       # 取餐跟踪
//! ├── tables/        # 桌台生命周期
//! ├── services/      # 目录、名册、交易账本
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 日志等工具
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod kitchen;
pub mod orders;
pub mod pending;
pub mod pricing;
pub mod services;
pub mod store;
pub mod tables;
pub mod utils;

// Re-export 公共类型
pub use auth::StaffSessionGate;
pub use core::{Config, Server, ServerState};
pub use kitchen::KitchenQueue;
pub use orders::OrderBuilder;
pub use pending::PendingOrderTracker;
pub use pricing::{PricingConfig, compute_totals};
pub use store::{MemoryTableStore, RedbTableStore, TableStore};
pub use tables::TableLifecycleManager;

// Re-export unified error types from shared
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境
///
/// 1. 加载 `.env` (不存在则忽略)
/// 2. 初始化日志 (`LOG_LEVEL`, `LOG_DIR`)
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty());
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    ____  ____  _____
   / __ \/ __ \/ ___/
  / /_/ / / / /\__ \
 / ____/ /_/ /___/ /
/_/    \____//____/
    "#
    );
}
