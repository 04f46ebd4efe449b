use thiserror::Error;

use crate::services::LedgerError;
use crate::store::StoreError;

/// 服务器启动 / 运行错误
///
/// 业务错误走 [`shared::error::AppError`]，这里只覆盖进程级故障。
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("桌台存储错误: {0}")]
    Store(#[from] StoreError),

    #[error("交易账本错误: {0}")]
    Ledger(#[from] LedgerError),

    #[error("内部服务器错误: {0}")]
    Internal(#[from] anyhow::Error),
}

/// 启动流程的 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
