use std::path::PathBuf;

use crate::pricing::PricingConfig;
use crate::store::DEFAULT_CHANNEL_CAPACITY;

/// 桌台存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// 进程内存储 (测试 / 单终端)
    Memory,
    /// redb 嵌入式持久化存储
    Redb,
}

impl StoreBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Some(Self::Memory),
            "redb" => Some(Self::Redb),
            _ => None,
        }
    }
}

/// 服务器配置 - POS 节点的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./pos-data | 工作目录 (数据库、catalog.json、staff.json) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | (无) | 日志目录，设置后按天滚动写文件 |
/// | STORE_BACKEND | memory | 桌台存储: memory / redb |
/// | CHANNEL_CAPACITY | 1024 | 变更广播通道容量 |
/// | TAX_RATE | 10 | 税率 (百分比) |
/// | SERVICE_CHARGE_RATE | 10 | 服务费率 (百分比) |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/pos STORE_BACKEND=redb cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存放数据库文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 日志级别
    pub log_level: String,
    /// 日志目录 (None 表示只输出到终端)
    pub log_dir: Option<String>,
    /// 桌台存储后端
    pub store_backend: StoreBackend,
    /// 变更广播通道容量
    pub channel_capacity: usize,
    /// 税率 (百分比)
    pub tax_rate: f64,
    /// 服务费率 (百分比)
    pub service_charge_rate: f64,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置或无法解析，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./pos-data".into()),
            http_port: env_parse("HTTP_PORT").unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            store_backend: std::env::var("STORE_BACKEND")
                .ok()
                .and_then(|v| StoreBackend::parse(&v))
                .unwrap_or(StoreBackend::Memory),
            channel_capacity: env_parse("CHANNEL_CAPACITY").unwrap_or(DEFAULT_CHANNEL_CAPACITY),
            tax_rate: env_parse("TAX_RATE").unwrap_or(PricingConfig::DEFAULT_TAX_RATE),
            service_charge_rate: env_parse("SERVICE_CHARGE_RATE")
                .unwrap_or(PricingConfig::DEFAULT_SERVICE_CHARGE_RATE),
            request_timeout_ms: env_parse("REQUEST_TIMEOUT_MS").unwrap_or(30000),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// 定价参数
    pub fn pricing(&self) -> PricingConfig {
        PricingConfig {
            tax_rate: self.tax_rate,
            service_charge_rate: self.service_charge_rate,
        }
    }

    /// 数据库目录: work_dir/database
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_backend_parse() {
        assert_eq!(StoreBackend::parse("redb"), Some(StoreBackend::Redb));
        assert_eq!(StoreBackend::parse(" Memory "), Some(StoreBackend::Memory));
        assert_eq!(StoreBackend::parse("surreal"), None);
    }

    #[test]
    fn test_pricing_from_config() {
        let mut config = Config::with_overrides("/tmp/pos", 0);
        config.tax_rate = 8.0;
        config.service_charge_rate = 12.5;

        let pricing = config.pricing();
        assert_eq!(pricing.tax_rate, 8.0);
        assert_eq!(pricing.service_charge_rate, 12.5);
        assert_eq!(config.database_dir(), PathBuf::from("/tmp/pos/database"));
    }
}
