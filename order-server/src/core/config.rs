use rust_decimal::Decimal;
use std::str::FromStr;

use super::ServerError;

/// 服务器配置 - 订单服务的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖 (启动时先加载 `.env`)：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | DATABASE_PATH | ./data/orders.db | SQLite 数据库文件 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | SHIPPING_FEE | 5.00 | 每单运费 |
/// | CART_SECRET | (development 下有默认值) | 购物车令牌签名密钥 |
/// | DB_MAX_CONNECTIONS | 5 | 连接池大小 |
/// | DB_ACQUIRE_TIMEOUT_MS | 5000 | 获取连接超时(毫秒) |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | - | 日志目录 (存在时按天滚动写文件) |
///
/// # 示例
///
/// ```ignore
/// DATABASE_PATH=/data/orders.db HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 数据库文件路径
    pub database_path: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 运费 (2 位小数)
    pub shipping_fee: Decimal,
    /// 购物车令牌 HMAC 密钥
    pub cart_secret: String,
    /// 连接池最大连接数
    pub db_max_connections: u32,
    /// 获取连接超时 (毫秒)
    pub db_acquire_timeout_ms: u64,
    /// 日志级别
    pub log_level: String,
    /// 日志目录
    pub log_dir: Option<String>,
}

impl Config {
    /// Require a secret env var: must be set and non-empty outside development.
    fn require_secret(name: &str, environment: &str) -> Result<String, ServerError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(ServerError::Config(format!(
                        "{name} must be set in {environment} environment"
                    )));
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(ServerError::Config(format!(
                "{name} must not be empty in {environment} environment"
            )));
        }
        Ok(val)
    }

    /// 从环境变量加载配置
    ///
    /// 未设置的项使用默认值；非 development 环境缺少 CART_SECRET 时报错
    pub fn from_env() -> Result<Self, ServerError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let shipping_fee = match std::env::var("SHIPPING_FEE") {
            Ok(raw) => Decimal::from_str(raw.trim())
                .ok()
                .filter(|fee| !fee.is_sign_negative())
                .ok_or_else(|| ServerError::Config(format!("SHIPPING_FEE is not a valid amount: {raw}")))?,
            Err(_) => Decimal::new(500, 2),
        };

        Ok(Self {
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./data/orders.db".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            cart_secret: Self::require_secret("CART_SECRET", &environment)?,
            environment,
            shipping_fee: crate::order_money::round_money(shipping_fee),
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            db_acquire_timeout_ms: std::env::var("DB_ACQUIRE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|s| !s.is_empty()),
        })
    }

    /// 测试用配置：指定数据库路径，其余取默认值
    pub fn for_tests(database_path: impl Into<String>) -> Self {
        Self {
            database_path: database_path.into(),
            http_port: 0,
            environment: "development".into(),
            shipping_fee: Decimal::new(500, 2),
            cart_secret: "test-cart-secret".into(),
            db_max_connections: 1,
            db_acquire_timeout_ms: 5000,
            log_level: "info".into(),
            log_dir: None,
        }
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
