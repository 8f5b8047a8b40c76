use sqlx::SqlitePool;

use crate::cart::CartCodec;
use crate::core::{Config, ServerError};
use crate::db::DbService;

/// 服务器状态 - 所有请求共享
///
/// Cheap to clone: the pool and codec are reference-counted internally.
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 连接池
    pub pool: SqlitePool,
    /// 购物车令牌编解码器
    pub cart_codec: CartCodec,
}

impl ServerState {
    /// Open the database (running migrations) and build the state
    pub async fn initialize(config: &Config) -> Result<Self, ServerError> {
        let db = DbService::new(config)
            .await
            .map_err(|e| ServerError::Database(e.message))?;
        Self::with_pool(config.clone(), db.pool)
    }

    /// Build the state around an existing pool (tests, in-memory databases)
    pub fn with_pool(config: Config, pool: SqlitePool) -> Result<Self, ServerError> {
        let cart_codec = CartCodec::new(config.cart_secret.as_bytes())
            .map_err(|e| ServerError::Config(format!("invalid CART_SECRET: {e}")))?;
        Ok(Self {
            config,
            pool,
            cart_codec,
        })
    }
}
