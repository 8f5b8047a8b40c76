//! Order Server - 外卖订单生命周期服务
//!
//! # 架构概述
//!
//! - **购物车** (`cart`): 客户端持有的签名令牌，按实时目录定价
//! - **订单** (`orders`): 下单、状态流转、金额计算、客户通知
//! - **数据库** (`db`): SQLite (sqlx)，权威存储过程以仓储函数实现
//! - **HTTP API** (`api`): axum 路由和处理器
//!
//! # 模块结构
//!
//! ```text
//! order-server/src/
//! ├── core/          # 配置、状态、服务器、错误
//! ├── cart/          # 购物车令牌和定价
//! ├── orders/        # 订单生命周期
//! ├── order_money/   # 金额精度
//! ├── db/            # 连接池、迁移、仓储
//! ├── api/           # HTTP 路由和处理器
//! ├── routes/        # 路由组装和中间件层
//! ├── middleware/    # 请求日志
//! └── utils/         # 日志初始化、错误类型
//! ```

pub mod api;
pub mod cart;
pub mod core;
pub mod db;
pub mod middleware;
pub mod order_money;
pub mod orders;
pub mod routes;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use routes::build_app;
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
