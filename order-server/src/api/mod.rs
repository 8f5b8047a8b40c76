//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`cart`] - 购物车 (令牌保存在 `shopping_cart` cookie)
//! - [`client`] - 客户订单和通知
//! - [`admin`] - 订单状态管理、日志和通知 (权限由上游网关控制)
//!
//! 调用方身份由上游认证服务通过 `x-client-id` 请求头传入。

pub mod extract;

pub mod admin;
pub mod cart;
pub mod client;
pub mod health;

pub use extract::{CART_COOKIE, CLIENT_ID_HEADER, ClientId};

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};
