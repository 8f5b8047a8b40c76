//! Admin API 模块
//!
//! 订单状态、删除、明细、日志和通知。权限检查由上游完成。

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/admin", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/orders", get(handler::list_orders))
        .route(
            "/orders/{id}",
            get(handler::get_order).delete(handler::delete_order),
        )
        .route("/orders/{id}/status", put(handler::update_status))
        .route("/orders/{id}/details", get(handler::order_details))
        .route("/logs", get(handler::list_logs))
        .route("/notifications", get(handler::list_notifications))
        .route("/notifications/clear", post(handler::clear_notifications))
}
