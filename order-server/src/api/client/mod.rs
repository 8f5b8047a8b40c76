//! Client API 模块 - 当前客户的订单和通知

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/client", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/orders", get(handler::list_orders))
        .route("/orders/{id}", get(handler::get_order))
        .route("/notifications", get(handler::list_notifications))
        .route("/notifications/unread-count", get(handler::unread_count))
        .route("/notifications/clear", post(handler::clear_notifications))
}
