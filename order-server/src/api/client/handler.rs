//! Client API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::api::ClientId;
use crate::core::ServerState;
use crate::orders::{ClearReceipt, ClearScope, amount, notifications, query};
use crate::utils::AppResult;
use shared::models::{Notification, Order};

#[derive(Debug, Serialize)]
pub struct ClientOrder {
    #[serde(flatten)]
    pub order: Order,
    /// 商品合计 (不含运费)
    pub total_amount: Decimal,
    /// 含运费
    pub grand_total: Decimal,
}

impl From<Order> for ClientOrder {
    fn from(order: Order) -> Self {
        Self {
            total_amount: amount::order_total(&order),
            grand_total: amount::grand_total(&order),
            order,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: i64,
}

/// GET /api/client/orders - 我的订单 (最新在前)
pub async fn list_orders(
    State(state): State<ServerState>,
    ClientId(client_id): ClientId,
) -> AppResult<Json<Vec<ClientOrder>>> {
    let orders = query::list_for_client(&state.pool, &client_id).await?;
    Ok(Json(orders.into_iter().map(ClientOrder::from).collect()))
}

/// GET /api/client/orders/{id} - 订单详情
///
/// 合计金额经两条路径核对 (进程内 + 数据库侧)，不一致时报错；
/// 不属于当前客户的订单按不存在处理
pub async fn get_order(
    State(state): State<ServerState>,
    ClientId(client_id): ClientId,
    Path(id): Path<i64>,
) -> AppResult<Json<ClientOrder>> {
    let order = query::find_for_client(&state.pool, &client_id, id).await?;
    let total_amount = amount::verified_order_total(&state.pool, id).await?;
    Ok(Json(ClientOrder {
        grand_total: amount::with_shipping(total_amount, order.shipping_fee),
        total_amount,
        order,
    }))
}

/// GET /api/client/notifications - 我的通知 (读取即标记已读)
pub async fn list_notifications(
    State(state): State<ServerState>,
    ClientId(client_id): ClientId,
) -> AppResult<Json<Vec<Notification>>> {
    Ok(Json(notifications::list_for(&state.pool, &client_id).await?))
}

/// GET /api/client/notifications/unread-count
pub async fn unread_count(
    State(state): State<ServerState>,
    ClientId(client_id): ClientId,
) -> AppResult<Json<UnreadCount>> {
    let count = notifications::unread_count(&state.pool, &client_id).await?;
    Ok(Json(UnreadCount { count }))
}

/// POST /api/client/notifications/clear
pub async fn clear_notifications(
    State(state): State<ServerState>,
    ClientId(client_id): ClientId,
) -> AppResult<Json<ClearReceipt>> {
    let receipt = notifications::clear(&state.pool, &ClearScope::User(client_id)).await?;
    Ok(Json(receipt))
}
