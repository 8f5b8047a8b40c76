//! Admin API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::core::ServerState;
use crate::orders::{self, ClearReceipt, ClearScope, StatusReport, amount, notifications, query};
use crate::utils::{AppError, AppResult};
use shared::models::{
    Notification, Order, OrderDetailRow, OrderLog, OrderStatus, OrderStatusUpdate, PaymentStatus,
};

/// 订单列表 + 数据库侧汇总
#[derive(Debug, Serialize)]
pub struct OrderBoard {
    pub orders: Vec<Order>,
    pub total_amount: Decimal,
    pub order_count: i64,
}

/// 单个订单 + 进程内汇总
#[derive(Debug, Serialize)]
pub struct AdminOrderView {
    pub order: Order,
    pub order_total: Decimal,
    pub grand_total: Decimal,
    pub fleet_total: Decimal,
    pub fleet_order_count: i64,
    pub client_order_count: i64,
}

/// Raw status form; values are validated against the closed status sets
#[derive(Debug, Default, Deserialize)]
pub struct StatusForm {
    #[serde(default)]
    pub order_status: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
}

fn parse_field<T: FromStr>(field: &str, raw: Option<&str>, allowed: &[&str]) -> AppResult<Option<T>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    raw.parse().map(Some).map_err(|_| {
        AppError::validation(format!("unknown {field}: {raw:?}"))
            .with_detail("field", field)
            .with_detail("value", raw)
            .with_detail("allowed", allowed.to_vec())
    })
}

impl StatusForm {
    fn into_update(self) -> AppResult<OrderStatusUpdate> {
        let order_allowed: Vec<&str> = OrderStatus::ALL.iter().map(|s| s.as_str()).collect();
        let payment_allowed: Vec<&str> = PaymentStatus::ALL.iter().map(|s| s.as_str()).collect();
        Ok(OrderStatusUpdate {
            order_status: parse_field("order_status", self.order_status.as_deref(), &order_allowed)?,
            payment_status: parse_field(
                "payment_status",
                self.payment_status.as_deref(),
                &payment_allowed,
            )?,
        })
    }
}

/// GET /api/admin/orders - 全部订单 (最新在前)
pub async fn list_orders(State(state): State<ServerState>) -> AppResult<Json<OrderBoard>> {
    let orders = query::list_all(&state.pool).await?;
    let total_amount = amount::fleet_total_db(&state.pool).await?;
    let order_count = amount::fleet_count_db(&state.pool).await?;
    Ok(Json(OrderBoard {
        orders,
        total_amount,
        order_count,
    }))
}

/// GET /api/admin/orders/{id} - 订单详情 (进程内计算)
pub async fn get_order(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AdminOrderView>> {
    let order = query::find(&state.pool, id).await?;
    let all = query::list_all(&state.pool).await?;
    let client_order_count = query::count_for_client(&state.pool, &order.client_id).await?;

    Ok(Json(AdminOrderView {
        order_total: amount::order_total(&order),
        grand_total: amount::grand_total(&order),
        fleet_total: amount::fleet_total(&all),
        fleet_order_count: amount::fleet_order_count(&all),
        client_order_count,
        order,
    }))
}

/// PUT /api/admin/orders/{id}/status - 修改订单/支付状态
///
/// 两个字段独立生效；任一失败时返回错误，`details` 中列出已生效和失败的字段
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(form): Json<StatusForm>,
) -> AppResult<Json<StatusReport>> {
    let update = form.into_update()?;
    let report = orders::apply_status(&state.pool, id, &update).await?;
    let Some(code) = report.failure_code() else {
        return Ok(Json(report));
    };

    let message = report
        .failures
        .iter()
        .map(|f| f.message.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    let applied: Vec<&str> = report.applied.iter().map(|f| f.as_str()).collect();
    let failed: Vec<&str> = report.failures.iter().map(|f| f.field.as_str()).collect();

    Err(AppError::with_message(code, message)
        .with_detail("order_id", id)
        .with_detail("applied", applied)
        .with_detail("failed", failed)
        .with_detail("order_status", report.order.order_status.as_str())
        .with_detail("payment_status", report.order.payment_status.as_str()))
}

/// DELETE /api/admin/orders/{id} - 删除订单 (先通知客户)
pub async fn delete_order(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    Ok(Json(orders::delete_order(&state.pool, id).await?))
}

/// GET /api/admin/orders/{id}/details - 订单明细视图
pub async fn order_details(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<OrderDetailRow>>> {
    Ok(Json(query::detail_rows(&state.pool, id).await?))
}

/// GET /api/admin/logs - 订单日志 (最新在前)
pub async fn list_logs(State(state): State<ServerState>) -> AppResult<Json<Vec<OrderLog>>> {
    Ok(Json(query::logs(&state.pool).await?))
}

/// GET /api/admin/notifications - 全部通知 (不改变已读状态)
pub async fn list_notifications(
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<Notification>>> {
    Ok(Json(notifications::list_all(&state.pool).await?))
}

/// POST /api/admin/notifications/clear - 全部标记已读
pub async fn clear_notifications(
    State(state): State<ServerState>,
) -> AppResult<Json<ClearReceipt>> {
    Ok(Json(notifications::clear(&state.pool, &ClearScope::All).await?))
}
