//! Authoritative order procedures
//!
//! These are the only functions that write `orders.order_status`,
//! `orders.payment_status` or delete an order. Each one runs in a single
//! transaction that also appends an [`OrderLog`](shared::models::OrderLog)
//! entry and a customer notification, so those side effects happen exactly
//! when the write happens.

use super::{RepoError, RepoResult, begin_write, client, notification, order, order_log};
use shared::models::{NotificationCreate, Order, OrderContext, OrderStatus, PaymentStatus};
use sqlx::{SqliteConnection, SqlitePool};

pub const ORDER_DELETED_MESSAGE: &str = "Your order has been deleted.";

/// Result of a successful status procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange<S> {
    pub order_id: i64,
    pub from: S,
    pub to: S,
}

async fn load(conn: &mut SqliteConnection, order_id: i64) -> RepoResult<Order> {
    order::find_by_id_in(conn, order_id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("order {order_id}")))
}

async fn context_for(conn: &mut SqliteConnection, order: &Order) -> RepoResult<OrderContext> {
    let customer = client::find_by_id(&mut *conn, &order.client_id).await?;
    Ok(OrderContext {
        customer_name: customer.map(|c| c.full_name()).filter(|n| !n.is_empty()),
        order_id: Some(order.id),
        order_status: Some(order.order_status.as_str().to_string()),
        order_date: Some(order.created_at),
        ..OrderContext::default()
    })
}

async fn record(
    conn: &mut SqliteConnection,
    order: &Order,
    log_message: &str,
    customer_message: String,
    now: i64,
) -> RepoResult<()> {
    order_log::append(conn, order.id, &order.client_id, log_message, now).await?;
    let context = context_for(conn, order).await?;
    notification::insert(
        &mut *conn,
        &NotificationCreate {
            user_id: order.client_id.clone(),
            message: customer_message,
            context: Some(context),
        },
        now,
    )
    .await?;
    Ok(())
}

/// Set the order status of one order
pub async fn update_order_status(
    pool: &SqlitePool,
    order_id: i64,
    new_status: OrderStatus,
) -> RepoResult<StatusChange<OrderStatus>> {
    let now = shared::util::now_millis();
    let mut tx = begin_write(pool).await?;

    let mut current = load(&mut tx, order_id).await?;
    let from = current.order_status;
    if !from.can_transition_to(new_status) {
        return Err(RepoError::Validation(format!(
            "order {order_id}: cannot change order status from {from} to {new_status}"
        )));
    }

    sqlx::query("UPDATE orders SET order_status = ? WHERE id = ?")
        .bind(new_status.as_str())
        .bind(order_id)
        .execute(&mut *tx)
        .await?;
    current.order_status = new_status;

    record(
        &mut tx,
        &current,
        &format!("Order status changed from {from} to {new_status}"),
        format!("Your order #{order_id} is now {new_status}."),
        now,
    )
    .await?;

    tx.commit().await?;
    Ok(StatusChange {
        order_id,
        from,
        to: new_status,
    })
}

/// Set the payment status of one order
pub async fn update_payment_status(
    pool: &SqlitePool,
    order_id: i64,
    new_status: PaymentStatus,
) -> RepoResult<StatusChange<PaymentStatus>> {
    let now = shared::util::now_millis();
    let mut tx = begin_write(pool).await?;

    let mut current = load(&mut tx, order_id).await?;
    let from = current.payment_status;
    if !from.can_transition_to(new_status) {
        return Err(RepoError::Validation(format!(
            "order {order_id}: cannot change payment status from {from} to {new_status}"
        )));
    }

    sqlx::query("UPDATE orders SET payment_status = ? WHERE id = ?")
        .bind(new_status.as_str())
        .bind(order_id)
        .execute(&mut *tx)
        .await?;
    current.payment_status = new_status;

    record(
        &mut tx,
        &current,
        &format!("Payment status changed from {from} to {new_status}"),
        format!("Payment for your order #{order_id} is now {new_status}."),
        now,
    )
    .await?;

    tx.commit().await?;
    Ok(StatusChange {
        order_id,
        from,
        to: new_status,
    })
}

/// Notify the customer, then delete the order and its lines.
///
/// Both happen in one transaction: a failed delete leaves no notification.
pub async fn delete_order(pool: &SqlitePool, order_id: i64) -> RepoResult<Order> {
    let now = shared::util::now_millis();
    let mut tx = begin_write(pool).await?;

    let current = load(&mut tx, order_id).await?;
    record(
        &mut tx,
        &current,
        "Order deleted",
        ORDER_DELETED_MESSAGE.to_string(),
        now,
    )
    .await?;

    sqlx::query("DELETE FROM order_line WHERE order_id = ?")
        .bind(order_id)
        .execute(&mut *tx)
        .await?;
    let deleted = sqlx::query("DELETE FROM orders WHERE id = ?")
        .bind(order_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    if deleted != 1 {
        return Err(RepoError::Database(format!(
            "order {order_id}: expected to delete 1 row, deleted {deleted}"
        )));
    }

    tx.commit().await?;
    Ok(current)
}
