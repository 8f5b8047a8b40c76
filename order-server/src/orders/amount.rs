//! Amount calculator
//!
//! Two equivalent paths for every figure: in-process over loaded orders
//! (`Decimal` arithmetic) and database-side over stored cents
//! (`order_total_view`). Line totals exclude shipping; [`grand_total`] adds it.

use super::error::OrderError;
use crate::db::repository::{amount, order};
use crate::order_money::{from_cents, lines_total, round_money};
use rust_decimal::Decimal;
use shared::models::Order;
use sqlx::SqlitePool;

// ========== In-process ==========

pub fn order_total(order: &Order) -> Decimal {
    lines_total(&order.items)
}

/// Line totals plus shipping
pub fn grand_total(order: &Order) -> Decimal {
    with_shipping(order_total(order), order.shipping_fee)
}

/// Add the shipping fee to a line total computed on either path
pub fn with_shipping(line_total: Decimal, shipping_fee: Decimal) -> Decimal {
    round_money(line_total + shipping_fee)
}

pub fn fleet_total(orders: &[Order]) -> Decimal {
    round_money(orders.iter().map(order_total).sum())
}

pub fn fleet_order_count(orders: &[Order]) -> i64 {
    orders.len() as i64
}

/// Load one order and total it in-process
pub async fn order_total_loaded(pool: &SqlitePool, order_id: i64) -> Result<Decimal, OrderError> {
    let order = order::find_by_id(pool, order_id)
        .await
        .map_err(|e| OrderError::from_repo(order_id, e))?
        .ok_or(OrderError::NotFound(order_id))?;
    Ok(order_total(&order))
}

// ========== Database-side ==========

pub async fn order_total_db(pool: &SqlitePool, order_id: i64) -> Result<Decimal, OrderError> {
    amount::order_total_cents(pool, order_id)
        .await
        .map_err(|e| OrderError::Dependency(e.to_string()))?
        .map(from_cents)
        .ok_or(OrderError::NotFound(order_id))
}

pub async fn fleet_total_db(pool: &SqlitePool) -> Result<Decimal, OrderError> {
    let cents = amount::fleet_total_cents(pool)
        .await
        .map_err(|e| OrderError::Dependency(e.to_string()))?;
    Ok(from_cents(cents))
}

pub async fn fleet_count_db(pool: &SqlitePool) -> Result<i64, OrderError> {
    amount::fleet_order_count(pool)
        .await
        .map_err(|e| OrderError::Dependency(e.to_string()))
}

/// Compute an order's total on both paths; divergence is an error
pub async fn verified_order_total(pool: &SqlitePool, order_id: i64) -> Result<Decimal, OrderError> {
    let in_process = order_total_loaded(pool, order_id).await?;
    let database = order_total_db(pool, order_id).await?;
    if in_process != database {
        tracing::error!(
            order_id,
            in_process = %in_process,
            database = %database,
            "Order total differs between in-process and database paths"
        );
        return Err(OrderError::AmountMismatch {
            order_id,
            in_process,
            database,
        });
    }
    Ok(database)
}
