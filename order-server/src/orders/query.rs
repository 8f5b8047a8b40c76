//! Read-side order queries

use super::error::OrderError;
use crate::db::repository::{order, order_log};
use shared::models::{Order, OrderDetailRow, OrderLog};
use sqlx::SqlitePool;

fn dependency(err: crate::db::repository::RepoError) -> OrderError {
    OrderError::Dependency(err.to_string())
}

pub async fn find(pool: &SqlitePool, order_id: i64) -> Result<Order, OrderError> {
    order::find_by_id(pool, order_id)
        .await
        .map_err(|e| OrderError::from_repo(order_id, e))?
        .ok_or(OrderError::NotFound(order_id))
}

/// An order only if it belongs to `client_id`; anything else reads as missing
pub async fn find_for_client(
    pool: &SqlitePool,
    client_id: &str,
    order_id: i64,
) -> Result<Order, OrderError> {
    let order = find(pool, order_id).await?;
    if order.client_id != client_id {
        return Err(OrderError::NotFound(order_id));
    }
    Ok(order)
}

pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Order>, OrderError> {
    order::list_all(pool).await.map_err(dependency)
}

/// Newest first
pub async fn list_for_client(pool: &SqlitePool, client_id: &str) -> Result<Vec<Order>, OrderError> {
    order::list_for_client(pool, client_id)
        .await
        .map_err(dependency)
}

pub async fn count_for_client(pool: &SqlitePool, client_id: &str) -> Result<i64, OrderError> {
    order::count_for_client(pool, client_id)
        .await
        .map_err(dependency)
}

/// Per-line rows from the details view; empty means the order is missing
pub async fn detail_rows(pool: &SqlitePool, order_id: i64) -> Result<Vec<OrderDetailRow>, OrderError> {
    let rows = order::detail_rows(pool, order_id).await.map_err(dependency)?;
    if rows.is_empty() {
        return Err(OrderError::NotFound(order_id));
    }
    Ok(rows)
}

/// Audit log, newest first
pub async fn logs(pool: &SqlitePool) -> Result<Vec<OrderLog>, OrderError> {
    order_log::list_all(pool).await.map_err(dependency)
}
