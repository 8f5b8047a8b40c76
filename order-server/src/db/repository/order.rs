//! Order Repository
//!
//! Reads of the order aggregate plus the single insert used by checkout.
//! Status columns are never written here; see [`super::procedures`].

use super::{RepoError, RepoResult, cents, quantity};
use crate::order_money::from_cents;
use rust_decimal::Decimal;
use shared::models::{Order, OrderDetailRow, OrderLine, PaymentMethod, PaymentStatus, OrderStatus};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;

const ORDER_SELECT: &str = "SELECT id, client_id, shipping_fee_cents, delivery_address, payment_method, payment_status, order_status, created_at, idempotency_key FROM orders";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    client_id: String,
    shipping_fee_cents: i64,
    delivery_address: String,
    payment_method: String,
    payment_status: String,
    order_status: String,
    created_at: i64,
    idempotency_key: Option<String>,
}

#[derive(sqlx::FromRow)]
struct LineRow {
    order_id: i64,
    food_id: i64,
    food_name: String,
    quantity: i64,
    unit_price_cents: i64,
}

impl TryFrom<LineRow> for OrderLine {
    type Error = RepoError;

    fn try_from(row: LineRow) -> RepoResult<Self> {
        Ok(OrderLine {
            food_id: row.food_id,
            food_name: row.food_name,
            quantity: quantity(row.quantity)?,
            unit_price: from_cents(row.unit_price_cents),
        })
    }
}

fn corrupt(what: &str, err: impl std::fmt::Display) -> RepoError {
    RepoError::Database(format!("corrupt {what}: {err}"))
}

fn assemble(row: OrderRow, items: Vec<OrderLine>) -> RepoResult<Order> {
    Ok(Order {
        id: row.id,
        client_id: row.client_id,
        items,
        shipping_fee: from_cents(row.shipping_fee_cents),
        delivery_address: row.delivery_address,
        payment_method: row
            .payment_method
            .parse::<PaymentMethod>()
            .map_err(|e| corrupt("payment method", e))?,
        payment_status: row
            .payment_status
            .parse::<PaymentStatus>()
            .map_err(|e| corrupt("payment status", e))?,
        order_status: row
            .order_status
            .parse::<OrderStatus>()
            .map_err(|e| corrupt("order status", e))?,
        created_at: row.created_at,
        idempotency_key: row.idempotency_key,
    })
}

/// Group line rows by order, preserving line position
fn group_lines(rows: Vec<LineRow>) -> RepoResult<HashMap<i64, Vec<OrderLine>>> {
    let mut grouped: HashMap<i64, Vec<OrderLine>> = HashMap::new();
    for row in rows {
        let order_id = row.order_id;
        grouped
            .entry(order_id)
            .or_default()
            .push(OrderLine::try_from(row)?);
    }
    Ok(grouped)
}

fn assemble_all(rows: Vec<OrderRow>, lines: Vec<LineRow>) -> RepoResult<Vec<Order>> {
    let mut grouped = group_lines(lines)?;
    rows.into_iter()
        .map(|row| {
            let items = grouped.remove(&row.id).unwrap_or_default();
            assemble(row, items)
        })
        .collect()
}

async fn lines_for(conn: &mut SqliteConnection, order_id: i64) -> RepoResult<Vec<OrderLine>> {
    let rows = sqlx::query_as::<_, LineRow>(
        "SELECT order_id, food_id, food_name, quantity, unit_price_cents FROM order_line WHERE order_id = ? ORDER BY position",
    )
    .bind(order_id)
    .fetch_all(&mut *conn)
    .await?;
    rows.into_iter().map(OrderLine::try_from).collect()
}

/// Load one order with its lines on an existing connection / transaction
pub async fn find_by_id_in(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Order>> {
    let row = sqlx::query_as::<_, OrderRow>(&format!("{ORDER_SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    let Some(row) = row else {
        return Ok(None);
    };
    let items = lines_for(conn, id).await?;
    assemble(row, items).map(Some)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let mut conn = pool.acquire().await?;
    find_by_id_in(&mut conn, id).await
}

pub async fn find_by_idempotency_key(
    pool: &SqlitePool,
    client_id: &str,
    key: &str,
) -> RepoResult<Option<Order>> {
    let mut conn = pool.acquire().await?;
    let id: Option<i64> =
        sqlx::query_scalar("SELECT id FROM orders WHERE client_id = ? AND idempotency_key = ?")
            .bind(client_id)
            .bind(key)
            .fetch_optional(&mut *conn)
            .await?;
    match id {
        Some(id) => find_by_id_in(&mut conn, id).await,
        None => Ok(None),
    }
}

/// All orders, newest first
pub async fn list_all(pool: &SqlitePool) -> RepoResult<Vec<Order>> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        "{ORDER_SELECT} ORDER BY created_at DESC, id DESC"
    ))
    .fetch_all(pool)
    .await?;
    let lines = sqlx::query_as::<_, LineRow>(
        "SELECT order_id, food_id, food_name, quantity, unit_price_cents FROM order_line ORDER BY order_id, position",
    )
    .fetch_all(pool)
    .await?;
    assemble_all(rows, lines)
}

/// One client's orders, newest first
pub async fn list_for_client(pool: &SqlitePool, client_id: &str) -> RepoResult<Vec<Order>> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        "{ORDER_SELECT} WHERE client_id = ? ORDER BY created_at DESC, id DESC"
    ))
    .bind(client_id)
    .fetch_all(pool)
    .await?;
    let lines = sqlx::query_as::<_, LineRow>(
        "SELECT l.order_id, l.food_id, l.food_name, l.quantity, l.unit_price_cents FROM order_line l \
         JOIN orders o ON o.id = l.order_id WHERE o.client_id = ? ORDER BY l.order_id, l.position",
    )
    .bind(client_id)
    .fetch_all(pool)
    .await?;
    assemble_all(rows, lines)
}

pub async fn count_for_client(pool: &SqlitePool, client_id: &str) -> RepoResult<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE client_id = ?")
        .bind(client_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Fields of a new order; status values come from checkout
pub struct NewOrder<'a> {
    pub client_id: &'a str,
    pub items: &'a [OrderLine],
    pub shipping_fee: Decimal,
    pub delivery_address: &'a str,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    pub created_at: i64,
    pub idempotency_key: Option<&'a str>,
}

/// Insert the order header and its lines; returns the new order id.
///
/// Must run inside the caller's transaction so header and lines land together.
pub async fn insert(conn: &mut SqliteConnection, order: &NewOrder<'_>) -> RepoResult<i64> {
    if order.items.is_empty() {
        return Err(RepoError::Validation("an order needs at least one line".into()));
    }

    let order_id = sqlx::query(
        "INSERT INTO orders (client_id, shipping_fee_cents, delivery_address, payment_method, payment_status, order_status, created_at, idempotency_key) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(order.client_id)
    .bind(cents(order.shipping_fee, "shipping fee")?)
    .bind(order.delivery_address)
    .bind(order.payment_method.as_str())
    .bind(order.payment_status.as_str())
    .bind(order.order_status.as_str())
    .bind(order.created_at)
    .bind(order.idempotency_key)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    for (position, line) in order.items.iter().enumerate() {
        if line.quantity == 0 {
            return Err(RepoError::Validation(format!(
                "line for food {} has zero quantity",
                line.food_id
            )));
        }
        sqlx::query(
            "INSERT INTO order_line (order_id, position, food_id, food_name, quantity, unit_price_cents) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(order_id)
        .bind(position as i64)
        .bind(line.food_id)
        .bind(&line.food_name)
        .bind(i64::from(line.quantity))
        .bind(cents(line.unit_price, "unit price")?)
        .execute(&mut *conn)
        .await?;
    }

    Ok(order_id)
}

#[derive(sqlx::FromRow)]
struct DetailRow {
    order_id: i64,
    client_id: String,
    customer_first_name: Option<String>,
    customer_last_name: Option<String>,
    customer_email: Option<String>,
    customer_phone: Option<String>,
    food_name: String,
    quantity: i64,
    unit_price_cents: i64,
    item_total_cents: i64,
    total_amount_cents: i64,
}

/// Per-line rows from `order_details_view`
pub async fn detail_rows(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderDetailRow>> {
    let rows = sqlx::query_as::<_, DetailRow>(
        "SELECT order_id, client_id, customer_first_name, customer_last_name, customer_email, customer_phone, \
         food_name, quantity, unit_price_cents, item_total_cents, total_amount_cents \
         FROM order_details_view WHERE order_id = ? ORDER BY position",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|r| {
            Ok(OrderDetailRow {
                order_id: r.order_id,
                client_id: r.client_id,
                customer_first_name: r.customer_first_name,
                customer_last_name: r.customer_last_name,
                customer_email: r.customer_email,
                customer_phone: r.customer_phone,
                food_name: r.food_name,
                quantity: quantity(r.quantity)?,
                unit_price: from_cents(r.unit_price_cents),
                item_total: from_cents(r.item_total_cents),
                total_amount: from_cents(r.total_amount_cents),
            })
        })
        .collect()
}
