//! Notification Repository
//!
//! Notifications are never deleted and their message/context columns are
//! never updated; only `is_read` changes.

use super::{RepoError, RepoResult, begin_write, cents, quantity};
use crate::order_money::from_cents;
use shared::models::{Notification, NotificationCreate, OrderContext};
use sqlx::{Sqlite, SqliteConnection, SqlitePool};

const NOTIFICATION_SELECT: &str = "SELECT id, user_id, message, created_at, is_read, customer_name, order_id, order_status, order_date, food_name, item_price_cents, item_quantity, item_total_cents FROM notification";

#[derive(sqlx::FromRow)]
struct NotificationRow {
    id: i64,
    user_id: String,
    message: String,
    created_at: i64,
    is_read: bool,
    customer_name: Option<String>,
    order_id: Option<i64>,
    order_status: Option<String>,
    order_date: Option<i64>,
    food_name: Option<String>,
    item_price_cents: Option<i64>,
    item_quantity: Option<i64>,
    item_total_cents: Option<i64>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = RepoError;

    fn try_from(row: NotificationRow) -> RepoResult<Self> {
        let context = OrderContext {
            customer_name: row.customer_name,
            order_id: row.order_id,
            order_status: row.order_status,
            order_date: row.order_date,
            food_name: row.food_name,
            item_price: row.item_price_cents.map(from_cents),
            item_quantity: row.item_quantity.map(quantity).transpose()?,
            item_total: row.item_total_cents.map(from_cents),
        };
        Ok(Notification {
            id: row.id,
            user_id: row.user_id,
            message: row.message,
            created_at: row.created_at,
            is_read: row.is_read,
            context: (context != OrderContext::default()).then_some(context),
        })
    }
}

fn rows_into(rows: Vec<NotificationRow>) -> RepoResult<Vec<Notification>> {
    rows.into_iter().map(Notification::try_from).collect()
}

/// Append a notification (unread)
pub async fn insert<'e, E>(
    executor: E,
    data: &NotificationCreate,
    created_at: i64,
) -> RepoResult<Notification>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let ctx = data.context.clone().unwrap_or_default();
    let item_price = ctx.item_price.map(|p| cents(p, "item price")).transpose()?;
    let item_total = ctx.item_total.map(|p| cents(p, "item total")).transpose()?;

    let id = sqlx::query(
        "INSERT INTO notification (user_id, message, created_at, is_read, customer_name, order_id, order_status, order_date, food_name, item_price_cents, item_quantity, item_total_cents) \
         VALUES (?, ?, ?, 0, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&data.user_id)
    .bind(&data.message)
    .bind(created_at)
    .bind(&ctx.customer_name)
    .bind(ctx.order_id)
    .bind(&ctx.order_status)
    .bind(ctx.order_date)
    .bind(&ctx.food_name)
    .bind(item_price)
    .bind(ctx.item_quantity.map(i64::from))
    .bind(item_total)
    .execute(executor)
    .await?
    .last_insert_rowid();

    Ok(Notification {
        id,
        user_id: data.user_id.clone(),
        message: data.message.clone(),
        created_at,
        is_read: false,
        context: data.context.clone().filter(|c| *c != OrderContext::default()),
    })
}

/// A user's notifications, newest first, marking every unread one as read.
///
/// Returns the list (already showing `is_read = true`) and how many entries
/// this call flipped.
pub async fn list_for_user_marking_read(
    pool: &SqlitePool,
    user_id: &str,
) -> RepoResult<(Vec<Notification>, u64)> {
    let mut tx = begin_write(pool).await?;

    let marked = sqlx::query("UPDATE notification SET is_read = 1 WHERE user_id = ? AND is_read = 0")
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let rows = sqlx::query_as::<_, NotificationRow>(&format!(
        "{NOTIFICATION_SELECT} WHERE user_id = ? ORDER BY created_at DESC, id DESC"
    ))
    .bind(user_id)
    .fetch_all(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok((rows_into(rows)?, marked))
}

/// Every notification, newest first, read state untouched
pub async fn list_all(pool: &SqlitePool) -> RepoResult<Vec<Notification>> {
    let rows = sqlx::query_as::<_, NotificationRow>(&format!(
        "{NOTIFICATION_SELECT} ORDER BY created_at DESC, id DESC"
    ))
    .fetch_all(pool)
    .await?;
    rows_into(rows)
}

pub async fn unread_count(pool: &SqlitePool, user_id: &str) -> RepoResult<i64> {
    let count =
        sqlx::query_scalar("SELECT COUNT(*) FROM notification WHERE user_id = ? AND is_read = 0")
            .bind(user_id)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

/// Write one control record (`trigger_activated = 1`); `None` scope = all users
pub async fn insert_trigger_control(
    conn: &mut SqliteConnection,
    scope_user_id: Option<&str>,
    created_at: i64,
) -> RepoResult<i64> {
    let id = sqlx::query(
        "INSERT INTO trigger_control (trigger_activated, scope_user_id, created_at) VALUES (1, ?, ?)",
    )
    .bind(scope_user_id)
    .bind(created_at)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();
    Ok(id)
}

/// Mark every unread notification in scope as read; returns affected rows
pub async fn mark_read(conn: &mut SqliteConnection, scope_user_id: Option<&str>) -> RepoResult<u64> {
    let result = match scope_user_id {
        Some(user_id) => {
            sqlx::query("UPDATE notification SET is_read = 1 WHERE user_id = ? AND is_read = 0")
                .bind(user_id)
                .execute(&mut *conn)
                .await?
        }
        None => {
            sqlx::query("UPDATE notification SET is_read = 1 WHERE is_read = 0")
                .execute(&mut *conn)
                .await?
        }
    };
    Ok(result.rows_affected())
}

pub async fn trigger_control_count(pool: &SqlitePool) -> RepoResult<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM trigger_control")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
