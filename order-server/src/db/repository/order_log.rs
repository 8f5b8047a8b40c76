//! Order Log Repository (append-only)

use super::RepoResult;
use shared::models::OrderLog;
use sqlx::{SqliteConnection, SqlitePool};

pub async fn append(
    conn: &mut SqliteConnection,
    order_id: i64,
    client_id: &str,
    message: &str,
    created_at: i64,
) -> RepoResult<i64> {
    let id = sqlx::query(
        "INSERT INTO order_log (order_id, client_id, created_at, log_message) VALUES (?, ?, ?, ?)",
    )
    .bind(order_id)
    .bind(client_id)
    .bind(created_at)
    .bind(message)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();
    Ok(id)
}

/// All entries, newest first
pub async fn list_all(pool: &SqlitePool) -> RepoResult<Vec<OrderLog>> {
    let rows = sqlx::query_as::<_, OrderLog>(
        "SELECT id, order_id, client_id, created_at, log_message FROM order_log ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Entries for one order, oldest first
pub async fn list_for_order(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderLog>> {
    let rows = sqlx::query_as::<_, OrderLog>(
        "SELECT id, order_id, client_id, created_at, log_message FROM order_log WHERE order_id = ? ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn test_append_and_list() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        append(&mut conn, 1, "c1", "Order created", 100).await.unwrap();
        append(&mut conn, 1, "c1", "Order status changed", 200).await.unwrap();
        append(&mut conn, 2, "c2", "Order created", 150).await.unwrap();
        drop(conn);

        let all = list_all(&pool).await.unwrap();
        let times: Vec<i64> = all.iter().map(|l| l.created_at).collect();
        assert_eq!(times, vec![200, 150, 100]);

        let for_one = list_for_order(&pool, 1).await.unwrap();
        assert_eq!(for_one.len(), 2);
        assert_eq!(for_one[0].log_message, "Order created");
    }
}
