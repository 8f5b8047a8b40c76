//! Database-side total routines
//!
//! Counterparts of the in-process sums in `orders::amount`, computed by
//! SQLite over integer cents.

use super::RepoResult;
use sqlx::SqlitePool;

/// Line total of one order in cents; `None` if the order does not exist
pub async fn order_total_cents(pool: &SqlitePool, order_id: i64) -> RepoResult<Option<i64>> {
    let total = sqlx::query_scalar("SELECT total_cents FROM order_total_view WHERE order_id = ?")
        .bind(order_id)
        .fetch_optional(pool)
        .await?;
    Ok(total)
}

/// Sum of every order's line total in cents
pub async fn fleet_total_cents(pool: &SqlitePool) -> RepoResult<i64> {
    let total = sqlx::query_scalar("SELECT COALESCE(SUM(total_cents), 0) FROM order_total_view")
        .fetch_one(pool)
        .await?;
    Ok(total)
}

pub async fn fleet_order_count(pool: &SqlitePool) -> RepoResult<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::order::tests::{line, seed_order};
    use crate::db::test_pool;

    #[tokio::test]
    async fn test_totals_over_cents() {
        let pool = test_pool().await;
        assert_eq!(fleet_total_cents(&pool).await.unwrap(), 0);
        assert_eq!(fleet_order_count(&pool).await.unwrap(), 0);

        let a = seed_order(&pool, "c1", &[line(1, 3, 1999), line(2, 1, 50)], 1).await;
        let b = seed_order(&pool, "c2", &[line(1, 1, 1999)], 2).await;

        assert_eq!(order_total_cents(&pool, a).await.unwrap(), Some(6047));
        assert_eq!(order_total_cents(&pool, b).await.unwrap(), Some(1999));
        assert_eq!(order_total_cents(&pool, b + 10).await.unwrap(), None);
        assert_eq!(fleet_total_cents(&pool).await.unwrap(), 8046);
        assert_eq!(fleet_order_count(&pool).await.unwrap(), 2);
    }
}
