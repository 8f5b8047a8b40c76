//! Notification relay
//!
//! Append-only store of customer notifications. Listing a user's
//! notifications marks them read. `clear` writes one control record and runs
//! the batch mark-read in the same transaction.

use crate::db::repository::{RepoResult, begin_write, notification};
use serde::Serialize;
use shared::models::{Notification, NotificationCreate, OrderContext};
use sqlx::SqlitePool;

/// Who a `clear` applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearScope {
    User(String),
    All,
}

impl ClearScope {
    fn user_id(&self) -> Option<&str> {
        match self {
            ClearScope::User(id) => Some(id),
            ClearScope::All => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClearReceipt {
    pub control_id: i64,
    pub marked: u64,
}

pub async fn notify(
    pool: &SqlitePool,
    user_id: &str,
    message: &str,
    context: Option<OrderContext>,
) -> RepoResult<Notification> {
    let created = notification::insert(
        pool,
        &NotificationCreate {
            user_id: user_id.to_string(),
            message: message.to_string(),
            context,
        },
        shared::util::now_millis(),
    )
    .await?;
    tracing::debug!(notification_id = created.id, user_id = %user_id, "Notification recorded");
    Ok(created)
}

/// Newest first; every unread entry is marked read by this call
pub async fn list_for(pool: &SqlitePool, user_id: &str) -> RepoResult<Vec<Notification>> {
    let (list, marked) = notification::list_for_user_marking_read(pool, user_id).await?;
    if marked > 0 {
        tracing::debug!(user_id = %user_id, marked, "Notifications marked read on listing");
    }
    Ok(list)
}

/// Staff view: everything, newest first, read flags untouched
pub async fn list_all(pool: &SqlitePool) -> RepoResult<Vec<Notification>> {
    notification::list_all(pool).await
}

pub async fn unread_count(pool: &SqlitePool, user_id: &str) -> RepoResult<i64> {
    notification::unread_count(pool, user_id).await
}

/// Record exactly one control entry and mark the scope's notifications read
pub async fn clear(pool: &SqlitePool, scope: &ClearScope) -> RepoResult<ClearReceipt> {
    let mut tx = begin_write(pool).await?;
    let control_id =
        notification::insert_trigger_control(&mut tx, scope.user_id(), shared::util::now_millis())
            .await?;
    let marked = notification::mark_read(&mut tx, scope.user_id()).await?;
    tx.commit().await?;

    tracing::info!(control_id, marked, scope = ?scope, "Notifications cleared");
    Ok(ClearReceipt { control_id, marked })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_notify_then_list_marks_read() {
        let pool = crate::db::test_pool().await;
        notify(&pool, "u1", "first", None).await.unwrap();
        notify(&pool, "u1", "second", None).await.unwrap();

        let listed = list_for(&pool, "u1").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].message, "second");
        assert!(listed.iter().all(|n| n.is_read));

        let again = list_for(&pool, "u1").await.unwrap();
        assert_eq!(again, listed);
    }

    #[tokio::test]
    async fn test_clear_writes_one_control_record_per_call() {
        let pool = crate::db::test_pool().await;
        notify(&pool, "u1", "a", None).await.unwrap();
        notify(&pool, "u2", "b", None).await.unwrap();

        let receipt = clear(&pool, &ClearScope::User("u1".into())).await.unwrap();
        assert_eq!(receipt.marked, 1);
        assert_eq!(unread_count(&pool, "u2").await.unwrap(), 1);

        let receipt = clear(&pool, &ClearScope::All).await.unwrap();
        assert_eq!(receipt.marked, 1);

        // nothing left to mark, but the control record is still written
        let receipt = clear(&pool, &ClearScope::All).await.unwrap();
        assert_eq!(receipt.marked, 0);
        assert_eq!(notification::trigger_control_count(&pool).await.unwrap(), 3);

        // clearing never deletes
        assert_eq!(list_all(&pool).await.unwrap().len(), 2);
    }
}
