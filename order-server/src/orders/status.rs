//! Order status engine
//!
//! Applies admin status changes through the authoritative procedures in
//! [`procedures`]. The two axes are independent: each present field is one
//! procedure call and one transaction, and the report says which ones landed.

use super::error::OrderError;
use crate::db::repository::{RepoError, order, procedures};
use serde::Serialize;
use shared::error::ErrorCode;
use shared::models::{Order, OrderStatusUpdate};
use sqlx::SqlitePool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusField {
    OrderStatus,
    PaymentStatus,
}

impl StatusField {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusField::OrderStatus => "order_status",
            StatusField::PaymentStatus => "payment_status",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldFailure {
    pub field: StatusField,
    pub message: String,
    /// `true` when the transition itself was refused, `false` on a storage failure
    pub rejected: bool,
}

/// Outcome of [`apply_status`]; `order` is re-read after the writes
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub order: Order,
    pub applied: Vec<StatusField>,
    pub failures: Vec<FieldFailure>,
}

impl StatusReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Error code for an incomplete report.
    ///
    /// Any storage failure wins; otherwise the refused axis names the code,
    /// with the order axis taking precedence when both were refused.
    pub fn failure_code(&self) -> Option<ErrorCode> {
        if self.failures.is_empty() {
            return None;
        }
        if self.failures.iter().any(|f| !f.rejected) {
            return Some(ErrorCode::OrderStatusUpdateFailed);
        }
        let order_refused = self
            .failures
            .iter()
            .any(|f| f.field == StatusField::OrderStatus);
        Some(if order_refused {
            ErrorCode::OrderInvalidTransition
        } else {
            ErrorCode::PaymentInvalidTransition
        })
    }
}

fn failure(field: StatusField, err: RepoError) -> FieldFailure {
    let rejected = matches!(err, RepoError::Validation(_));
    let message = match err {
        RepoError::Validation(msg) => msg,
        other => other.to_string(),
    };
    FieldFailure {
        field,
        message,
        rejected,
    }
}

async fn load(pool: &SqlitePool, order_id: i64) -> Result<Order, OrderError> {
    order::find_by_id(pool, order_id)
        .await
        .map_err(|e| OrderError::from_repo(order_id, e))?
        .ok_or(OrderError::NotFound(order_id))
}

/// Apply the present fields of `update` to one order.
///
/// Absent fields are untouched; with both absent nothing is written.
pub async fn apply_status(
    pool: &SqlitePool,
    order_id: i64,
    update: &OrderStatusUpdate,
) -> Result<StatusReport, OrderError> {
    let current = load(pool, order_id).await?;
    if update.order_status.is_none() && update.payment_status.is_none() {
        return Ok(StatusReport {
            order: current,
            applied: Vec::new(),
            failures: Vec::new(),
        });
    }

    let mut applied = Vec::new();
    let mut failures = Vec::new();

    if let Some(next) = update.order_status {
        match procedures::update_order_status(pool, order_id, next).await {
            Ok(change) => {
                tracing::info!(order_id, from = %change.from, to = %change.to, "Order status applied");
                applied.push(StatusField::OrderStatus);
            }
            Err(RepoError::NotFound(_)) => return Err(OrderError::NotFound(order_id)),
            Err(e) => {
                tracing::error!(order_id, error = %e, "Order status update failed");
                failures.push(failure(StatusField::OrderStatus, e));
            }
        }
    }

    if let Some(next) = update.payment_status {
        match procedures::update_payment_status(pool, order_id, next).await {
            Ok(change) => {
                tracing::info!(order_id, from = %change.from, to = %change.to, "Payment status applied");
                applied.push(StatusField::PaymentStatus);
            }
            Err(RepoError::NotFound(_)) => return Err(OrderError::NotFound(order_id)),
            Err(e) => {
                tracing::error!(order_id, error = %e, "Payment status update failed");
                failures.push(failure(StatusField::PaymentStatus, e));
            }
        }
    }

    Ok(StatusReport {
        order: load(pool, order_id).await?,
        applied,
        failures,
    })
}

/// Notify the customer and delete the order, atomically
pub async fn delete_order(pool: &SqlitePool, order_id: i64) -> Result<Order, OrderError> {
    match procedures::delete_order(pool, order_id).await {
        Ok(order) => {
            tracing::info!(order_id, client_id = %order.client_id, "Order deleted");
            Ok(order)
        }
        Err(RepoError::NotFound(_)) => Err(OrderError::NotFound(order_id)),
        Err(e) => {
            tracing::error!(order_id, error = %e, "Order delete failed");
            Err(OrderError::DeleteFailed {
                order_id,
                message: e.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::order::tests::{line, seed_order};
    use crate::db::repository::{notification, order_log};
    use crate::db::test_pool;
    use shared::models::{OrderStatus, PaymentStatus};

    fn update(order: Option<OrderStatus>, payment: Option<PaymentStatus>) -> OrderStatusUpdate {
        OrderStatusUpdate {
            order_status: order,
            payment_status: payment,
        }
    }

    #[tokio::test]
    async fn test_empty_update_is_a_no_op() {
        let pool = test_pool().await;
        let id = seed_order(&pool, "c1", &[line(1, 1, 100)], 1).await;
        let before = order::find_by_id(&pool, id).await.unwrap().unwrap();

        for _ in 0..2 {
            let report = apply_status(&pool, id, &update(None, None)).await.unwrap();
            assert_eq!(report.order, before);
            assert!(report.applied.is_empty());
            assert!(report.is_complete());
        }
        assert!(order_log::list_all(&pool).await.unwrap().is_empty());
        assert!(notification::list_all(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_payment_only_leaves_order_status() {
        let pool = test_pool().await;
        let id = seed_order(&pool, "c1", &[line(1, 1, 100)], 1).await;

        let report = apply_status(&pool, id, &update(None, Some(PaymentStatus::Paid)))
            .await
            .unwrap();

        assert_eq!(report.applied, vec![StatusField::PaymentStatus]);
        assert_eq!(report.order.payment_status, PaymentStatus::Paid);
        assert_eq!(report.order.order_status, OrderStatus::Created);
    }

    #[tokio::test]
    async fn test_one_field_fails_other_still_reported() {
        let pool = test_pool().await;
        let id = seed_order(&pool, "c1", &[line(1, 1, 100)], 1).await;

        // pending -> refunded is refused; the order status still moves
        let report = apply_status(
            &pool,
            id,
            &update(Some(OrderStatus::Preparing), Some(PaymentStatus::Refunded)),
        )
        .await
        .unwrap();

        assert_eq!(report.applied, vec![StatusField::OrderStatus]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].field, StatusField::PaymentStatus);
        assert!(report.failures[0].rejected);
        assert_eq!(report.order.order_status, OrderStatus::Preparing);
        assert_eq!(report.order.payment_status, PaymentStatus::Pending);
        assert_eq!(report.failure_code(), Some(ErrorCode::PaymentInvalidTransition));
    }

    #[tokio::test]
    async fn test_failure_code_follows_refused_axis() {
        let pool = test_pool().await;
        let id = seed_order(&pool, "c1", &[line(1, 1, 100)], 1).await;

        let ok = apply_status(&pool, id, &update(Some(OrderStatus::Delivered), None))
            .await
            .unwrap();
        assert_eq!(ok.failure_code(), None);

        let order_refused = apply_status(&pool, id, &update(Some(OrderStatus::Preparing), None))
            .await
            .unwrap();
        assert_eq!(order_refused.failure_code(), Some(ErrorCode::OrderInvalidTransition));

        let both = apply_status(
            &pool,
            id,
            &update(Some(OrderStatus::Preparing), Some(PaymentStatus::Refunded)),
        )
        .await
        .unwrap();
        assert_eq!(both.failures.len(), 2);
        assert_eq!(both.failure_code(), Some(ErrorCode::OrderInvalidTransition));
    }

    #[tokio::test]
    async fn test_storage_failure_outranks_refusal() {
        let pool = test_pool().await;
        let id = seed_order(&pool, "c1", &[line(1, 1, 100)], 1).await;
        let report = StatusReport {
            order: order::find_by_id(&pool, id).await.unwrap().unwrap(),
            applied: Vec::new(),
            failures: vec![
                FieldFailure {
                    field: StatusField::OrderStatus,
                    message: "refused".into(),
                    rejected: true,
                },
                FieldFailure {
                    field: StatusField::PaymentStatus,
                    message: "database is locked".into(),
                    rejected: false,
                },
            ],
        };
        assert_eq!(report.failure_code(), Some(ErrorCode::OrderStatusUpdateFailed));
    }

    #[tokio::test]
    async fn test_missing_order() {
        let pool = test_pool().await;
        assert!(matches!(
            apply_status(&pool, 42, &update(None, None)).await,
            Err(OrderError::NotFound(42))
        ));
        assert!(matches!(
            delete_order(&pool, 42).await,
            Err(OrderError::NotFound(42))
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_order() {
        let pool = test_pool().await;
        let id = seed_order(&pool, "c1", &[line(1, 1, 100)], 1).await;

        let deleted = delete_order(&pool, id).await.unwrap();
        assert_eq!(deleted.id, id);
        assert!(order::find_by_id(&pool, id).await.unwrap().is_none());
        assert_eq!(notification::unread_count(&pool, "c1").await.unwrap(), 1);
    }
}
