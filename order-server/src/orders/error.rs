//! Order domain errors
//!
//! Every variant falls into one of three classes: validation (bad input,
//! nothing written), not found, or dependency failure (storage or procedure
//! errors, including pool timeouts).

use crate::db::repository::RepoError;
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Address length limit (characters)
pub const MAX_ADDRESS_LEN: usize = 200;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("delivery address is required")]
    MissingAddress,

    #[error("invalid payment method: {0:?}")]
    InvalidPaymentMethod(String),

    #[error("client id is required")]
    MissingClient,

    #[error("delivery address is too long ({0} characters, max {MAX_ADDRESS_LEN})")]
    AddressTooLong(usize),

    #[error("checkout failed: {0}")]
    Dependency(String),
}

impl CheckoutError {
    pub fn is_validation(&self) -> bool {
        !matches!(self, CheckoutError::Dependency(_))
    }
}

impl From<RepoError> for CheckoutError {
    fn from(err: RepoError) -> Self {
        CheckoutError::Dependency(err.to_string())
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        let code = match &err {
            CheckoutError::EmptyCart => ErrorCode::CartEmpty,
            CheckoutError::MissingAddress | CheckoutError::AddressTooLong(_) => {
                ErrorCode::OrderInvalidAddress
            }
            CheckoutError::InvalidPaymentMethod(_) => ErrorCode::PaymentInvalidMethod,
            CheckoutError::MissingClient => ErrorCode::NotAuthenticated,
            CheckoutError::Dependency(_) => ErrorCode::DatabaseError,
        };
        AppError::with_message(code, err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("order {0} not found")]
    NotFound(i64),

    #[error("{0}")]
    InvalidTransition(String),

    #[error(
        "order {order_id}: in-process total {in_process} differs from database total {database}"
    )]
    AmountMismatch {
        order_id: i64,
        in_process: Decimal,
        database: Decimal,
    },

    #[error("{0}")]
    Dependency(String),

    #[error("failed to delete order {order_id}: {message}")]
    DeleteFailed { order_id: i64, message: String },
}

impl OrderError {
    /// Map a repository error raised while working on `order_id`
    pub fn from_repo(order_id: i64, err: RepoError) -> Self {
        match err {
            RepoError::NotFound(_) => OrderError::NotFound(order_id),
            RepoError::Validation(msg) => OrderError::InvalidTransition(msg),
            other => OrderError::Dependency(other.to_string()),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match &err {
            OrderError::NotFound(id) => {
                AppError::with_message(ErrorCode::OrderNotFound, err.to_string())
                    .with_detail("order_id", *id)
            }
            OrderError::InvalidTransition(_) => {
                AppError::with_message(ErrorCode::OrderInvalidTransition, err.to_string())
            }
            OrderError::AmountMismatch { order_id, .. } => {
                AppError::with_message(ErrorCode::OrderAmountMismatch, err.to_string())
                    .with_detail("order_id", *order_id)
            }
            OrderError::Dependency(_) => {
                AppError::with_message(ErrorCode::OrderStatusUpdateFailed, err.to_string())
            }
            OrderError::DeleteFailed { order_id, .. } => {
                AppError::with_message(ErrorCode::OrderDeleteFailed, err.to_string())
                    .with_detail("order_id", *order_id)
            }
        }
    }
}
