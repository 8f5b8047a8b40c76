//! Checkout: turn a cart into a persisted order
//!
//! Validation runs in a fixed order and stops at the first failure:
//! empty cart, missing address, payment method, client id, address length.
//! Nothing is written unless every check passes.
//!
//! The order header, its lines and the "Order created" log entry are written
//! in one transaction. When the request carries an idempotency key, a repeat
//! checkout for the same client returns the order that already exists.

use super::error::{CheckoutError, MAX_ADDRESS_LEN};
use crate::cart::{Cart, Catalog, hydrate};
use crate::db::repository::{RepoError, begin_write, order, order_log};
use crate::order_money::round_money;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{CheckoutRequest, Order, OrderStatus, PaymentMethod};
use sqlx::SqlitePool;

pub const ORDER_CREATED_LOG: &str = "Order created";

/// A persisted order plus whether it came from an earlier identical request
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutOutcome {
    pub order: Order,
    pub replayed: bool,
}

fn idempotency_key(request: &CheckoutRequest) -> Option<&str> {
    request
        .idempotency_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
}

/// Place an order for `client_id` from `cart`.
///
/// On success the caller must invalidate the client's cart token.
pub async fn checkout<C: Catalog + ?Sized>(
    pool: &SqlitePool,
    catalog: &C,
    cart: &Cart,
    request: &CheckoutRequest,
    client_id: &str,
    shipping_fee: Decimal,
) -> Result<CheckoutOutcome, CheckoutError> {
    let client_id = client_id.trim();
    let key = idempotency_key(request);

    if let Some(key) = key
        && !client_id.is_empty()
        && let Some(existing) = order::find_by_idempotency_key(pool, client_id, key).await?
    {
        tracing::warn!(
            order_id = existing.id,
            client_id = %client_id,
            "Checkout replayed for an existing idempotency key"
        );
        return Ok(CheckoutOutcome {
            order: existing,
            replayed: true,
        });
    }

    // 1. cart
    let items = if cart.is_empty() {
        Vec::new()
    } else {
        hydrate(cart, catalog).await?
    };
    if items.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    // 2. address
    let address = request.delivery_address.trim();
    if address.is_empty() {
        return Err(CheckoutError::MissingAddress);
    }

    // 3. payment method
    let payment_method: PaymentMethod = request
        .payment_method
        .parse()
        .map_err(|_| CheckoutError::InvalidPaymentMethod(request.payment_method.clone()))?;

    if client_id.is_empty() {
        return Err(CheckoutError::MissingClient);
    }
    let address_len = address.chars().count();
    if address_len > MAX_ADDRESS_LEN {
        return Err(CheckoutError::AddressTooLong(address_len));
    }

    let mut order = Order {
        id: 0,
        client_id: client_id.to_string(),
        items,
        shipping_fee: round_money(shipping_fee),
        delivery_address: address.to_string(),
        payment_method,
        payment_status: payment_method.initial_payment_status(),
        order_status: OrderStatus::Created,
        created_at: shared::util::now_millis(),
        idempotency_key: key.map(str::to_string),
    };

    match persist(pool, &order).await {
        Ok(id) => order.id = id,
        Err(RepoError::Duplicate(msg)) => {
            // a concurrent request with the same key won the insert
            let Some(key) = key else {
                return Err(CheckoutError::Dependency(msg));
            };
            let Some(existing) = order::find_by_idempotency_key(pool, client_id, key).await? else {
                return Err(CheckoutError::Dependency(
                    "idempotency key conflict without a stored order".into(),
                ));
            };
            tracing::warn!(
                order_id = existing.id,
                client_id = %client_id,
                "Concurrent checkout collapsed onto an existing order"
            );
            return Ok(CheckoutOutcome {
                order: existing,
                replayed: true,
            });
        }
        Err(e) => {
            tracing::error!(client_id = %client_id, error = %e, "Checkout failed to persist order");
            return Err(e.into());
        }
    }

    tracing::info!(
        order_id = order.id,
        client_id = %order.client_id,
        lines = order.items.len(),
        payment_method = %order.payment_method,
        "Order created"
    );
    Ok(CheckoutOutcome {
        order,
        replayed: false,
    })
}

async fn persist(pool: &SqlitePool, order: &Order) -> Result<i64, RepoError> {
    let mut tx = begin_write(pool).await?;
    let id = order::insert(
        &mut tx,
        &order::NewOrder {
            client_id: &order.client_id,
            items: &order.items,
            shipping_fee: order.shipping_fee,
            delivery_address: &order.delivery_address,
            payment_method: order.payment_method,
            payment_status: order.payment_status,
            order_status: order.order_status,
            created_at: order.created_at,
            idempotency_key: order.idempotency_key.as_deref(),
        },
    )
    .await?;
    order_log::append(&mut tx, id, &order.client_id, ORDER_CREATED_LOG, order.created_at).await?;
    tx.commit().await?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::food;
    use crate::db::test_pool;
    use shared::models::{FoodCreate, PaymentStatus};

    async fn seed_food(pool: &SqlitePool, name: &str, cents: i64) -> i64 {
        food::create(
            pool,
            FoodCreate {
                name: name.into(),
                restaurant: "Kebapci".into(),
                category: "Main".into(),
                price: Decimal::new(cents, 2),
                description: None,
                image_file_name: None,
            },
        )
        .await
        .unwrap()
        .id
    }

    fn request(address: &str, method: &str) -> CheckoutRequest {
        CheckoutRequest {
            delivery_address: address.into(),
            payment_method: method.into(),
            idempotency_key: None,
        }
    }

    async fn order_count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    fn fee() -> Decimal {
        Decimal::new(500, 2)
    }

    #[tokio::test]
    async fn test_cash_order_is_pending_and_logged() {
        let pool = test_pool().await;
        let doner = seed_food(&pool, "Doner", 1250).await;
        let cart = Cart::from_entries([(doner, 2)]);

        let outcome = checkout(&pool, &pool, &cart, &request("Moda Cd. 5", "cash"), "c1", fee())
            .await
            .unwrap();
        let order = outcome.order;

        assert!(!outcome.replayed);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.order_status, OrderStatus::Created);
        assert_eq!(order.shipping_fee, fee());

        let stored = order::find_by_id(&pool, order.id).await.unwrap().unwrap();
        assert_eq!(stored.items, order.items);
        assert_eq!(stored.items[0].unit_price, Decimal::new(1250, 2));

        let logs = order_log::list_for_order(&pool, order.id).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].log_message, ORDER_CREATED_LOG);
    }

    #[tokio::test]
    async fn test_saved_card_order_is_paid() {
        let pool = test_pool().await;
        let id = seed_food(&pool, "Pide", 900).await;
        let cart = Cart::from_entries([(id, 1)]);

        let outcome = checkout(&pool, &pool, &cart, &request("Moda", "saved card"), "c1", fee())
            .await
            .unwrap();
        assert_eq!(outcome.order.payment_status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn test_validation_order_and_no_writes() {
        let pool = test_pool().await;
        let id = seed_food(&pool, "Pide", 900).await;
        let cart = Cart::from_entries([(id, 1)]);

        // empty cart wins over every other problem
        let err = checkout(&pool, &pool, &Cart::new(), &request("", "bitcoin"), "", fee())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));

        let err = checkout(&pool, &pool, &cart, &request("  ", "bitcoin"), "", fee())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::MissingAddress));

        let err = checkout(&pool, &pool, &cart, &request("Moda", "Cash"), "", fee())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidPaymentMethod(m) if m == "Cash"));

        let err = checkout(&pool, &pool, &cart, &request("Moda", "cash"), " ", fee())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::MissingClient));

        let long = "x".repeat(MAX_ADDRESS_LEN + 1);
        let err = checkout(&pool, &pool, &cart, &request(&long, "cash"), "c1", fee())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::AddressTooLong(201)));

        assert_eq!(order_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_cart_of_only_deleted_foods_is_empty() {
        let pool = test_pool().await;
        let id = seed_food(&pool, "Pide", 900).await;
        let cart = Cart::from_entries([(id, 1)]);
        food::delete(&pool, id).await.unwrap();

        let err = checkout(&pool, &pool, &cart, &request("Moda", "cash"), "c1", fee())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
        assert_eq!(order_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_idempotency_key_replays() {
        let pool = test_pool().await;
        let id = seed_food(&pool, "Pide", 900).await;
        let cart = Cart::from_entries([(id, 3)]);
        let mut req = request("Moda", "cash");
        req.idempotency_key = Some("k-1".into());

        let first = checkout(&pool, &pool, &cart, &req, "c1", fee()).await.unwrap();
        // the retry arrives after the cart token was cleared
        let second = checkout(&pool, &pool, &Cart::new(), &req, "c1", fee())
            .await
            .unwrap();

        assert!(!first.replayed);
        assert!(second.replayed);
        assert_eq!(first.order.id, second.order.id);
        assert_eq!(order_count(&pool).await, 1);

        // same key, different client: a new order
        let other = checkout(&pool, &pool, &cart, &req, "c2", fee()).await.unwrap();
        assert!(!other.replayed);
        assert_eq!(order_count(&pool).await, 2);
    }

    #[tokio::test]
    async fn test_later_price_change_does_not_touch_order() {
        let pool = test_pool().await;
        let id = seed_food(&pool, "Pide", 900).await;
        let cart = Cart::from_entries([(id, 1)]);
        let placed = checkout(&pool, &pool, &cart, &request("Moda", "cash"), "c1", fee())
            .await
            .unwrap()
            .order;

        food::update_price(&pool, id, Decimal::new(1500, 2)).await.unwrap();

        let stored = order::find_by_id(&pool, placed.id).await.unwrap().unwrap();
        assert_eq!(stored.items[0].unit_price, Decimal::new(900, 2));
    }
}
