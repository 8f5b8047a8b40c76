//! Cart API Handlers
//!
//! Every handler decodes the `shopping_cart` cookie first. An undecodable
//! token reads as an empty cart and the response deletes the cookie.

use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};
use http::{HeaderMap, StatusCode};
use serde::Deserialize;

use crate::api::ClientId;
use crate::api::extract::{CookieUpdate, cart_token};
use crate::cart::{Cart, CartSummary, MAX_LINE_QUANTITY, cart_summary, hydrate};
use crate::core::ServerState;
use crate::db::repository::food;
use crate::orders;
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::CheckoutRequest;

#[derive(Debug, Deserialize)]
pub struct AddItem {
    pub food_id: i64,
    #[serde(default = "one")]
    pub quantity: u32,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct SetQuantity {
    pub quantity: u32,
}

fn decode(state: &ServerState, headers: &HeaderMap) -> (Cart, CookieUpdate) {
    let token = cart_token(headers);
    let decoded = state.cart_codec.decode(token.as_deref());
    (decoded.cart, decoded.directive.into())
}

fn invalid_quantity(food_id: i64, quantity: u64) -> AppError {
    AppError::with_message(
        ErrorCode::CartInvalidQuantity,
        format!("quantity must be between 1 and {MAX_LINE_QUANTITY}"),
    )
    .with_detail("food_id", food_id)
    .with_detail("quantity", quantity)
}

async fn ensure_food(state: &ServerState, food_id: i64) -> AppResult<()> {
    if food::find_by_id(&state.pool, food_id).await?.is_none() {
        return Err(AppError::with_message(
            ErrorCode::FoodNotFound,
            format!("Food {food_id} not found"),
        )
        .with_detail("food_id", food_id));
    }
    Ok(())
}

async fn summary(state: &ServerState, cart: &Cart) -> AppResult<CartSummary> {
    let lines = hydrate(cart, &state.pool).await?;
    Ok(cart_summary(lines, state.config.shipping_fee))
}

/// Re-encode a mutated cart; an empty cart drops the cookie
fn store(state: &ServerState, cart: &Cart) -> AppResult<CookieUpdate> {
    if cart.is_empty() {
        return Ok(CookieUpdate::Delete);
    }
    let token = state
        .cart_codec
        .encode(cart)
        .map_err(|e| AppError::internal(format!("Failed to encode cart: {e}")))?;
    Ok(CookieUpdate::Set(token))
}

/// GET /api/cart - 当前购物车
pub async fn show(State(state): State<ServerState>, headers: HeaderMap) -> Response {
    let (cart, cookie) = decode(&state, &headers);
    cookie.apply(summary(&state, &cart).await.map(Json))
}

fn respond(cookie: CookieUpdate, result: AppResult<(CookieUpdate, CartSummary)>) -> Response {
    match result {
        Ok((update, body)) => update.apply(Json(body)),
        Err(e) => cookie.apply(e),
    }
}

async fn add_to(
    state: &ServerState,
    cart: &mut Cart,
    item: &AddItem,
) -> AppResult<(CookieUpdate, CartSummary)> {
    let current = cart.quantity_of(item.food_id).unwrap_or(0);
    let next = u64::from(current) + u64::from(item.quantity);
    if item.quantity == 0 || next > u64::from(MAX_LINE_QUANTITY) {
        return Err(invalid_quantity(item.food_id, next));
    }
    ensure_food(state, item.food_id).await?;

    cart.add(item.food_id, item.quantity);
    let update = store(state, cart)?;
    Ok((update, summary(state, cart).await?))
}

async fn set_in(
    state: &ServerState,
    cart: &mut Cart,
    food_id: i64,
    quantity: u32,
) -> AppResult<(CookieUpdate, CartSummary)> {
    if quantity > MAX_LINE_QUANTITY {
        return Err(invalid_quantity(food_id, u64::from(quantity)));
    }
    if quantity > 0 {
        ensure_food(state, food_id).await?;
    }

    cart.set_quantity(food_id, quantity);
    let update = store(state, cart)?;
    Ok((update, summary(state, cart).await?))
}

/// POST /api/cart/items - 加入商品 (已有则累加)
pub async fn add_item(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(payload): Json<AddItem>,
) -> Response {
    let (mut cart, cookie) = decode(&state, &headers);
    let result = add_to(&state, &mut cart, &payload).await;
    respond(cookie, result)
}

/// PUT /api/cart/items/{food_id} - 修改数量
pub async fn set_quantity(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Path(food_id): Path<i64>,
    Json(payload): Json<SetQuantity>,
) -> Response {
    let (mut cart, cookie) = decode(&state, &headers);
    let result = set_in(&state, &mut cart, food_id, payload.quantity).await;
    respond(cookie, result)
}

/// DELETE /api/cart/items/{food_id} - 删除商品
pub async fn remove_item(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Path(food_id): Path<i64>,
) -> Response {
    let (mut cart, cookie) = decode(&state, &headers);
    if !cart.remove(food_id) {
        return cookie.apply(summary(&state, &cart).await.map(Json));
    }
    let result = match store(&state, &cart) {
        Ok(update) => summary(&state, &cart).await.map(|body| (update, body)),
        Err(e) => Err(e),
    };
    respond(cookie, result)
}

/// POST /api/cart/checkout - 下单
///
/// 成功后删除购物车 cookie；校验失败时把提交的内容放进 `details` 返回
pub async fn checkout(
    State(state): State<ServerState>,
    client: Option<ClientId>,
    headers: HeaderMap,
    Json(payload): Json<CheckoutRequest>,
) -> Response {
    let (cart, cookie) = decode(&state, &headers);
    let client_id = client.map(|c| c.0).unwrap_or_default();

    let result = orders::checkout(
        &state.pool,
        &state.pool,
        &cart,
        &payload,
        &client_id,
        state.config.shipping_fee,
    )
    .await;

    match result {
        Ok(outcome) => {
            let status = if outcome.replayed {
                StatusCode::OK
            } else {
                StatusCode::CREATED
            };
            CookieUpdate::Delete.apply((status, Json(outcome)))
        }
        Err(e) => {
            let validation = e.is_validation();
            let mut err = AppError::from(e);
            if validation {
                err = err
                    .with_detail("delivery_address", payload.delivery_address.clone())
                    .with_detail("payment_method", payload.payment_method.clone());
            }
            cookie.apply(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartDirective;

    #[test]
    fn test_add_item_defaults_to_one() {
        let item: AddItem = serde_json::from_str(r#"{"food_id": 3}"#).unwrap();
        assert_eq!(item.quantity, 1);
    }

    #[test]
    fn test_decode_directive_maps_to_cookie_update() {
        assert_eq!(CookieUpdate::from(CartDirective::Clear), CookieUpdate::Delete);
        assert_eq!(CookieUpdate::from(CartDirective::Keep), CookieUpdate::Leave);
    }
}
