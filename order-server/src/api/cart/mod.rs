//! Cart API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/cart | GET | 当前购物车 (按最新价格) |
//! | /api/cart/items | POST | 加入商品 |
//! | /api/cart/items/{food_id} | PUT | 修改数量 (0 = 删除) |
//! | /api/cart/items/{food_id} | DELETE | 删除商品 |
//! | /api/cart/checkout | POST | 下单 |

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/cart", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::show))
        .route("/items", post(handler::add_item))
        .route(
            "/items/{food_id}",
            put(handler::set_quantity).delete(handler::remove_item),
        )
        .route("/checkout", post(handler::checkout))
}
