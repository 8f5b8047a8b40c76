//! Cart hydration: resolve a cart into priced order lines
//!
//! Missing foods are dropped silently (the cart may point at deleted catalog
//! items). Prices are read at hydration time.

use super::Cart;
use crate::db::repository::{RepoResult, food};
use crate::order_money::{lines_total, round_money};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{Food, OrderLine};
use sqlx::SqlitePool;
use std::collections::HashMap;

/// Catalog lookup seam
#[allow(async_fn_in_trait)]
pub trait Catalog {
    async fn find_food(&self, food_id: i64) -> RepoResult<Option<Food>>;
}

impl Catalog for SqlitePool {
    async fn find_food(&self, food_id: i64) -> RepoResult<Option<Food>> {
        food::find_by_id(self, food_id).await
    }
}

impl Catalog for HashMap<i64, Food> {
    async fn find_food(&self, food_id: i64) -> RepoResult<Option<Food>> {
        Ok(self.get(&food_id).cloned())
    }
}

/// Price every entry of `cart`, in cart order.
///
/// Entries whose food is gone or whose quantity is 0 produce no line. Lookup
/// failures other than "not found" are propagated.
pub async fn hydrate<C: Catalog + ?Sized>(cart: &Cart, catalog: &C) -> RepoResult<Vec<OrderLine>> {
    let mut lines = Vec::with_capacity(cart.len());
    let mut dropped = Vec::new();

    for (food_id, quantity) in cart.iter() {
        if quantity == 0 {
            continue;
        }
        match catalog.find_food(food_id).await? {
            Some(food) => lines.push(OrderLine {
                food_id,
                food_name: food.name,
                quantity,
                unit_price: round_money(food.price),
            }),
            None => dropped.push(food_id),
        }
    }

    if !dropped.is_empty() {
        tracing::warn!(dropped = ?dropped, "Dropped cart entries for foods no longer in the catalog");
    }
    Ok(merge_lines(lines))
}

/// Merge lines that share a food id: quantities summed, first position and
/// first price kept.
pub fn merge_lines(lines: impl IntoIterator<Item = OrderLine>) -> Vec<OrderLine> {
    let mut merged: Vec<OrderLine> = Vec::new();
    for line in lines {
        match merged.iter_mut().find(|l| l.food_id == line.food_id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
            None => merged.push(line),
        }
    }
    merged
}

/// Cart page figures
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub lines: Vec<OrderLine>,
    pub item_count: u64,
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    pub total: Decimal,
}

/// Subtotal, shipping and total for hydrated lines; an empty cart ships free
pub fn cart_summary(lines: Vec<OrderLine>, shipping_fee: Decimal) -> CartSummary {
    let subtotal = lines_total(&lines);
    let shipping_fee = if lines.is_empty() {
        Decimal::ZERO
    } else {
        round_money(shipping_fee)
    };
    CartSummary {
        item_count: lines.iter().map(|l| u64::from(l.quantity)).sum(),
        subtotal,
        shipping_fee,
        total: subtotal + shipping_fee,
        lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn food(id: i64, name: &str, cents: i64) -> Food {
        Food {
            id,
            name: name.into(),
            restaurant: "Test Kitchen".into(),
            category: "Main".into(),
            price: Decimal::new(cents, 2),
            description: None,
            image_file_name: None,
        }
    }

    fn catalog(foods: &[Food]) -> HashMap<i64, Food> {
        foods.iter().map(|f| (f.id, f.clone())).collect()
    }

    #[tokio::test]
    async fn test_stale_entry_is_dropped() {
        // food2 (10.00) was deleted before checkout
        let catalog = catalog(&[food(1, "Doner", 750)]);
        let cart = Cart::from_entries([(1, 2), (2, 1)]);

        let lines = hydrate(&cart, &catalog).await.unwrap();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].food_id, 1);
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(lines[0].unit_price, Decimal::new(750, 2));
    }

    #[tokio::test]
    async fn test_output_follows_cart_order_and_skips_zero() {
        let catalog = catalog(&[food(1, "A", 100), food(2, "B", 200), food(3, "C", 300)]);
        let cart = Cart::from_entries([(3, 1), (1, 0), (2, 4)]);

        let lines = hydrate(&cart, &catalog).await.unwrap();
        let ids: Vec<i64> = lines.iter().map(|l| l.food_id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[tokio::test]
    async fn test_surviving_count_is_intersection() {
        let catalog = catalog(&[food(1, "A", 100), food(4, "D", 400)]);
        let cart = Cart::from_entries([(1, 1), (2, 1), (3, 1), (4, 2)]);
        let lines = hydrate(&cart, &catalog).await.unwrap();
        assert_eq!(lines.len(), 2);
    }

    #[tokio::test]
    async fn test_price_read_at_hydration_time() {
        let mut catalog = catalog(&[food(1, "A", 100)]);
        let cart = Cart::from_entries([(1, 1)]);
        catalog.insert(1, food(1, "A", 125));

        let lines = hydrate(&cart, &catalog).await.unwrap();
        assert_eq!(lines[0].unit_price, Decimal::new(125, 2));
    }

    #[test]
    fn test_merge_lines_sums_duplicates() {
        let line = |id: i64, qty: u32, cents: i64| OrderLine {
            food_id: id,
            food_name: format!("f{id}"),
            quantity: qty,
            unit_price: Decimal::new(cents, 2),
        };
        let merged = merge_lines(vec![line(1, 1, 100), line(2, 1, 200), line(1, 2, 150)]);
        assert_eq!(merged, vec![line(1, 3, 100), line(2, 1, 200)]);
    }

    #[test]
    fn test_cart_summary() {
        let lines = vec![OrderLine {
            food_id: 1,
            food_name: "A".into(),
            quantity: 3,
            unit_price: Decimal::new(333, 2),
        }];
        let summary = cart_summary(lines, Decimal::new(500, 2));
        assert_eq!(summary.subtotal, Decimal::new(999, 2));
        assert_eq!(summary.total, Decimal::new(1499, 2));
        assert_eq!(summary.item_count, 3);

        let empty = cart_summary(Vec::new(), Decimal::new(500, 2));
        assert_eq!(empty.total, Decimal::ZERO);
        assert_eq!(empty.shipping_fee, Decimal::ZERO);
    }

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(future)
    }

    proptest! {
        #[test]
        fn prop_surviving_lines_are_cart_catalog_intersection(
            entries in prop::collection::vec((0i64..32, 1u32..=99), 0..24),
            catalog_ids in prop::collection::btree_set(0i64..32, 0..32),
        ) {
            let cart = Cart::from_entries(entries);
            let foods: Vec<Food> = catalog_ids.iter().map(|&id| food(id, "F", 100 + id)).collect();

            let lines = block_on(hydrate(&cart, &catalog(&foods))).unwrap();

            let expected: Vec<(i64, u32)> =
                cart.iter().filter(|(id, _)| catalog_ids.contains(id)).collect();
            let got: Vec<(i64, u32)> = lines.iter().map(|l| (l.food_id, l.quantity)).collect();
            prop_assert_eq!(got, expected);
        }

        #[test]
        fn prop_summary_counts_every_surviving_item(
            entries in prop::collection::vec((0i64..16, 0u32..=99), 0..16),
            catalog_ids in prop::collection::btree_set(0i64..16, 0..16),
        ) {
            let cart = Cart::from_entries(entries);
            let foods: Vec<Food> = catalog_ids.iter().map(|&id| food(id, "F", 250)).collect();
            let lines = block_on(hydrate(&cart, &catalog(&foods))).unwrap();
            let summary = cart_summary(lines, Decimal::new(500, 2));

            let kept: BTreeSet<i64> = summary.lines.iter().map(|l| l.food_id).collect();
            let expected_count: u64 = cart
                .iter()
                .filter(|(id, _)| kept.contains(id))
                .map(|(_, q)| u64::from(q))
                .sum();
            prop_assert_eq!(summary.item_count, expected_count);
            prop_assert_eq!(summary.subtotal, Decimal::new(250, 2) * Decimal::from(expected_count));
            prop_assert_eq!(summary.total, summary.subtotal + summary.shipping_fee);
        }
    }
}
