//! Food Repository (catalog lookups)

use super::{RepoError, RepoResult, cents};
use crate::order_money::{MAX_PRICE, from_cents};
use shared::models::{Food, FoodCreate};
use sqlx::SqlitePool;

const FOOD_SELECT: &str = "SELECT id, name, restaurant, category, price_cents, description, image_file_name FROM food";

#[derive(sqlx::FromRow)]
struct FoodRow {
    id: i64,
    name: String,
    restaurant: String,
    category: String,
    price_cents: i64,
    description: Option<String>,
    image_file_name: Option<String>,
}

impl From<FoodRow> for Food {
    fn from(row: FoodRow) -> Self {
        Food {
            id: row.id,
            name: row.name,
            restaurant: row.restaurant,
            category: row.category,
            price: from_cents(row.price_cents),
            description: row.description,
            image_file_name: row.image_file_name,
        }
    }
}

fn validate_price(price: rust_decimal::Decimal) -> RepoResult<i64> {
    if price.is_sign_negative() || price > MAX_PRICE {
        return Err(RepoError::Validation(format!("invalid food price: {price}")));
    }
    cents(price, "price")
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Food>> {
    let rows = sqlx::query_as::<_, FoodRow>(&format!("{FOOD_SELECT} ORDER BY id"))
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(Food::from).collect())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Food>> {
    let row = sqlx::query_as::<_, FoodRow>(&format!("{FOOD_SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Food::from))
}

pub async fn create(pool: &SqlitePool, data: FoodCreate) -> RepoResult<Food> {
    if data.name.trim().is_empty() {
        return Err(RepoError::Validation("food name is required".into()));
    }
    let price_cents = validate_price(data.price)?;

    let id = sqlx::query(
        "INSERT INTO food (name, restaurant, category, price_cents, description, image_file_name) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&data.name)
    .bind(&data.restaurant)
    .bind(&data.category)
    .bind(price_cents)
    .bind(&data.description)
    .bind(&data.image_file_name)
    .execute(pool)
    .await?
    .last_insert_rowid();

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create food".into()))
}

/// Change the live catalog price; placed orders keep their snapshot
pub async fn update_price(
    pool: &SqlitePool,
    id: i64,
    price: rust_decimal::Decimal,
) -> RepoResult<Food> {
    let price_cents = validate_price(price)?;
    let rows = sqlx::query("UPDATE food SET price_cents = ? WHERE id = ?")
        .bind(price_cents)
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();
    if rows == 0 {
        return Err(RepoError::NotFound(format!("food {id}")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("food {id}")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM food WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(rows > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use rust_decimal::Decimal;

    fn kebab(price: Decimal) -> FoodCreate {
        FoodCreate {
            name: "Adana Kebab".into(),
            restaurant: "Ocakbasi".into(),
            category: "Grill".into(),
            price,
            description: None,
            image_file_name: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let pool = test_pool().await;
        let food = create(&pool, kebab(Decimal::new(1250, 2))).await.unwrap();

        let found = find_by_id(&pool, food.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Adana Kebab");
        assert_eq!(found.price, Decimal::new(1250, 2));
        assert!(find_by_id(&pool, food.id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejects_negative_price() {
        let pool = test_pool().await;
        let err = create(&pool, kebab(Decimal::new(-1, 2))).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_price_and_delete() {
        let pool = test_pool().await;
        let food = create(&pool, kebab(Decimal::new(1000, 2))).await.unwrap();

        let updated = update_price(&pool, food.id, Decimal::new(1100, 2)).await.unwrap();
        assert_eq!(updated.price, Decimal::new(1100, 2));

        assert!(delete(&pool, food.id).await.unwrap());
        assert!(!delete(&pool, food.id).await.unwrap());
        assert!(matches!(
            update_price(&pool, food.id, Decimal::ONE).await,
            Err(RepoError::NotFound(_))
        ));
        assert!(find_all(&pool).await.unwrap().is_empty());
    }
}
