// src/db/product_repo.rs

use sqlx::{types::Json, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::product::{Product, ProductFilter, ProductPayload},
};

#[derive(Clone, Default)]
pub struct ProductRepository;

impl ProductRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        input: &ProductPayload,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                user_id, category_id, subcategory_id, name, description, base_price, cost_price,
                image_url, sizes, variation_groups, addons, show_in_catalog, track_stock, stock_quantity
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(input.category_id)
        .bind(input.subcategory_id)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.base_price)
        .bind(input.cost_price)
        .bind(&input.image_url)
        .bind(Json(&input.sizes))
        .bind(Json(&input.variation_groups))
        .bind(Json(&input.addons))
        .bind(input.show_in_catalog)
        .bind(input.track_stock)
        .bind(input.stock_quantity)
        .fetch_one(executor)
        .await?;
        Ok(product)
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pattern = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE user_id = $1
              AND ($2::uuid IS NULL OR category_id = $2 OR subcategory_id = $2)
              AND ($3::text IS NULL OR name ILIKE $3)
              AND ($4::bool IS NULL OR show_in_catalog = $4)
            ORDER BY name ASC
            "#,
        )
        .bind(user_id)
        .bind(filter.category_id)
        .bind(pattern)
        .bind(filter.in_catalog)
        .fetch_all(executor)
        .await?;
        Ok(products)
    }

    pub async fn find<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE user_id = $1 AND id = $2",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(executor)
        .await?;
        Ok(product)
    }

    // Um SELECT só para todos os produtos de um pedido
    pub async fn find_many<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        product_ids: &[Uuid],
    ) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE user_id = $1 AND id = ANY($2)",
        )
        .bind(user_id)
        .bind(product_ids)
        .fetch_all(executor)
        .await?;
        Ok(products)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        product_id: Uuid,
        input: &ProductPayload,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET category_id = $3, subcategory_id = $4, name = $5, description = $6,
                base_price = $7, cost_price = $8, image_url = $9, sizes = $10,
                variation_groups = $11, addons = $12, show_in_catalog = $13,
                track_stock = $14, stock_quantity = $15, updated_at = NOW()
            WHERE user_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .bind(input.category_id)
        .bind(input.subcategory_id)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.base_price)
        .bind(input.cost_price)
        .bind(&input.image_url)
        .bind(Json(&input.sizes))
        .bind(Json(&input.variation_groups))
        .bind(Json(&input.addons))
        .bind(input.show_in_catalog)
        .bind(input.track_stock)
        .bind(input.stock_quantity)
        .fetch_optional(executor)
        .await?;
        Ok(product)
    }

    pub async fn set_stock_quantity<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        product_id: Uuid,
        stock_quantity: i32,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET stock_quantity = $3, updated_at = NOW()
            WHERE user_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .bind(stock_quantity)
        .fetch_optional(executor)
        .await?;
        Ok(product)
    }

    pub async fn set_catalog_visibility<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        product_id: Uuid,
        show_in_catalog: bool,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET show_in_catalog = $3, updated_at = NOW()
            WHERE user_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .bind(show_in_catalog)
        .fetch_optional(executor)
        .await?;
        Ok(product)
    }

    /// Soma `delta` ao saldo (nunca abaixo de zero). Só afeta produtos com controle de estoque;
    /// devolve `None` quando o produto não existe ou não controla estoque.
    pub async fn adjust_stock<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        product_id: Uuid,
        delta: i32,
    ) -> Result<Option<i32>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let new_quantity: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET stock_quantity = LEAST(GREATEST(stock_quantity::bigint + $3, 0), 2147483647)::int, updated_at = NOW()
            WHERE user_id = $1 AND id = $2 AND track_stock
            RETURNING stock_quantity
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .bind(delta)
        .fetch_optional(executor)
        .await?;
        Ok(new_quantity)
    }

    pub async fn delete<'e, E>(&self, executor: E, user_id: Uuid, product_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM products WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
