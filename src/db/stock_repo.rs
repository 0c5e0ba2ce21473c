// src/db/stock_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::stock::{StockItem, StockItemPayload},
};

// Colunas + o indicador de estoque baixo, calculado na hora
const STOCK_COLUMNS: &str = r#"
    id, user_id, name, unit, quantity, min_quantity, cost_per_unit, supplier,
    (quantity <= min_quantity) AS is_low, created_at, updated_at
"#;

#[derive(Clone, Default)]
pub struct StockRepository;

impl StockRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        input: &StockItemPayload,
    ) -> Result<StockItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO stock_items (user_id, name, unit, quantity, min_quantity, cost_per_unit, supplier)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {STOCK_COLUMNS}
            "#
        );
        let item = sqlx::query_as::<_, StockItem>(&sql)
            .bind(user_id)
            .bind(input.name.trim())
            .bind(input.unit.trim())
            .bind(input.quantity)
            .bind(input.min_quantity)
            .bind(input.cost_per_unit)
            .bind(&input.supplier)
            .fetch_one(executor)
            .await?;
        Ok(item)
    }

    pub async fn list<'e, E>(&self, executor: E, user_id: Uuid, low_only: bool) -> Result<Vec<StockItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {STOCK_COLUMNS}
            FROM stock_items
            WHERE user_id = $1 AND (NOT $2 OR quantity <= min_quantity)
            ORDER BY name ASC
            "#
        );
        let items = sqlx::query_as::<_, StockItem>(&sql)
            .bind(user_id)
            .bind(low_only)
            .fetch_all(executor)
            .await?;
        Ok(items)
    }

    pub async fn find<'e, E>(&self, executor: E, user_id: Uuid, item_id: Uuid) -> Result<Option<StockItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {STOCK_COLUMNS} FROM stock_items WHERE user_id = $1 AND id = $2");
        let item = sqlx::query_as::<_, StockItem>(&sql)
            .bind(user_id)
            .bind(item_id)
            .fetch_optional(executor)
            .await?;
        Ok(item)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        item_id: Uuid,
        input: &StockItemPayload,
    ) -> Result<Option<StockItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE stock_items
            SET name = $3, unit = $4, quantity = $5, min_quantity = $6,
                cost_per_unit = $7, supplier = $8, updated_at = NOW()
            WHERE user_id = $1 AND id = $2
            RETURNING {STOCK_COLUMNS}
            "#
        );
        let item = sqlx::query_as::<_, StockItem>(&sql)
            .bind(user_id)
            .bind(item_id)
            .bind(input.name.trim())
            .bind(input.unit.trim())
            .bind(input.quantity)
            .bind(input.min_quantity)
            .bind(input.cost_per_unit)
            .bind(&input.supplier)
            .fetch_optional(executor)
            .await?;
        Ok(item)
    }

    // Entrada (delta > 0) ou consumo (delta < 0); o saldo para em zero
    pub async fn adjust<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        item_id: Uuid,
        delta: Decimal,
    ) -> Result<Option<StockItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE stock_items
            SET quantity = LEAST(GREATEST(quantity + $3, 0), 999999999.999), updated_at = NOW()
            WHERE user_id = $1 AND id = $2
            RETURNING {STOCK_COLUMNS}
            "#
        );
        let item = sqlx::query_as::<_, StockItem>(&sql)
            .bind(user_id)
            .bind(item_id)
            .bind(delta)
            .fetch_optional(executor)
            .await?;
        Ok(item)
    }

    pub async fn delete<'e, E>(&self, executor: E, user_id: Uuid, item_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM stock_items WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(item_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
