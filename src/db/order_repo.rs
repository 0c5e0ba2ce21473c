// src/db/order_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{types::Json, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::order::{Order, OrderFilter, OrderItem, OrderOrigin, OrderStatus},
    services::pricing::ResolvedLine,
};

#[derive(Clone, Default)]
pub struct OrderRepository;

// Cabeçalho já resolvido pelo serviço (cliente, totais)
pub struct NewOrder<'a> {
    pub client_id: Option<Uuid>,
    pub client_name: &'a str,
    pub status: OrderStatus,
    pub discount_percent: Decimal,
    pub delivery_fee: Decimal,
    pub payment_method: Option<&'a str>,
    pub delivery_date: Option<NaiveDate>,
    pub notes: Option<&'a str>,
    pub origin: OrderOrigin,
    pub subtotal: Decimal,
    pub total: Decimal,
}

impl OrderRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  ORDERS
    // =========================================================================

    pub async fn insert_order<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        order: NewOrder<'_>,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (
                user_id, client_id, client_name, status, discount_percent, delivery_fee,
                payment_method, delivery_date, notes, origin, subtotal, total
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(order.client_id)
        .bind(order.client_name)
        .bind(order.status)
        .bind(order.discount_percent)
        .bind(order.delivery_fee)
        .bind(order.payment_method)
        .bind(order.delivery_date)
        .bind(order.notes)
        .bind(order.origin)
        .bind(order.subtotal)
        .bind(order.total)
        .fetch_one(executor)
        .await?;
        Ok(order)
    }

    pub async fn find<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        order_id: Uuid,
    ) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(order_id)
            .fetch_optional(executor)
            .await?;
        Ok(order)
    }

    // Trava a linha: duas sessões mudando o status do mesmo pedido não podem
    // baixar o estoque duas vezes
    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        order_id: Uuid,
    ) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE user_id = $1 AND id = $2 FOR UPDATE",
        )
        .bind(user_id)
        .bind(order_id)
        .fetch_optional(executor)
        .await?;
        Ok(order)
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        filter: &OrderFilter,
    ) -> Result<Vec<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pattern = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM orders
            WHERE user_id = $1
              AND ($2::order_status IS NULL OR status = $2)
              AND ($3::uuid IS NULL OR client_id = $3)
              AND ($4::date IS NULL OR created_at >= $4::date)
              AND ($5::date IS NULL OR created_at < $5::date + 1)
              AND ($6::text IS NULL OR client_name ILIKE $6)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(filter.status)
        .bind(filter.client_id)
        .bind(filter.from)
        .bind(filter.to)
        .bind(pattern)
        .fetch_all(executor)
        .await?;
        Ok(orders)
    }

    pub async fn update_header<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        order: &Order,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET client_id = $3, client_name = $4, discount_percent = $5, delivery_fee = $6,
                payment_method = $7, delivery_date = $8, notes = $9, subtotal = $10, total = $11,
                updated_at = NOW()
            WHERE user_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(order.id)
        .bind(order.client_id)
        .bind(&order.client_name)
        .bind(order.discount_percent)
        .bind(order.delivery_fee)
        .bind(&order.payment_method)
        .bind(order.delivery_date)
        .bind(&order.notes)
        .bind(order.subtotal)
        .bind(order.total)
        .fetch_one(executor)
        .await?;
        Ok(order)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET status = $3, updated_at = NOW()
            WHERE user_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(order_id)
        .bind(status)
        .fetch_one(executor)
        .await?;
        Ok(order)
    }

    pub async fn delete<'e, E>(&self, executor: E, user_id: Uuid, order_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM orders WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(order_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  ORDER ITEMS
    // =========================================================================

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        order_id: Uuid,
        line: &ResolvedLine,
    ) -> Result<OrderItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, OrderItem>(
            r#"
            INSERT INTO order_items (
                order_id, user_id, product_id, product_name, size_name,
                variations, addons, quantity, unit_price, total
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, order_id, product_id, product_name, size_name,
                      variations, addons, quantity, unit_price, total, created_at
            "#,
        )
        .bind(order_id)
        .bind(user_id)
        .bind(line.product_id)
        .bind(&line.product_name)
        .bind(&line.size_name)
        .bind(Json(&line.variations))
        .bind(Json(&line.addons))
        .bind(line.quantity)
        .bind(line.unit_price)
        .bind(line.total)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    pub async fn list_items<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        order_id: Uuid,
    ) -> Result<Vec<OrderItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, product_id, product_name, size_name,
                   variations, addons, quantity, unit_price, total, created_at
            FROM order_items
            WHERE user_id = $1 AND order_id = $2
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .bind(order_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    pub async fn delete_items<'e, E>(&self, executor: E, user_id: Uuid, order_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM order_items WHERE user_id = $1 AND order_id = $2")
            .bind(user_id)
            .bind(order_id)
            .execute(executor)
            .await?;
        Ok(())
    }
}
