// src/db/finance_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::finance::{
        EntryKind, FinancialEntry, FinancialEntryPayload, PaymentMethodBreakdown, StatusBreakdown,
        TopProductEntry,
    },
};

// Status que contam como faturamento (os mesmos que baixam estoque)
pub(crate) const REVENUE_STATUSES: &str = "('confirmed', 'in_production', 'ready', 'delivered')";

#[derive(Clone, Default)]
pub struct FinanceRepository;

impl FinanceRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  LANÇAMENTOS AVULSOS
    // =========================================================================

    pub async fn create_entry<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        input: &FinancialEntryPayload,
    ) -> Result<FinancialEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, FinancialEntry>(
            r#"
            INSERT INTO financial_entries (user_id, kind, description, amount, category, entry_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(input.kind)
        .bind(input.description.trim())
        .bind(input.amount)
        .bind(&input.category)
        .bind(input.entry_date)
        .fetch_one(executor)
        .await?;
        Ok(entry)
    }

    pub async fn list_entries<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
        kind: Option<EntryKind>,
    ) -> Result<Vec<FinancialEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entries = sqlx::query_as::<_, FinancialEntry>(
            r#"
            SELECT * FROM financial_entries
            WHERE user_id = $1
              AND entry_date BETWEEN $2 AND $3
              AND ($4::entry_kind IS NULL OR kind = $4)
            ORDER BY entry_date DESC, created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .bind(kind)
        .fetch_all(executor)
        .await?;
        Ok(entries)
    }

    pub async fn delete_entry<'e, E>(&self, executor: E, user_id: Uuid, entry_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM financial_entries WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(entry_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn sum_entries<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
        kind: EntryKind,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM financial_entries
            WHERE user_id = $1 AND entry_date BETWEEN $2 AND $3 AND kind = $4
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .bind(kind)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }

    // =========================================================================
    //  RELATÓRIOS DE PEDIDOS
    // =========================================================================

    /// Faturamento e quantidade de pedidos faturáveis criados no período.
    pub async fn order_revenue<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<(Decimal, i64), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT COALESCE(SUM(total), 0), COUNT(*)
            FROM orders
            WHERE user_id = $1
              AND created_at >= $2::date AND created_at < $3::date + 1
              AND status IN {REVENUE_STATUSES}
            "#
        );
        let row = sqlx::query_as::<_, (Decimal, i64)>(&sql)
            .bind(user_id)
            .bind(from)
            .bind(to)
            .fetch_one(executor)
            .await?;
        Ok(row)
    }

    pub async fn by_payment_method<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PaymentMethodBreakdown>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT COALESCE(NULLIF(TRIM(payment_method), ''), 'nao_informado') AS payment_method,
                   COUNT(*) AS orders,
                   COALESCE(SUM(total), 0) AS total
            FROM orders
            WHERE user_id = $1
              AND created_at >= $2::date AND created_at < $3::date + 1
              AND status IN {REVENUE_STATUSES}
            GROUP BY 1
            ORDER BY total DESC
            "#
        );
        let rows = sqlx::query_as::<_, PaymentMethodBreakdown>(&sql)
            .bind(user_id)
            .bind(from)
            .bind(to)
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }

    // Todos os status, inclusive orçamento e cancelado
    pub async fn by_status<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<StatusBreakdown>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, StatusBreakdown>(
            r#"
            SELECT status, COUNT(*) AS orders, COALESCE(SUM(total), 0) AS total
            FROM orders
            WHERE user_id = $1
              AND created_at >= $2::date AND created_at < $3::date + 1
            GROUP BY status
            ORDER BY status
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    pub async fn top_products<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
        limit: i64,
    ) -> Result<Vec<TopProductEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT i.product_name,
                   COALESCE(SUM(i.quantity), 0)::BIGINT AS total_quantity,
                   COALESCE(SUM(i.total), 0) AS total_revenue
            FROM order_items i
            JOIN orders o ON o.id = i.order_id
            WHERE o.user_id = $1
              AND o.created_at >= $2::date AND o.created_at < $3::date + 1
              AND o.status IN {REVENUE_STATUSES}
            GROUP BY i.product_name
            ORDER BY total_revenue DESC, total_quantity DESC
            LIMIT $4
            "#
        );
        let rows = sqlx::query_as::<_, TopProductEntry>(&sql)
            .bind(user_id)
            .bind(from)
            .bind(to)
            .bind(limit)
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }
}
