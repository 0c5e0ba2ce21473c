// src/db/dashboard_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Acquire, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::finance_repo::REVENUE_STATUSES,
    models::dashboard::{DashboardSummary, UpcomingDelivery},
};

// Janela das próximas entregas
const UPCOMING_DAYS: i32 = 7;

#[derive(Clone, Default)]
pub struct DashboardRepository;

impl DashboardRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn get_summary<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<DashboardSummary, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        // Snapshot consistente dos cards
        let mut tx = executor.begin().await?;

        // A. Pedidos criados hoje
        let orders_today = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM orders WHERE user_id = $1 AND created_at >= $2::date AND created_at < $2::date + 1",
        )
        .bind(user_id)
        .bind(today)
        .fetch_one(&mut *tx)
        .await?;

        // B. Em aberto
        let open_orders = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM orders WHERE user_id = $1 AND status IN ('confirmed', 'in_production', 'ready')",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        // C. Faturamento do mês
        let revenue_sql = format!(
            r#"
            SELECT COALESCE(SUM(total), 0)
            FROM orders
            WHERE user_id = $1
              AND created_at >= date_trunc('month', $2::date)
              AND created_at < $2::date + 1
              AND status IN {REVENUE_STATUSES}
            "#
        );
        let revenue_month = sqlx::query_scalar::<_, Decimal>(&revenue_sql)
            .bind(user_id)
            .bind(today)
            .fetch_one(&mut *tx)
            .await?;

        // D. Matéria-prima abaixo do mínimo
        let low_stock_items = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM stock_items WHERE user_id = $1 AND quantity <= min_quantity",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        // E. Produtos controlados zerados
        let out_of_stock_products = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM products WHERE user_id = $1 AND track_stock AND stock_quantity <= 0",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        // F. Entregas dos próximos dias (cancelados e entregues ficam de fora)
        let upcoming_deliveries = sqlx::query_as::<_, UpcomingDelivery>(
            r#"
            SELECT id AS order_id, client_name, delivery_date, status, total
            FROM orders
            WHERE user_id = $1
              AND delivery_date BETWEEN $2 AND $2 + $3
              AND status NOT IN ('cancelled', 'delivered')
            ORDER BY delivery_date ASC, created_at ASC
            "#,
        )
        .bind(user_id)
        .bind(today)
        .bind(UPCOMING_DAYS)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DashboardSummary {
            orders_today,
            open_orders,
            revenue_month,
            low_stock_items,
            out_of_stock_products,
            upcoming_deliveries,
        })
    }
}
