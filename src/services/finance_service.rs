// src/services/finance_service.rs

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use sqlx::{Acquire, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::FinanceRepository,
    models::finance::{EntryKind, FinanceSummary, PaymentMethodBreakdown, StatusBreakdown, TopProductEntry},
};

const DEFAULT_TOP_LIMIT: i64 = 10;
const MAX_TOP_LIMIT: i64 = 100;

/// Ticket médio com 2 casas; sem pedidos, zero.
pub fn average_ticket(revenue: Decimal, orders: i64) -> Decimal {
    if orders <= 0 {
        return Decimal::ZERO;
    }
    (revenue / Decimal::from(orders)).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn top_limit(requested: Option<i64>) -> i64 {
    requested.unwrap_or(DEFAULT_TOP_LIMIT).clamp(1, MAX_TOP_LIMIT)
}

pub struct SummaryParts {
    pub order_revenue: Decimal,
    pub orders_count: i64,
    pub other_income: Decimal,
    pub expenses: Decimal,
    pub by_payment_method: Vec<PaymentMethodBreakdown>,
    pub by_status: Vec<StatusBreakdown>,
}

pub fn compose_summary(from: NaiveDate, to: NaiveDate, parts: SummaryParts) -> FinanceSummary {
    FinanceSummary {
        from,
        to,
        order_revenue: parts.order_revenue,
        orders_count: parts.orders_count,
        average_ticket: average_ticket(parts.order_revenue, parts.orders_count),
        other_income: parts.other_income,
        expenses: parts.expenses,
        net_result: parts.order_revenue + parts.other_income - parts.expenses,
        by_payment_method: parts.by_payment_method,
        by_status: parts.by_status,
    }
}

#[derive(Clone)]
pub struct FinanceService {
    repo: FinanceRepository,
}

impl FinanceService {
    pub fn new(repo: FinanceRepository) -> Self {
        Self { repo }
    }

    /// Resultado do período: pedidos faturados + lançamentos avulsos.
    pub async fn summary<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<FinanceSummary, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        // Snapshot consistente
        let mut tx = executor.begin().await?;

        let (order_revenue, orders_count) = self.repo.order_revenue(&mut *tx, user_id, from, to).await?;
        let other_income = self.repo.sum_entries(&mut *tx, user_id, from, to, EntryKind::Income).await?;
        let expenses = self.repo.sum_entries(&mut *tx, user_id, from, to, EntryKind::Expense).await?;
        let by_payment_method = self.repo.by_payment_method(&mut *tx, user_id, from, to).await?;
        let by_status = self.repo.by_status(&mut *tx, user_id, from, to).await?;

        tx.commit().await?;

        Ok(compose_summary(
            from,
            to,
            SummaryParts { order_revenue, orders_count, other_income, expenses, by_payment_method, by_status },
        ))
    }

    pub async fn top_products(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
        limit: Option<i64>,
    ) -> Result<Vec<TopProductEntry>, AppError> {
        self.repo.top_products(&mut *conn, user_id, from, to, top_limit(limit)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    #[test]
    fn average_ticket_rounds_and_handles_no_orders() {
        assert_eq!(average_ticket(d("100"), 3), d("33.33"));
        assert_eq!(average_ticket(d("0.05"), 2), d("0.03"));
        assert_eq!(average_ticket(d("250"), 0), Decimal::ZERO);
    }

    #[test]
    fn net_result_adds_income_and_subtracts_expenses() {
        let day = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let summary = compose_summary(
            day,
            day,
            SummaryParts {
                order_revenue: d("1200.00"),
                orders_count: 8,
                other_income: d("150.00"),
                expenses: d("430.50"),
                by_payment_method: Vec::new(),
                by_status: Vec::new(),
            },
        );
        assert_eq!(summary.net_result, d("919.50"));
        assert_eq!(summary.average_ticket, d("150.00"));
    }

    #[test]
    fn top_limit_is_clamped() {
        assert_eq!(top_limit(None), 10);
        assert_eq!(top_limit(Some(0)), 1);
        assert_eq!(top_limit(Some(5000)), 100);
    }
}
