// src/models/finance.rs

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::common::validation::validate_money;
use crate::models::order::OrderStatus;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "entry_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Income,  // Entrada avulsa (fora dos pedidos)
    Expense, // Despesa
}

// Lançamento manual (ingredientes, aluguel, venda de balcão...)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialEntry {
    pub id: Uuid,
    #[schema(ignore)]
    pub user_id: Uuid,
    pub kind: EntryKind,
    #[schema(example = "Compra de farinha")]
    pub description: String,
    #[schema(example = "89.90")]
    pub amount: Decimal,
    #[schema(example = "Ingredientes")]
    pub category: Option<String>,
    #[schema(value_type = String, format = Date, example = "2025-03-01")]
    pub entry_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialEntryPayload {
    pub kind: EntryKind,
    #[validate(length(min = 1, max = 200, message = "validation.required"))]
    pub description: String,
    #[validate(custom(function = "validate_money"))]
    pub amount: Decimal,
    pub category: Option<String>,
    #[schema(value_type = String, format = Date)]
    pub entry_date: NaiveDate,
}

#[derive(Debug, Default, Deserialize, Validate, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
#[validate(schema(function = "validate_period"))]
pub struct PeriodQuery {
    #[param(value_type = Option<String>, format = Date)]
    pub from: Option<NaiveDate>,
    #[param(value_type = Option<String>, format = Date)]
    pub to: Option<NaiveDate>,
    pub kind: Option<EntryKind>,
    pub limit: Option<i64>,
}

fn validate_period(query: &PeriodQuery) -> Result<(), ValidationError> {
    if let (Some(from), Some(to)) = (query.from, query.to) {
        if from > to {
            let mut err = ValidationError::new("date_range");
            err.message = Some("validation.date_range".into());
            return Err(err);
        }
    }
    Ok(())
}

impl PeriodQuery {
    /// Sem datas: mês corrente até hoje.
    pub fn resolve(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let from = self.from.unwrap_or_else(|| today.with_day0(0).unwrap_or(today));
        let to = self.to.unwrap_or(today);
        (from, to)
    }
}

// --- Relatórios ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodBreakdown {
    #[schema(example = "pix")]
    pub payment_method: String,
    pub orders: i64,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusBreakdown {
    pub status: OrderStatus,
    pub orders: i64,
    pub total: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinanceSummary {
    #[schema(value_type = String, format = Date)]
    pub from: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub to: NaiveDate,
    pub order_revenue: Decimal,
    pub orders_count: i64,
    pub average_ticket: Decimal,
    pub other_income: Decimal,
    pub expenses: Decimal,
    pub net_result: Decimal,
    pub by_payment_method: Vec<PaymentMethodBreakdown>,
    pub by_status: Vec<StatusBreakdown>,
}

// Curva ABC (Top produtos)
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopProductEntry {
    pub product_name: String,
    pub total_quantity: i64,
    pub total_revenue: Decimal,
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_period_is_month_to_date() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 18).unwrap();
        let (from, to) = PeriodQuery::default().resolve(today);
        assert_eq!(from, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(to, today);
    }

    #[test]
    fn inverted_period_is_invalid() {
        let query = PeriodQuery {
            from: NaiveDate::from_ymd_opt(2025, 3, 10),
            to: NaiveDate::from_ymd_opt(2025, 3, 1),
            ..Default::default()
        };
        assert!(query.validate().is_err());
    }
}
