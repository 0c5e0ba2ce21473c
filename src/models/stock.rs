// src/models/stock.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::validation::{validate_money, validate_stock_amount, validate_stock_delta};

// Matéria-prima (farinha, açúcar, embalagens...). Não confundir com o estoque de produto acabado.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    pub id: Uuid,
    #[schema(ignore)]
    pub user_id: Uuid,
    #[schema(example = "Farinha de trigo")]
    pub name: String,
    #[schema(example = "kg")]
    pub unit: String,
    #[schema(example = "12.5")]
    pub quantity: Decimal,
    #[schema(example = "5")]
    pub min_quantity: Decimal,
    #[schema(example = "6.90")]
    pub cost_per_unit: Option<Decimal>,
    pub supplier: Option<String>,
    // Calculado no SELECT (quantity <= min_quantity)
    pub is_low: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockItemPayload {
    #[validate(length(min = 1, max = 120, message = "validation.name_length"))]
    pub name: String,
    #[validate(length(min = 1, message = "validation.required"))]
    #[schema(example = "kg")]
    pub unit: String,
    #[validate(custom(function = "validate_stock_amount"))]
    pub quantity: Decimal,
    #[serde(default)]
    #[validate(custom(function = "validate_stock_amount"))]
    pub min_quantity: Decimal,
    #[validate(custom(function = "validate_money"))]
    pub cost_per_unit: Option<Decimal>,
    pub supplier: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustStockPayload {
    // Positivo = entrada, negativo = consumo. O saldo nunca fica abaixo de zero.
    #[validate(custom(function = "validate_stock_delta"))]
    #[schema(example = "-2.5")]
    pub delta: Decimal,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StockFilter {
    #[serde(default)]
    pub low_only: bool,
}
