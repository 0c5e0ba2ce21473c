// src/models/order.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::validation::{validate_discount, validate_money};

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Quote,        // Orçamento
    Confirmed,    // Confirmado
    InProduction, // Em produção
    Ready,        // Pronto
    Delivered,    // Entregue
    Cancelled,    // Cancelado
}

impl OrderStatus {
    /// Status em que os produtos do pedido já saíram do estoque.
    pub fn deducts_stock(self) -> bool {
        matches!(
            self,
            OrderStatus::Confirmed | OrderStatus::InProduction | OrderStatus::Ready | OrderStatus::Delivered
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_origin", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderOrigin {
    Admin,
    Catalog,
}

// --- Snapshot das escolhas do item ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectedVariation {
    #[schema(example = "Recheio")]
    pub group: String,
    #[schema(example = "Brigadeiro")]
    pub option: String,
    #[schema(example = "5.00")]
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectedAddon {
    #[schema(example = "Vela")]
    pub name: String,
    #[schema(example = "3.50")]
    pub price: Decimal,
}

// --- Pedido ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    #[schema(ignore)]
    pub user_id: Uuid,
    pub client_id: Option<Uuid>,
    #[schema(example = "Joana Lima")]
    pub client_name: String,
    pub status: OrderStatus,
    #[schema(example = "10.00")]
    pub discount_percent: Decimal,
    #[schema(example = "8.00")]
    pub delivery_fee: Decimal,
    #[schema(example = "pix")]
    pub payment_method: Option<String>,
    #[schema(value_type = Option<String>, format = Date, example = "2025-03-15")]
    pub delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub origin: OrderOrigin,
    #[schema(example = "150.00")]
    pub subtotal: Decimal,
    #[schema(example = "143.00")]
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Option<Uuid>,
    #[schema(example = "Bolo de Cenoura")]
    pub product_name: String,
    #[schema(example = "Médio")]
    pub size_name: Option<String>,
    #[schema(value_type = Vec<SelectedVariation>)]
    pub variations: Json<Vec<SelectedVariation>>,
    #[schema(value_type = Vec<SelectedAddon>)]
    pub addons: Json<Vec<SelectedAddon>>,
    #[schema(example = 2)]
    pub quantity: i32,
    #[schema(example = "50.00")]
    pub unit_price: Decimal,
    #[schema(example = "100.00")]
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

// --- Entrada ---

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VariationChoice {
    #[schema(example = "Recheio")]
    pub group: String,
    #[schema(example = "Brigadeiro")]
    pub option: String,
}

/// Item do pedido. Com `productId` o preço é calculado a partir do produto;
/// sem ele é um item avulso e `productName` + `unitPrice` são obrigatórios.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub product_id: Option<Uuid>,
    pub size: Option<String>,
    #[serde(default)]
    pub variations: Vec<VariationChoice>,
    #[serde(default)]
    pub addons: Vec<String>,
    #[validate(range(min = 1, max = 10_000, message = "validation.quantity_range"))]
    #[schema(example = 1, maximum = 10_000)]
    pub quantity: i32,

    #[validate(length(min = 1, max = 120, message = "validation.name_length"))]
    pub product_name: Option<String>,
    #[validate(custom(function = "validate_money"))]
    pub unit_price: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    pub client_id: Option<Uuid>,
    #[validate(length(min = 1, max = 120, message = "validation.name_length"))]
    pub client_name: Option<String>,
    pub status: Option<OrderStatus>,
    #[serde(default)]
    #[validate(custom(function = "validate_discount"))]
    pub discount_percent: Decimal,
    #[serde(default)]
    #[validate(custom(function = "validate_money"))]
    pub delivery_fee: Decimal,
    pub payment_method: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
    #[validate(nested)]
    pub items: Vec<OrderItemInput>,
}

/// Campos ausentes permanecem como estão; `items`, quando enviado, substitui todos os itens.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderPayload {
    pub client_id: Option<Uuid>,
    #[validate(length(min = 1, max = 120, message = "validation.name_length"))]
    pub client_name: Option<String>,
    #[validate(custom(function = "validate_discount"))]
    pub discount_percent: Option<Decimal>,
    #[validate(custom(function = "validate_money"))]
    pub delivery_fee: Option<Decimal>,
    pub payment_method: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
    #[validate(nested)]
    pub items: Option<Vec<OrderItemInput>>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatusPayload {
    pub status: OrderStatus,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub client_id: Option<Uuid>,
    #[param(value_type = Option<String>, format = Date)]
    pub from: Option<NaiveDate>,
    #[param(value_type = Option<String>, format = Date)]
    pub to: Option<NaiveDate>,
    pub search: Option<String>,
}

// Resultado de um ajuste de estoque aplicado a um produto
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppliedStockAdjustment {
    pub product_id: Uuid,
    pub delta: i32,
    pub new_quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeResponse {
    #[serde(flatten)]
    pub order: OrderDetail,
    pub previous_status: OrderStatus,
    pub stock_adjustments: Vec<AppliedStockAdjustment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_confirmed_onwards_deducts_stock() {
        assert!(!OrderStatus::Quote.deducts_stock());
        assert!(!OrderStatus::Cancelled.deducts_stock());
        assert!(OrderStatus::Confirmed.deducts_stock());
        assert!(OrderStatus::InProduction.deducts_stock());
        assert!(OrderStatus::Ready.deducts_stock());
        assert!(OrderStatus::Delivered.deducts_stock());
    }

    #[test]
    fn status_uses_snake_case_on_the_wire() {
        assert_eq!(serde_json::to_string(&OrderStatus::InProduction).unwrap(), "\"in_production\"");
        let parsed: OrderStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(parsed, OrderStatus::Cancelled);
    }

    #[test]
    fn item_quantity_must_be_positive() {
        let item: OrderItemInput = serde_json::from_value(serde_json::json!({
            "productName": "Brigadeiro",
            "unitPrice": 2.5,
            "quantity": 0
        }))
        .unwrap();
        assert!(item.validate().is_err());
    }

    #[test]
    fn item_quantity_and_price_are_bounded() {
        let item: OrderItemInput = serde_json::from_value(serde_json::json!({
            "productName": "Bolo",
            "unitPrice": 30,
            "quantity": 2_000_000_000
        }))
        .unwrap();
        assert!(item.validate().unwrap_err().field_errors().contains_key("quantity"));

        let item: OrderItemInput = serde_json::from_value(serde_json::json!({
            "productName": "Bolo",
            "unitPrice": 1e28,
            "quantity": 100
        }))
        .unwrap();
        assert!(item.validate().unwrap_err().field_errors().contains_key("unit_price"));
    }

    #[test]
    fn create_payload_validates_nested_items_and_discount() {
        let payload: CreateOrderPayload = serde_json::from_value(serde_json::json!({
            "clientName": "Ana",
            "discountPercent": 120,
            "items": [{ "productName": "Torta", "unitPrice": 30, "quantity": 1 }]
        }))
        .unwrap();
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("discount_percent"));
    }
}
