// src/models/dashboard.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::ToSchema;

use crate::models::order::OrderStatus;

// Os cards do topo + próximas entregas
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub orders_today: i64,          // Pedidos criados hoje
    pub open_orders: i64,           // Confirmados, em produção ou prontos
    pub revenue_month: Decimal,     // Faturamento do mês corrente
    pub low_stock_items: i64,       // Matérias-primas abaixo do mínimo
    pub out_of_stock_products: i64, // Produtos controlados com saldo zero
    pub upcoming_deliveries: Vec<UpcomingDelivery>,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingDelivery {
    pub order_id: Uuid,
    pub client_name: String,
    #[schema(value_type = String, format = Date)]
    pub delivery_date: NaiveDate,
    pub status: OrderStatus,
    pub total: Decimal,
}
