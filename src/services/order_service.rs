// src/services/order_service.rs

use std::collections::HashMap;

use sqlx::{Acquire, PgConnection, Postgres};
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use crate::{
    common::error::AppError,
    db::{order_repo::NewOrder, ClientRepository, OrderRepository, ProductRepository},
    models::{
        order::{
            CreateOrderPayload, Order, OrderDetail, OrderFilter, OrderItem, OrderItemInput, OrderOrigin, OrderStatus,
            StatusChangeResponse, UpdateOrderPayload,
        },
        product::Product,
    },
    services::{
        inventory_service::InventoryService,
        pricing::{order_totals, resolve_custom_line, resolve_product_line, ResolvedLine},
    },
};

#[derive(Clone)]
pub struct OrderService {
    order_repo: OrderRepository,
    product_repo: ProductRepository,
    client_repo: ClientRepository,
    inventory_service: InventoryService,
}

fn required_field(field: &'static str) -> AppError {
    let mut errors = ValidationErrors::new();
    errors.add(field, ValidationError::new("required").with_message("validation.required".into()));
    AppError::ValidationError(errors)
}

fn stock_lines(lines: &[ResolvedLine]) -> Vec<(Option<Uuid>, i32)> {
    lines.iter().map(|l| (l.product_id, l.quantity)).collect()
}

impl OrderService {
    pub fn new(
        order_repo: OrderRepository,
        product_repo: ProductRepository,
        client_repo: ClientRepository,
        inventory_service: InventoryService,
    ) -> Self {
        Self { order_repo, product_repo, client_repo, inventory_service }
    }

    // Precifica todos os itens com um único SELECT de produtos.
    // Na vitrine só entram produtos publicados e não há item avulso.
    async fn resolve_lines(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        items: &[OrderItemInput],
        origin: OrderOrigin,
    ) -> Result<Vec<ResolvedLine>, AppError> {
        if items.is_empty() {
            return Err(AppError::EmptyOrder);
        }

        let mut ids: Vec<Uuid> = items.iter().filter_map(|i| i.product_id).collect();
        ids.sort();
        ids.dedup();

        let products: HashMap<Uuid, Product> = if ids.is_empty() {
            HashMap::new()
        } else {
            self.product_repo
                .find_many(&mut *conn, user_id, &ids)
                .await?
                .into_iter()
                .map(|p| (p.id, p))
                .collect()
        };

        items
            .iter()
            .map(|item| match item.product_id {
                Some(product_id) => {
                    let product = products
                        .get(&product_id)
                        .filter(|p| origin == OrderOrigin::Admin || p.show_in_catalog)
                        .ok_or(AppError::ProductUnavailable(product_id))?;
                    resolve_product_line(product, item)
                }
                None if origin == OrderOrigin::Catalog => Err(required_field("product_id")),
                None => resolve_custom_line(item),
            })
            .collect()
    }

    // Nome do cliente: o informado ou o do cadastro
    async fn resolve_client(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        client_id: Option<Uuid>,
        client_name: Option<&str>,
    ) -> Result<(Option<Uuid>, String), AppError> {
        let typed_name = client_name.map(str::trim).filter(|s| !s.is_empty());

        match client_id {
            Some(id) => {
                let client = self
                    .client_repo
                    .find(&mut *conn, user_id, id)
                    .await?
                    .ok_or(AppError::ResourceNotFound("client"))?;
                Ok((Some(client.id), typed_name.map(String::from).unwrap_or(client.name)))
            }
            None => typed_name
                .map(|name| (None, name.to_string()))
                .ok_or_else(|| required_field("client_name")),
        }
    }

    async fn insert_items(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        order_id: Uuid,
        lines: &[ResolvedLine],
    ) -> Result<Vec<OrderItem>, AppError> {
        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            items.push(self.order_repo.insert_item(&mut *conn, user_id, order_id, line).await?);
        }
        Ok(items)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        payload: CreateOrderPayload,
        origin: OrderOrigin,
    ) -> Result<OrderDetail, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let lines = self.resolve_lines(&mut tx, user_id, &payload.items, origin).await?;
        let (client_id, client_name) = self
            .resolve_client(&mut tx, user_id, payload.client_id, payload.client_name.as_deref())
            .await?;

        let status = payload.status.unwrap_or(OrderStatus::Quote);
        let totals = order_totals(&lines, payload.discount_percent, payload.delivery_fee)?;

        let order = self
            .order_repo
            .insert_order(
                &mut *tx,
                user_id,
                NewOrder {
                    client_id,
                    client_name: &client_name,
                    status,
                    discount_percent: payload.discount_percent,
                    delivery_fee: payload.delivery_fee,
                    payment_method: payload.payment_method.as_deref(),
                    delivery_date: payload.delivery_date,
                    notes: payload.notes.as_deref(),
                    origin,
                    subtotal: totals.subtotal,
                    total: totals.total,
                },
            )
            .await?;

        let items = self.insert_items(&mut tx, user_id, order.id, &lines).await?;

        // Pedido já nasce confirmado: baixa na hora
        self.inventory_service
            .apply_transition(&mut *tx, user_id, None, Some(status), &stock_lines(&lines))
            .await?;

        tx.commit().await?;

        tracing::info!(%user_id, order_id = %order.id, ?origin, total = %order.total, "🧁 Pedido criado");
        Ok(OrderDetail { order, items })
    }

    pub async fn list(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        filter: &OrderFilter,
    ) -> Result<Vec<Order>, AppError> {
        self.order_repo.list(&mut *conn, user_id, filter).await
    }

    pub async fn get(&self, conn: &mut PgConnection, user_id: Uuid, order_id: Uuid) -> Result<OrderDetail, AppError> {
        let order = self
            .order_repo
            .find(&mut *conn, user_id, order_id)
            .await?
            .ok_or(AppError::ResourceNotFound("order"))?;
        let items = self.order_repo.list_items(&mut *conn, user_id, order_id).await?;
        Ok(OrderDetail { order, items })
    }

    /// Atualiza o cabeçalho e, se vierem itens, substitui todos eles. Totais sempre recalculados.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        order_id: Uuid,
        payload: UpdateOrderPayload,
    ) -> Result<OrderDetail, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let mut order = self
            .order_repo
            .find_for_update(&mut *tx, user_id, order_id)
            .await?
            .ok_or(AppError::ResourceNotFound("order"))?;
        let current_items = self.order_repo.list_items(&mut *tx, user_id, order_id).await?;

        if payload.client_id.is_some() || payload.client_name.is_some() {
            // Trocar só o cliente cadastrado traz o nome dele
            let (client_id, client_name) = self
                .resolve_client(
                    &mut tx,
                    user_id,
                    payload.client_id.or(order.client_id),
                    payload.client_name.as_deref(),
                )
                .await?;
            order.client_id = client_id;
            order.client_name = client_name;
        }
        if let Some(discount) = payload.discount_percent {
            order.discount_percent = discount;
        }
        if let Some(fee) = payload.delivery_fee {
            order.delivery_fee = fee;
        }
        if payload.payment_method.is_some() {
            order.payment_method = payload.payment_method;
        }
        if payload.delivery_date.is_some() {
            order.delivery_date = payload.delivery_date;
        }
        if payload.notes.is_some() {
            order.notes = payload.notes;
        }

        let lines = match &payload.items {
            Some(new_items) => {
                let lines = self.resolve_lines(&mut tx, user_id, new_items, order.origin).await?;

                // Devolve o que as linhas antigas tinham baixado e baixa as novas
                let old_lines: Vec<(Option<Uuid>, i32)> =
                    current_items.iter().map(|i| (i.product_id, i.quantity)).collect();
                self.inventory_service
                    .apply_transition(&mut *tx, user_id, Some(order.status), None, &old_lines)
                    .await?;
                self.inventory_service
                    .apply_transition(&mut *tx, user_id, None, Some(order.status), &stock_lines(&lines))
                    .await?;

                self.order_repo.delete_items(&mut *tx, user_id, order_id).await?;
                Some(lines)
            }
            None => None,
        };

        let subtotal_lines: Vec<ResolvedLine> = match &lines {
            Some(lines) => lines.clone(),
            None => current_items.iter().map(ResolvedLine::from).collect(),
        };
        let totals = order_totals(&subtotal_lines, order.discount_percent, order.delivery_fee)?;
        order.subtotal = totals.subtotal;
        order.total = totals.total;

        let order = self.order_repo.update_header(&mut *tx, user_id, &order).await?;
        let items = match lines {
            Some(lines) => self.insert_items(&mut tx, user_id, order_id, &lines).await?,
            None => current_items,
        };

        tx.commit().await?;

        tracing::info!(%user_id, %order_id, total = %order.total, "✏️ Pedido atualizado");
        Ok(OrderDetail { order, items })
    }

    /// Troca o status e ajusta o estoque na mesma transação.
    pub async fn change_status<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<StatusChangeResponse, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let current = self
            .order_repo
            .find_for_update(&mut *tx, user_id, order_id)
            .await?
            .ok_or(AppError::ResourceNotFound("order"))?;
        let items = self.order_repo.list_items(&mut *tx, user_id, order_id).await?;

        let previous_status = current.status;
        let lines: Vec<(Option<Uuid>, i32)> = items.iter().map(|i| (i.product_id, i.quantity)).collect();

        let stock_adjustments = self
            .inventory_service
            .apply_transition(&mut *tx, user_id, Some(previous_status), Some(new_status), &lines)
            .await?;
        let order = self.order_repo.update_status(&mut *tx, user_id, order_id, new_status).await?;

        tx.commit().await?;

        tracing::info!(
            %user_id,
            %order_id,
            from = ?previous_status,
            to = ?new_status,
            "🔄 Status do pedido alterado"
        );
        Ok(StatusChangeResponse {
            order: OrderDetail { order, items },
            previous_status,
            stock_adjustments,
        })
    }

    /// Exclui o pedido devolvendo ao estoque o que ele havia baixado.
    pub async fn delete<'e, E>(&self, executor: E, user_id: Uuid, order_id: Uuid) -> Result<(), AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let order = self
            .order_repo
            .find_for_update(&mut *tx, user_id, order_id)
            .await?
            .ok_or(AppError::ResourceNotFound("order"))?;
        let items = self.order_repo.list_items(&mut *tx, user_id, order_id).await?;
        let lines: Vec<(Option<Uuid>, i32)> = items.iter().map(|i| (i.product_id, i.quantity)).collect();

        self.inventory_service
            .apply_transition(&mut *tx, user_id, Some(order.status), None, &lines)
            .await?;
        self.order_repo.delete(&mut *tx, user_id, order_id).await?;

        tx.commit().await?;

        tracing::info!(%user_id, %order_id, "🗑️ Pedido excluído");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::db_utils::begin_tenant_transaction;
    use rust_decimal::Decimal;
    use serde_json::json;
    use sqlx::PgPool;

    fn service() -> OrderService {
        let product_repo = ProductRepository::new();
        OrderService::new(
            OrderRepository::new(),
            product_repo.clone(),
            ClientRepository::new(),
            InventoryService::new(product_repo),
        )
    }

    fn d(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    async fn new_tenant(pool: &PgPool) -> Uuid {
        sqlx::query_scalar("INSERT INTO users (email, password_hash) VALUES ($1, 'x') RETURNING id")
            .bind(format!("{}@confeitaria.test", Uuid::new_v4()))
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn new_product(conn: &mut PgConnection, user_id: Uuid, price: &str, track_stock: bool, stock: i32) -> Uuid {
        sqlx::query_scalar(
            r#"
            INSERT INTO products (user_id, name, base_price, track_stock, stock_quantity)
            VALUES ($1, 'Bolo', $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(d(price))
        .bind(track_stock)
        .bind(stock)
        .fetch_one(conn)
        .await
        .unwrap()
    }

    async fn stock_of(conn: &mut PgConnection, product_id: Uuid) -> i32 {
        sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = $1")
            .bind(product_id)
            .fetch_one(conn)
            .await
            .unwrap()
    }

    fn new_order(status: &str, items: serde_json::Value) -> CreateOrderPayload {
        serde_json::from_value(json!({ "clientName": "Joana", "status": status, "items": items })).unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn confirmed_order_deducts_only_tracked_products(pool: PgPool) {
        let user_id = new_tenant(&pool).await;
        let mut tx = begin_tenant_transaction(&pool, user_id).await.unwrap();
        let tracked = new_product(&mut tx, user_id, "25.00", true, 10).await;
        let untracked = new_product(&mut tx, user_id, "10.00", false, 0).await;

        let mut payload = new_order(
            "confirmed",
            json!([
                { "productId": tracked, "quantity": 3 },
                { "productId": untracked, "quantity": 2 },
                { "productName": "Vela", "unitPrice": 2.5, "quantity": 2 }
            ]),
        );
        payload.discount_percent = d("10");
        payload.delivery_fee = d("8");

        let detail = service().create(&mut *tx, user_id, payload, OrderOrigin::Admin).await.unwrap();

        // 75 + 20 + 5, menos 10%, mais a entrega
        assert_eq!(detail.order.subtotal, d("100.00"));
        assert_eq!(detail.order.total, d("98.00"));
        assert_eq!(detail.items.len(), 3);
        assert_eq!(stock_of(&mut tx, tracked).await, 7);
        assert_eq!(stock_of(&mut tx, untracked).await, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn quote_keeps_stock_until_confirmed_and_clamps_at_zero(pool: PgPool) {
        let user_id = new_tenant(&pool).await;
        let mut tx = begin_tenant_transaction(&pool, user_id).await.unwrap();
        let product = new_product(&mut tx, user_id, "40.00", true, 2).await;
        let service = service();

        let detail = service
            .create(
                &mut *tx,
                user_id,
                new_order("quote", json!([{ "productId": product, "quantity": 5 }])),
                OrderOrigin::Admin,
            )
            .await
            .unwrap();
        assert_eq!(detail.order.status, OrderStatus::Quote);
        assert_eq!(stock_of(&mut tx, product).await, 2);

        let confirmed = service
            .change_status(&mut *tx, user_id, detail.order.id, OrderStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(confirmed.previous_status, OrderStatus::Quote);
        assert_eq!(confirmed.stock_adjustments.len(), 1);
        assert_eq!(confirmed.stock_adjustments[0].delta, -5);
        assert_eq!(confirmed.stock_adjustments[0].new_quantity, 0);
        assert_eq!(stock_of(&mut tx, product).await, 0);

        // Dentro do mesmo conjunto nada muda
        let ready = service
            .change_status(&mut *tx, user_id, detail.order.id, OrderStatus::Ready)
            .await
            .unwrap();
        assert!(ready.stock_adjustments.is_empty());

        service
            .change_status(&mut *tx, user_id, detail.order.id, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(stock_of(&mut tx, product).await, 5);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn replacing_items_of_confirmed_order_moves_stock(pool: PgPool) {
        let user_id = new_tenant(&pool).await;
        let mut tx = begin_tenant_transaction(&pool, user_id).await.unwrap();
        let cake = new_product(&mut tx, user_id, "50.00", true, 10).await;
        let pie = new_product(&mut tx, user_id, "30.00", true, 10).await;
        let service = service();

        let detail = service
            .create(
                &mut *tx,
                user_id,
                new_order("confirmed", json!([{ "productId": cake, "quantity": 4 }])),
                OrderOrigin::Admin,
            )
            .await
            .unwrap();
        assert_eq!(stock_of(&mut tx, cake).await, 6);

        let update: UpdateOrderPayload =
            serde_json::from_value(json!({ "items": [{ "productId": pie, "quantity": 3 }] })).unwrap();
        let updated = service.update(&mut *tx, user_id, detail.order.id, update).await.unwrap();

        assert_eq!(updated.order.subtotal, d("90.00"));
        assert_eq!(updated.order.total, d("90.00"));
        assert_eq!(updated.items.len(), 1);
        assert_eq!(stock_of(&mut tx, cake).await, 10);
        assert_eq!(stock_of(&mut tx, pie).await, 7);

        let reloaded = service.get(&mut tx, user_id, detail.order.id).await.unwrap();
        assert_eq!(reloaded.items[0].product_id, Some(pie));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn deleting_confirmed_order_restores_stock(pool: PgPool) {
        let user_id = new_tenant(&pool).await;
        let mut tx = begin_tenant_transaction(&pool, user_id).await.unwrap();
        let product = new_product(&mut tx, user_id, "12.00", true, 10).await;
        let service = service();

        let confirmed = service
            .create(
                &mut *tx,
                user_id,
                new_order("confirmed", json!([{ "productId": product, "quantity": 4 }])),
                OrderOrigin::Admin,
            )
            .await
            .unwrap();
        let quote = service
            .create(
                &mut *tx,
                user_id,
                new_order("quote", json!([{ "productId": product, "quantity": 3 }])),
                OrderOrigin::Admin,
            )
            .await
            .unwrap();
        assert_eq!(stock_of(&mut tx, product).await, 6);

        service.delete(&mut *tx, user_id, quote.order.id).await.unwrap();
        assert_eq!(stock_of(&mut tx, product).await, 6);

        service.delete(&mut *tx, user_id, confirmed.order.id).await.unwrap();
        assert_eq!(stock_of(&mut tx, product).await, 10);

        let listed = service.list(&mut tx, user_id, &OrderFilter::default()).await.unwrap();
        assert!(listed.is_empty());
    }
}
