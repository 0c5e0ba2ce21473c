// src/services/catalog_service.rs
//
// Vitrine pública: leitura do catálogo e checkout sem login.

use reqwest::Url;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::begin_tenant_transaction, error::AppError},
    db::{CategoryRepository, ClientRepository, ProductRepository, SettingsRepository, UserRepository},
    models::{
        catalog::{CheckoutPayload, CheckoutResponse, PublicCatalog, PublicProduct},
        category::build_category_tree,
        client::{normalize_phone, ClientPayload},
        order::{CreateOrderPayload, OrderDetail, OrderOrigin, OrderStatus},
        product::ProductFilter,
    },
    services::order_service::OrderService,
};

fn brl(value: Decimal) -> String {
    format!("R$ {:.2}", value).replace('.', ",")
}

/// Texto que o cliente manda para a confeitaria ao finalizar.
pub fn checkout_message(bakery_name: &str, detail: &OrderDetail) -> String {
    let mut lines = vec![format!(
        "Olá, {}! Acabei de fazer o pedido #{} pelo catálogo:",
        bakery_name,
        &detail.order.id.simple().to_string()[..8]
    )];
    lines.push(String::new());

    for item in &detail.items {
        let mut desc = format!("{}x {}", item.quantity, item.product_name);
        if let Some(size) = &item.size_name {
            desc.push_str(&format!(" ({})", size));
        }
        for variation in item.variations.iter() {
            desc.push_str(&format!(", {}: {}", variation.group, variation.option));
        }
        for addon in item.addons.iter() {
            desc.push_str(&format!(", + {}", addon.name));
        }
        desc.push_str(&format!(" - {}", brl(item.total)));
        lines.push(desc);
    }

    lines.push(String::new());
    lines.push(format!("Total: {}", brl(detail.order.total)));
    if let Some(date) = detail.order.delivery_date {
        lines.push(format!("Entrega: {}", date.format("%d/%m/%Y")));
    }
    lines.join("\n")
}

/// Link wa.me com a mensagem pronta. Número nacional (até 11 dígitos) ganha o DDI 55.
pub fn whatsapp_url(phone: &str, message: &str) -> Option<String> {
    let digits = normalize_phone(phone);
    if digits.len() < 10 {
        return None;
    }
    let number = if digits.len() <= 11 { format!("55{}", digits) } else { digits };

    Url::parse_with_params(&format!("https://wa.me/{}", number), &[("text", message)])
        .ok()
        .map(String::from)
}

#[derive(Clone)]
pub struct CatalogService {
    pool: PgPool,
    user_repo: UserRepository,
    settings_repo: SettingsRepository,
    category_repo: CategoryRepository,
    product_repo: ProductRepository,
    client_repo: ClientRepository,
    order_service: OrderService,
}

impl CatalogService {
    pub fn new(
        pool: PgPool,
        user_repo: UserRepository,
        settings_repo: SettingsRepository,
        category_repo: CategoryRepository,
        product_repo: ProductRepository,
        client_repo: ClientRepository,
        order_service: OrderService,
    ) -> Self {
        Self { pool, user_repo, settings_repo, category_repo, product_repo, client_repo, order_service }
    }

    // Conta inexistente ou vencida: a vitrine some (404)
    async fn ensure_available(&self, tenant_id: Uuid) -> Result<(), AppError> {
        let owner = self.user_repo.find_by_id(tenant_id).await?;
        match owner {
            Some(user) if user.has_active_subscription(chrono::Utc::now()) => Ok(()),
            _ => Err(AppError::CatalogUnavailable),
        }
    }

    pub async fn get_catalog(&self, tenant_id: Uuid) -> Result<PublicCatalog, AppError> {
        self.ensure_available(tenant_id).await?;

        let mut tx = begin_tenant_transaction(&self.pool, tenant_id).await?;
        let bakery = self.settings_repo.get_settings(&mut *tx, tenant_id).await?;
        let categories = self.category_repo.list(&mut *tx, tenant_id).await?;
        let filter = ProductFilter { in_catalog: Some(true), ..Default::default() };
        let products = self.product_repo.list(&mut *tx, tenant_id, &filter).await?;
        tx.commit().await?;

        Ok(PublicCatalog {
            bakery,
            categories: build_category_tree(categories),
            products: products.into_iter().map(PublicProduct::from).collect(),
        })
    }

    pub async fn checkout(&self, tenant_id: Uuid, payload: CheckoutPayload) -> Result<CheckoutResponse, AppError> {
        self.ensure_available(tenant_id).await?;

        let mut tx = begin_tenant_transaction(&self.pool, tenant_id).await?;
        let customer = payload.customer;

        // Cliente reencontrado pelo telefone; senão, cadastrado agora
        let client = match self.client_repo.find_by_phone(&mut *tx, tenant_id, &customer.phone).await? {
            Some(client) => client,
            None => {
                let new_client = ClientPayload {
                    name: customer.name.trim().to_string(),
                    phone: Some(customer.phone.trim().to_string()),
                    email: customer.email.clone(),
                    address: customer.address.clone(),
                    notes: None,
                };
                self.client_repo.create(&mut *tx, tenant_id, &new_client).await?
            }
        };

        let order_payload = CreateOrderPayload {
            client_id: Some(client.id),
            client_name: Some(customer.name.trim().to_string()),
            status: Some(OrderStatus::Quote),
            discount_percent: Decimal::ZERO,
            delivery_fee: Decimal::ZERO,
            payment_method: payload.payment_method,
            delivery_date: payload.delivery_date,
            notes: payload.notes,
            items: payload.items.into_iter().map(Into::into).collect(),
        };
        let detail = self
            .order_service
            .create(&mut *tx, tenant_id, order_payload, OrderOrigin::Catalog)
            .await?;

        let settings = self.settings_repo.get_settings(&mut *tx, tenant_id).await?;
        tx.commit().await?;

        let whatsapp = settings.whatsapp.as_deref().or(settings.phone.as_deref());
        let whatsapp_url = whatsapp.and_then(|phone| whatsapp_url(phone, &checkout_message(&settings.bakery_name, &detail)));

        tracing::info!(%tenant_id, order_id = %detail.order.id, "🛒 Pedido recebido pelo catálogo");
        Ok(CheckoutResponse {
            order_id: detail.order.id,
            total: detail.order.total,
            whatsapp_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::{Order, OrderItem, SelectedAddon, SelectedVariation};
    use chrono::{NaiveDate, Utc};
    use sqlx::types::Json;

    fn detail() -> OrderDetail {
        let order_id = Uuid::parse_str("3f2a9c1e-0000-4000-8000-000000000000").unwrap();
        let now = Utc::now();
        OrderDetail {
            order: Order {
                id: order_id,
                user_id: Uuid::new_v4(),
                client_id: None,
                client_name: "Joana".into(),
                status: OrderStatus::Quote,
                discount_percent: Decimal::ZERO,
                delivery_fee: Decimal::ZERO,
                payment_method: None,
                delivery_date: NaiveDate::from_ymd_opt(2025, 4, 12),
                notes: None,
                origin: OrderOrigin::Catalog,
                subtotal: "95.5".parse().unwrap(),
                total: "95.5".parse().unwrap(),
                created_at: now,
                updated_at: now,
            },
            items: vec![OrderItem {
                id: Uuid::new_v4(),
                order_id,
                product_id: None,
                product_name: "Bolo de Cenoura".into(),
                size_name: Some("Médio".into()),
                variations: Json(vec![SelectedVariation {
                    group: "Cobertura".into(),
                    option: "Chocolate".into(),
                    price: "5".parse().unwrap(),
                }]),
                addons: Json(vec![SelectedAddon { name: "Vela".into(), price: "3.5".parse().unwrap() }]),
                quantity: 1,
                unit_price: "95.5".parse().unwrap(),
                total: "95.5".parse().unwrap(),
                created_at: now,
            }],
        }
    }

    #[test]
    fn message_lists_items_and_total() {
        let msg = checkout_message("Doces da Maria", &detail());
        assert!(msg.starts_with("Olá, Doces da Maria! Acabei de fazer o pedido #3f2a9c1e"));
        assert!(msg.contains("1x Bolo de Cenoura (Médio), Cobertura: Chocolate, + Vela - R$ 95,50"));
        assert!(msg.contains("Total: R$ 95,50"));
        assert!(msg.contains("Entrega: 12/04/2025"));
    }

    #[test]
    fn whatsapp_link_adds_country_code_and_encodes_text() {
        let url = whatsapp_url("(11) 97777-6666", "Olá mundo").unwrap();
        assert!(url.starts_with("https://wa.me/5511977776666?text="));
        assert!(!url.contains(' '));

        let international = whatsapp_url("+351 912 345 678", "oi").unwrap();
        assert!(international.starts_with("https://wa.me/351912345678?"));

        assert_eq!(whatsapp_url("123", "oi"), None);
    }
}
