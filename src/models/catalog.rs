// src/models/catalog.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::validation::validate_phone;
use crate::models::{
    category::CategoryNode,
    order::{OrderItemInput, VariationChoice},
    product::{Product, ProductAddon, ProductSize, VariationGroup},
    settings::BakerySettings,
};

// Produto como aparece na vitrine: sem custo e sem saldo exato
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicProduct {
    pub id: Uuid,
    pub category_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub base_price: Decimal,
    pub image_url: Option<String>,
    pub sizes: Vec<ProductSize>,
    pub variation_groups: Vec<VariationGroup>,
    pub addons: Vec<ProductAddon>,
    pub available: bool,
}

impl From<Product> for PublicProduct {
    fn from(p: Product) -> Self {
        let available = !p.track_stock || p.stock_quantity > 0;
        Self {
            id: p.id,
            category_id: p.category_id,
            subcategory_id: p.subcategory_id,
            name: p.name,
            description: p.description,
            base_price: p.base_price,
            image_url: p.image_url,
            sizes: p.sizes.0,
            variation_groups: p.variation_groups.0,
            addons: p.addons.0,
            available,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicCatalog {
    pub bakery: BakerySettings,
    pub categories: Vec<CategoryNode>,
    pub products: Vec<PublicProduct>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutCustomer {
    #[validate(length(min = 1, max = 120, message = "validation.name_length"))]
    #[schema(example = "Joana Lima")]
    pub name: String,
    #[validate(length(max = 20, message = "validation.phone"), custom(function = "validate_phone"))]
    #[schema(example = "(11) 97777-6666")]
    pub phone: String,
    #[validate(email(message = "validation.email"))]
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItemInput {
    pub product_id: Uuid,
    pub size: Option<String>,
    #[serde(default)]
    pub variations: Vec<VariationChoice>,
    #[serde(default)]
    pub addons: Vec<String>,
    #[validate(range(min = 1, max = 10_000, message = "validation.quantity_range"))]
    pub quantity: i32,
}

impl From<CatalogItemInput> for OrderItemInput {
    fn from(item: CatalogItemInput) -> Self {
        // Preço e nome nunca vêm do cliente na vitrine
        OrderItemInput {
            product_id: Some(item.product_id),
            size: item.size,
            variations: item.variations,
            addons: item.addons,
            quantity: item.quantity,
            product_name: None,
            unit_price: None,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPayload {
    #[validate(nested)]
    pub customer: CheckoutCustomer,
    #[validate(nested)]
    pub items: Vec<CatalogItemInput>,
    #[schema(example = "pix")]
    pub payment_method: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub order_id: Uuid,
    pub total: Decimal,
    // Link pronto para o cliente mandar o pedido no WhatsApp da confeitaria
    pub whatsapp_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(phone: &str) -> CheckoutCustomer {
        CheckoutCustomer { name: "Joana".into(), phone: phone.into(), email: None, address: None }
    }

    #[test]
    fn phone_without_digits_is_rejected() {
        let errors = customer("--------").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("phone"));
        assert!(customer("(11) 97777-6666").validate().is_ok());
    }

    #[test]
    fn item_quantity_has_a_ceiling() {
        let item = CatalogItemInput {
            product_id: Uuid::new_v4(),
            size: None,
            variations: Vec::new(),
            addons: Vec::new(),
            quantity: 10_001,
        };
        assert!(item.validate().is_err());
    }
}
