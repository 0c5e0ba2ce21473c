// src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::common::validation::{validate_money, validate_unique_names};

// --- Personalizações (guardadas como JSONB no produto) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductSize {
    #[schema(example = "Médio (20 fatias)")]
    pub name: String,
    #[schema(example = "120.00")]
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VariationOption {
    #[schema(example = "Brigadeiro")]
    pub name: String,
    // Acréscimo sobre o preço; ausente = sem acréscimo
    #[schema(example = "5.00")]
    pub price_delta: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VariationGroup {
    #[schema(example = "Recheio")]
    pub name: String,
    #[serde(default)]
    pub required: bool,
    pub options: Vec<VariationOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductAddon {
    #[schema(example = "Vela de aniversário")]
    pub name: String,
    #[schema(example = "3.50")]
    pub price: Decimal,
}

// --- Produto ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[schema(ignore)]
    pub user_id: Uuid,
    pub category_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,
    #[schema(example = "Bolo de Cenoura")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "45.00")]
    pub base_price: Decimal,
    #[schema(example = "18.00")]
    pub cost_price: Option<Decimal>,
    pub image_url: Option<String>,
    #[schema(value_type = Vec<ProductSize>)]
    pub sizes: Json<Vec<ProductSize>>,
    #[schema(value_type = Vec<VariationGroup>)]
    pub variation_groups: Json<Vec<VariationGroup>>,
    #[schema(value_type = Vec<ProductAddon>)]
    pub addons: Json<Vec<ProductAddon>>,
    pub show_in_catalog: bool,
    pub track_stock: bool,
    #[schema(example = 12)]
    pub stock_quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_product_options"))]
pub struct ProductPayload {
    #[validate(length(min = 1, max = 120, message = "validation.name_length"))]
    #[schema(example = "Bolo de Cenoura")]
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,

    #[validate(custom(function = "validate_money"))]
    #[schema(example = "45.00")]
    pub base_price: Decimal,

    #[validate(custom(function = "validate_money"))]
    pub cost_price: Option<Decimal>,

    pub image_url: Option<String>,

    #[serde(default)]
    pub sizes: Vec<ProductSize>,
    #[serde(default)]
    pub variation_groups: Vec<VariationGroup>,
    #[serde(default)]
    pub addons: Vec<ProductAddon>,

    #[serde(default)]
    pub show_in_catalog: bool,
    #[serde(default)]
    pub track_stock: bool,
    #[serde(default)]
    #[validate(range(min = 0, max = 1_000_000, message = "validation.stock_range"))]
    pub stock_quantity: i32,
}

fn validate_product_options(payload: &ProductPayload) -> Result<(), ValidationError> {
    validate_unique_names(payload.sizes.iter().map(|s| s.name.as_str()))?;
    validate_unique_names(payload.addons.iter().map(|a| a.name.as_str()))?;
    validate_unique_names(payload.variation_groups.iter().map(|g| g.name.as_str()))?;
    for group in &payload.variation_groups {
        validate_unique_names(group.options.iter().map(|o| o.name.as_str()))?;
        for option in &group.options {
            if let Some(delta) = &option.price_delta {
                validate_money(delta)?;
            }
        }
    }
    for size in &payload.sizes {
        validate_money(&size.price)?;
    }
    for addon in &payload.addons {
        validate_money(&addon.price)?;
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize, ToSchema, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductFilter {
    pub category_id: Option<Uuid>,
    pub search: Option<String>,
    pub in_catalog: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetStockPayload {
    #[validate(range(min = 0, max = 1_000_000, message = "validation.stock_range"))]
    #[schema(example = 10)]
    pub stock_quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogVisibilityPayload {
    pub show_in_catalog: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> ProductPayload {
        serde_json::from_value(serde_json::json!({
            "name": "Bolo de Pote",
            "basePrice": 12.0,
            "sizes": [{ "name": "P", "price": 10.0 }, { "name": "G", "price": 15.0 }],
            "variationGroups": [{
                "name": "Sabor",
                "required": true,
                "options": [{ "name": "Ninho" }, { "name": "Brigadeiro", "priceDelta": 2.0 }]
            }],
            "addons": [{ "name": "Granulado", "price": 1.5 }]
        }))
        .unwrap()
    }

    #[test]
    fn accepts_a_well_formed_product() {
        let p = payload();
        assert!(p.validate().is_ok());
        assert!(!p.show_in_catalog);
        assert!(p.variation_groups[0].required);
    }

    #[test]
    fn rejects_duplicate_option_names() {
        let mut p = payload();
        p.variation_groups[0].options.push(VariationOption { name: "ninho".into(), price_delta: None });
        assert!(p.validate().is_err());
    }

    #[test]
    fn rejects_negative_addon_price() {
        let mut p = payload();
        p.addons[0].price = "-1".parse().unwrap();
        assert!(p.validate().is_err());
    }
}
