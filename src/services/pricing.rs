// src/services/pricing.rs
//
// Cálculo de preço dos itens e dos totais do pedido.
// Tudo aqui é puro: o serviço de pedidos busca os produtos e chama estas funções.

use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use crate::{
    common::{error::AppError, validation::MAX_MONEY},
    models::{
        order::{OrderItem, OrderItemInput, SelectedAddon, SelectedVariation},
        product::Product,
    },
};

/// Um item já precificado, pronto para virar `order_items`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLine {
    pub product_id: Option<Uuid>,
    pub product_name: String,
    pub size_name: Option<String>,
    pub variations: Vec<SelectedVariation>,
    pub addons: Vec<SelectedAddon>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total: Decimal,
}

// Item já gravado volta a ser linha para recalcular os totais
impl From<&OrderItem> for ResolvedLine {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_id: item.product_id,
            product_name: item.product_name.clone(),
            size_name: item.size_name.clone(),
            variations: item.variations.0.clone(),
            addons: item.addons.0.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            total: item.total,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub total: Decimal,
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn amount_too_large(field: &'static str) -> AppError {
    let mut errors = ValidationErrors::new();
    errors.add(field, ValidationError::new("range").with_message("validation.amount_range".into()));
    AppError::ValidationError(errors)
}

/// Valor calculado precisa caber em NUMERIC(12, 2); estouro vira erro de validação.
fn bounded(value: Option<Decimal>, field: &'static str) -> Result<Decimal, AppError> {
    value.filter(|v| *v <= MAX_MONEY).ok_or_else(|| amount_too_large(field))
}

fn line_total(unit_price: Decimal, quantity: i32) -> Result<Decimal, AppError> {
    bounded(unit_price.checked_mul(Decimal::from(quantity)), "items")
}

/// Preço base do tamanho escolhido; tamanho com preço zero (ou sem tamanho) usa o preço do produto.
fn base_for_size(product: &Product, size: Option<&str>) -> Result<(Option<String>, Decimal), AppError> {
    let Some(size_name) = size.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok((None, product.base_price));
    };

    let size = product
        .sizes
        .iter()
        .find(|s| same_name(&s.name, size_name))
        .ok_or_else(|| AppError::UnknownOption {
            product: product.name.clone(),
            option: size_name.to_string(),
        })?;

    let price = if size.price > Decimal::ZERO { size.price } else { product.base_price };
    Ok((Some(size.name.clone()), price))
}

fn resolve_variations(product: &Product, input: &OrderItemInput) -> Result<Vec<SelectedVariation>, AppError> {
    let mut selected: Vec<SelectedVariation> = Vec::with_capacity(input.variations.len());

    for choice in &input.variations {
        let group = product
            .variation_groups
            .iter()
            .find(|g| same_name(&g.name, &choice.group))
            .ok_or_else(|| AppError::UnknownOption {
                product: product.name.clone(),
                option: choice.group.clone(),
            })?;

        if selected.iter().any(|s| s.group == group.name) {
            return Err(AppError::DuplicateVariation {
                product: product.name.clone(),
                group: group.name.clone(),
            });
        }

        let option = group
            .options
            .iter()
            .find(|o| same_name(&o.name, &choice.option))
            .ok_or_else(|| AppError::UnknownOption {
                product: product.name.clone(),
                option: choice.option.clone(),
            })?;

        selected.push(SelectedVariation {
            group: group.name.clone(),
            option: option.name.clone(),
            price: option.price_delta.unwrap_or(Decimal::ZERO),
        });
    }

    if let Some(missing) = product
        .variation_groups
        .iter()
        .filter(|g| g.required)
        .find(|g| !selected.iter().any(|s| s.group == g.name))
    {
        return Err(AppError::MissingRequiredVariation {
            product: product.name.clone(),
            group: missing.name.clone(),
        });
    }

    Ok(selected)
}

// Adicional repetido na lista conta duas vezes
fn resolve_addons(product: &Product, input: &OrderItemInput) -> Result<Vec<SelectedAddon>, AppError> {
    input
        .addons
        .iter()
        .map(|name| {
            product
                .addons
                .iter()
                .find(|a| same_name(&a.name, name))
                .map(|a| SelectedAddon { name: a.name.clone(), price: a.price })
                .ok_or_else(|| AppError::UnknownOption {
                    product: product.name.clone(),
                    option: name.clone(),
                })
        })
        .collect()
}

/// Preço unitário efetivo: base (ou tamanho) + acréscimos das variações + adicionais.
pub fn unit_effective_price(
    base: Decimal,
    variations: &[SelectedVariation],
    addons: &[SelectedAddon],
) -> Result<Decimal, AppError> {
    let total = variations
        .iter()
        .map(|v| v.price)
        .chain(addons.iter().map(|a| a.price))
        .try_fold(base, |acc, price| acc.checked_add(price));
    bounded(total, "items")
}

/// Precifica um item ligado a um produto. Preço e nome enviados pelo cliente são ignorados.
pub fn resolve_product_line(product: &Product, input: &OrderItemInput) -> Result<ResolvedLine, AppError> {
    let (size_name, base) = base_for_size(product, input.size.as_deref())?;
    let variations = resolve_variations(product, input)?;
    let addons = resolve_addons(product, input)?;

    let unit_price = unit_effective_price(base, &variations, &addons)?;
    Ok(ResolvedLine {
        product_id: Some(product.id),
        product_name: product.name.clone(),
        size_name,
        variations,
        addons,
        quantity: input.quantity,
        unit_price,
        total: line_total(unit_price, input.quantity)?,
    })
}

/// Item avulso: nome e preço unitário vêm do próprio pedido.
pub fn resolve_custom_line(input: &OrderItemInput) -> Result<ResolvedLine, AppError> {
    let name = input.product_name.as_deref().map(str::trim).filter(|s| !s.is_empty());

    let (Some(name), Some(unit_price)) = (name, input.unit_price) else {
        let mut errors = ValidationErrors::new();
        if name.is_none() {
            errors.add("product_name", ValidationError::new("required").with_message("validation.required".into()));
        }
        if input.unit_price.is_none() {
            errors.add("unit_price", ValidationError::new("required").with_message("validation.required".into()));
        }
        return Err(AppError::ValidationError(errors));
    };

    Ok(ResolvedLine {
        product_id: None,
        product_name: name.to_string(),
        size_name: None,
        variations: Vec::new(),
        addons: Vec::new(),
        quantity: input.quantity,
        unit_price,
        total: line_total(unit_price, input.quantity)?,
    })
}

/// subtotal − desconto% + taxa de entrega. Desconto e total com 2 casas.
pub fn order_totals(
    lines: &[ResolvedLine],
    discount_percent: Decimal,
    delivery_fee: Decimal,
) -> Result<OrderTotals, AppError> {
    let subtotal = bounded(
        lines.iter().try_fold(Decimal::ZERO, |acc, l| acc.checked_add(l.total)),
        "items",
    )?;
    let discount_amount = round_money(
        subtotal
            .checked_mul(discount_percent)
            .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
            .ok_or_else(|| amount_too_large("discount_percent"))?,
    );
    let total = subtotal
        .checked_sub(discount_amount)
        .and_then(|v| v.checked_add(delivery_fee))
        .map(round_money);

    Ok(OrderTotals { subtotal, discount_amount, total: bounded(total, "delivery_fee")? })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        order::VariationChoice,
        product::{ProductAddon, ProductSize, VariationGroup, VariationOption},
    };
    use chrono::Utc;
    use sqlx::types::Json;

    fn d(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    fn cake() -> Product {
        Product {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            category_id: None,
            subcategory_id: None,
            name: "Bolo de Chocolate".into(),
            description: None,
            base_price: d("50.00"),
            cost_price: Some(d("20.00")),
            image_url: None,
            sizes: Json(vec![
                ProductSize { name: "Pequeno".into(), price: d("0") },
                ProductSize { name: "Grande".into(), price: d("90.00") },
            ]),
            variation_groups: Json(vec![
                VariationGroup {
                    name: "Recheio".into(),
                    required: true,
                    options: vec![
                        VariationOption { name: "Ninho".into(), price_delta: None },
                        VariationOption { name: "Brigadeiro".into(), price_delta: Some(d("5.00")) },
                    ],
                },
                VariationGroup {
                    name: "Cobertura".into(),
                    required: false,
                    options: vec![VariationOption { name: "Ganache".into(), price_delta: Some(d("7.50")) }],
                },
            ]),
            addons: Json(vec![ProductAddon { name: "Vela".into(), price: d("3.50") }]),
            show_in_catalog: true,
            track_stock: false,
            stock_quantity: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn item(size: Option<&str>, variations: &[(&str, &str)], addons: &[&str], quantity: i32) -> OrderItemInput {
        OrderItemInput {
            product_id: None,
            size: size.map(String::from),
            variations: variations
                .iter()
                .map(|(g, o)| VariationChoice { group: g.to_string(), option: o.to_string() })
                .collect(),
            addons: addons.iter().map(|a| a.to_string()).collect(),
            quantity,
            product_name: None,
            unit_price: None,
        }
    }

    #[test]
    fn sums_size_variations_and_addons() {
        let line = resolve_product_line(
            &cake(),
            &item(Some("grande"), &[("Recheio", "Brigadeiro"), ("Cobertura", "Ganache")], &["Vela"], 2),
        )
        .unwrap();

        // 90 + 5 + 7.50 + 3.50
        assert_eq!(line.unit_price, d("106.00"));
        assert_eq!(line.total, d("212.00"));
        assert_eq!(line.size_name.as_deref(), Some("Grande"));
        assert_eq!(line.variations.len(), 2);
    }

    #[test]
    fn size_without_price_falls_back_to_base_price() {
        let line = resolve_product_line(&cake(), &item(Some("Pequeno"), &[("Recheio", "Ninho")], &[], 1)).unwrap();
        assert_eq!(line.unit_price, d("50.00"));
    }

    #[test]
    fn repeated_addon_is_charged_twice() {
        let line = resolve_product_line(&cake(), &item(None, &[("Recheio", "Ninho")], &["Vela", "Vela"], 1)).unwrap();
        assert_eq!(line.unit_price, d("57.00"));
    }

    #[test]
    fn rejects_unknown_option() {
        let err = resolve_product_line(&cake(), &item(None, &[("Recheio", "Morango")], &[], 1)).unwrap_err();
        assert!(matches!(err, AppError::UnknownOption { option, .. } if option == "Morango"));

        let err = resolve_product_line(&cake(), &item(Some("Gigante"), &[("Recheio", "Ninho")], &[], 1)).unwrap_err();
        assert!(matches!(err, AppError::UnknownOption { .. }));
    }

    #[test]
    fn rejects_missing_required_and_duplicated_groups() {
        let err = resolve_product_line(&cake(), &item(None, &[], &[], 1)).unwrap_err();
        assert!(matches!(err, AppError::MissingRequiredVariation { group, .. } if group == "Recheio"));

        let err = resolve_product_line(
            &cake(),
            &item(None, &[("Recheio", "Ninho"), ("recheio", "Brigadeiro")], &[], 1),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::DuplicateVariation { .. }));
    }

    #[test]
    fn custom_line_requires_name_and_price() {
        let mut input = item(None, &[], &[], 3);
        assert!(matches!(resolve_custom_line(&input), Err(AppError::ValidationError(_))));

        input.product_name = Some("Docinho".into());
        input.unit_price = Some(d("1.50"));
        let line = resolve_custom_line(&input).unwrap();
        assert_eq!(line.total, d("4.50"));
        assert_eq!(line.product_id, None);
    }

    #[test]
    fn totals_apply_discount_then_delivery_fee() {
        let lines = vec![
            resolve_custom_line(&OrderItemInput {
                product_name: Some("Torta".into()),
                unit_price: Some(d("33.33")),
                ..item(None, &[], &[], 1)
            })
            .unwrap(),
        ];

        let totals = order_totals(&lines, d("10"), d("8.00")).unwrap();
        assert_eq!(totals.subtotal, d("33.33"));
        // 3.333 -> 3.33
        assert_eq!(totals.discount_amount, d("3.33"));
        assert_eq!(totals.total, d("38.00"));
    }

    #[test]
    fn full_discount_leaves_only_the_delivery_fee() {
        let lines = vec![resolve_custom_line(&OrderItemInput {
            product_name: Some("Bolo".into()),
            unit_price: Some(d("80")),
            ..item(None, &[], &[], 2)
        })
        .unwrap()];

        let totals = order_totals(&lines, d("100"), d("12.5")).unwrap();
        assert_eq!(totals.total, d("12.50"));
    }

    #[test]
    fn huge_custom_price_is_a_validation_error() {
        let input = OrderItemInput {
            product_name: Some("Bolo".into()),
            unit_price: Some(d("10000000000000000000000000000")),
            ..item(None, &[], &[], 100)
        };
        assert!(matches!(resolve_custom_line(&input), Err(AppError::ValidationError(_))));

        // Cabe por item, mas não na coluna do total
        let input = OrderItemInput {
            product_name: Some("Bolo".into()),
            unit_price: Some(d("9999999999.99")),
            ..item(None, &[], &[], 2)
        };
        assert!(matches!(resolve_custom_line(&input), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn order_total_over_the_limit_is_rejected() {
        let line = resolve_custom_line(&OrderItemInput {
            product_name: Some("Bolo".into()),
            unit_price: Some(d("9999999999.00")),
            ..item(None, &[], &[], 1)
        })
        .unwrap();

        assert!(order_totals(&[line.clone(), line.clone()], Decimal::ZERO, Decimal::ZERO).is_err());
        assert!(order_totals(&[line.clone()], Decimal::ZERO, d("5.00")).is_err());
        assert!(order_totals(&[line], d("10"), d("5.00")).is_ok());
    }
}
