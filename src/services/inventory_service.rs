// src/services/inventory_service.rs
//
// Baixa e devolução de estoque dos produtos quando o pedido troca de status.

use std::collections::BTreeMap;

use sqlx::{Acquire, Postgres};
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use crate::{
    common::error::AppError,
    db::ProductRepository,
    models::order::{AppliedStockAdjustment, OrderStatus},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDirection {
    Deduct,  // Saiu do estoque
    Restore, // Voltou para o estoque
}

/// Direção do ajuste para uma transição. `None` de origem = pedido novo; `None` de destino = pedido excluído.
pub fn direction_for_transition(from: Option<OrderStatus>, to: Option<OrderStatus>) -> Option<StockDirection> {
    let was_deducted = from.is_some_and(OrderStatus::deducts_stock);
    let will_deduct = to.is_some_and(OrderStatus::deducts_stock);

    match (was_deducted, will_deduct) {
        (false, true) => Some(StockDirection::Deduct),
        (true, false) => Some(StockDirection::Restore),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockAdjustment {
    pub product_id: Uuid,
    pub delta: i32,
}

fn quantity_overflow() -> AppError {
    let mut errors = ValidationErrors::new();
    errors.add("items", ValidationError::new("range").with_message("validation.quantity_range".into()));
    AppError::ValidationError(errors)
}

/// Agrupa as linhas por produto (ordem estável pelo id). Itens avulsos ficam de fora.
pub fn plan_adjustments<I>(lines: I, direction: StockDirection) -> Result<Vec<StockAdjustment>, AppError>
where
    I: IntoIterator<Item = (Option<Uuid>, i32)>,
{
    let mut per_product: BTreeMap<Uuid, i32> = BTreeMap::new();
    for (product_id, quantity) in lines {
        if let Some(product_id) = product_id {
            let total = per_product.entry(product_id).or_insert(0);
            *total = total.checked_add(quantity).ok_or_else(quantity_overflow)?;
        }
    }

    Ok(per_product
        .into_iter()
        .filter(|(_, quantity)| *quantity > 0)
        .map(|(product_id, quantity)| StockAdjustment {
            product_id,
            delta: match direction {
                StockDirection::Deduct => -quantity,
                StockDirection::Restore => quantity,
            },
        })
        .collect())
}

#[derive(Clone)]
pub struct InventoryService {
    product_repo: ProductRepository,
}

impl InventoryService {
    pub fn new(product_repo: ProductRepository) -> Self {
        Self { product_repo }
    }

    /// Aplica o ajuste da transição `from -> to` às linhas do pedido.
    /// Produtos sem controle de estoque (ou já excluídos) são ignorados.
    pub async fn apply_transition<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        from: Option<OrderStatus>,
        to: Option<OrderStatus>,
        lines: &[(Option<Uuid>, i32)],
    ) -> Result<Vec<AppliedStockAdjustment>, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let Some(direction) = direction_for_transition(from, to) else {
            return Ok(Vec::new());
        };

        let adjustments = plan_adjustments(lines.iter().copied(), direction)?;
        if adjustments.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = executor.begin().await?;
        let mut applied = Vec::with_capacity(adjustments.len());

        for adjustment in adjustments {
            if let Some(new_quantity) = self
                .product_repo
                .adjust_stock(&mut *tx, user_id, adjustment.product_id, adjustment.delta)
                .await?
            {
                applied.push(AppliedStockAdjustment {
                    product_id: adjustment.product_id,
                    delta: adjustment.delta,
                    new_quantity,
                });
            }
        }

        tx.commit().await?;

        tracing::info!(
            %user_id,
            ?direction,
            products = applied.len(),
            "📦 Estoque ajustado"
        );
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn only_crossing_the_deducting_set_moves_stock() {
        assert_eq!(direction_for_transition(Some(Quote), Some(Confirmed)), Some(StockDirection::Deduct));
        assert_eq!(direction_for_transition(Some(Ready), Some(Cancelled)), Some(StockDirection::Restore));
        assert_eq!(direction_for_transition(Some(Confirmed), Some(Delivered)), None);
        assert_eq!(direction_for_transition(Some(Quote), Some(Cancelled)), None);
        assert_eq!(direction_for_transition(Some(Cancelled), Some(InProduction)), Some(StockDirection::Deduct));
    }

    #[test]
    fn creation_and_deletion_count_as_transitions() {
        assert_eq!(direction_for_transition(None, Some(Confirmed)), Some(StockDirection::Deduct));
        assert_eq!(direction_for_transition(None, Some(Quote)), None);
        assert_eq!(direction_for_transition(Some(Delivered), None), Some(StockDirection::Restore));
        assert_eq!(direction_for_transition(Some(Cancelled), None), None);
    }

    #[test]
    fn aggregates_lines_per_product_and_skips_custom_items() {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);

        let plan = plan_adjustments(
            vec![(Some(b), 1), (None, 10), (Some(a), 2), (Some(b), 3)],
            StockDirection::Deduct,
        )
        .unwrap();

        assert_eq!(
            plan,
            vec![
                StockAdjustment { product_id: a, delta: -2 },
                StockAdjustment { product_id: b, delta: -4 },
            ]
        );
    }

    #[test]
    fn restore_uses_positive_deltas() {
        let a = Uuid::from_u128(7);
        let plan = plan_adjustments(vec![(Some(a), 5)], StockDirection::Restore).unwrap();
        assert_eq!(plan, vec![StockAdjustment { product_id: a, delta: 5 }]);
    }

    #[test]
    fn summing_past_i32_is_rejected_instead_of_wrapping() {
        let a = Uuid::from_u128(3);
        let result = plan_adjustments(vec![(Some(a), 2_000_000_000), (Some(a), 2_000_000_000)], StockDirection::Deduct);
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }
}
