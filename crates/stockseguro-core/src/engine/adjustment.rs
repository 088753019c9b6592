//! # Stock Adjustment Engine
//!
//! Manual stock changes from the inventory screen: restocks and
//! deductions (breakage, loss, miscount). Every change lands in the
//! movement log inside the same transaction as the stock update.

use chrono::Utc;
use tracing::{debug, info};

use crate::api::{AdjustStockRequest, StockLevel};
use crate::error::{CoreError, CoreResult};
use crate::store::LedgerStore;
use crate::types::{MovementCause, NewStockMovement, StockOperation};
use crate::validation::validate_adjustment;

/// Applies a manual adjustment and returns the product's new stock.
///
/// ## Rules
/// - `operation` is exactly `add` or `subtract`
/// - `subtract` needs a non-blank reason and enough stock
/// - a manual reason never starts with `sale:`
/// - `add` records no reason
pub async fn adjust_stock<S>(store: &S, request: &AdjustStockRequest) -> CoreResult<StockLevel>
where
    S: LedgerStore + ?Sized,
{
    let checked = validate_adjustment(
        request.worker_id,
        &request.product_id,
        &request.operation,
        request.quantity,
        request.reason.as_deref(),
    )?;
    let product_id = request.product_id.trim();
    let quantity = request.quantity;

    debug!(
        product_id = %product_id,
        operation = %checked.operation,
        quantity,
        worker_id = request.worker_id,
        "Adjusting stock"
    );

    let product = store
        .find_active_by_id(product_id)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

    match checked.operation {
        StockOperation::Subtract if product.stock < quantity => {
            return Err(CoreError::InsufficientStock {
                product_id: product.id,
                available: product.stock,
                requested: quantity,
            });
        }
        StockOperation::Add if product.stock.checked_add(quantity).is_none() => {
            return Err(CoreError::AmountOverflow {
                product_id: product.id,
            });
        }
        _ => {}
    }

    let cause = match (checked.operation, checked.reason) {
        (StockOperation::Subtract, Some(reason)) => MovementCause::Manual { reason },
        _ => MovementCause::Restock,
    };

    let mut tx = store.begin().await?;

    let affected = tx
        .conditional_adjust_stock(product_id, checked.operation.delta(quantity))
        .await?;
    if affected == 0 {
        return Err(CoreError::ConcurrentModification {
            product_id: product_id.to_string(),
        });
    }

    tx.insert_stock_movement(&NewStockMovement {
        product_id: product_id.to_string(),
        worker_id: request.worker_id,
        operation: checked.operation,
        quantity,
        cause,
        created_at: Utc::now(),
    })
    .await?;

    let new_stock = tx
        .stock_of(product_id)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

    tx.commit().await?;

    info!(
        product_id = %product_id,
        operation = %checked.operation,
        quantity,
        new_stock,
        "Stock adjusted"
    );

    Ok(StockLevel { new_stock })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::memory::MemoryStore;
    use crate::types::Product;

    fn pisco(stock: i64) -> Product {
        Product {
            id: "P".to_string(),
            barcode: "7801234567890".to_string(),
            name: "Pisco Capel 35° 700ml".to_string(),
            category: "Licores".to_string(),
            unit_price: 7990,
            box_price: 89000,
            stock,
            min_stock: 2,
            image: "🍸".to_string(),
            active: true,
        }
    }

    fn request(operation: &str, quantity: i64, reason: Option<&str>) -> AdjustStockRequest {
        AdjustStockRequest {
            worker_id: 1,
            product_id: "P".to_string(),
            operation: operation.to_string(),
            quantity,
            reason: reason.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_subtract_without_reason_is_rejected() {
        let store = MemoryStore::with_products([pisco(7)]);

        for reason in [None, Some(""), Some("   ")] {
            let err = adjust_stock(&store, &request("subtract", 1, reason))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                CoreError::Validation(ValidationError::ReasonRequired)
            ));
        }

        let state = store.snapshot().await;
        assert_eq!(state.products["P"].stock, 7);
        assert!(state.movements.is_empty());
    }

    #[tokio::test]
    async fn test_add_without_reason_succeeds() {
        let store = MemoryStore::with_products([pisco(7)]);

        let level = adjust_stock(&store, &request("add", 5, None)).await.unwrap();
        assert_eq!(level.new_stock, 12);

        let state = store.snapshot().await;
        assert_eq!(state.products["P"].stock, 12);
        assert_eq!(state.movements.len(), 1);
        assert_eq!(state.movements[0].operation, StockOperation::Add);
        assert_eq!(state.movements[0].quantity, 5);
        assert_eq!(state.movements[0].reason, None);
    }

    #[tokio::test]
    async fn test_add_ignores_a_supplied_reason() {
        let store = MemoryStore::with_products([pisco(1)]);

        adjust_stock(&store, &request("add", 2, Some("proveedor")))
            .await
            .unwrap();
        assert_eq!(store.snapshot().await.movements[0].reason, None);
    }

    #[tokio::test]
    async fn test_subtract_records_trimmed_reason() {
        let store = MemoryStore::with_products([pisco(7)]);

        let level = adjust_stock(&store, &request("subtract", 2, Some("  Botella rota  ")))
            .await
            .unwrap();
        assert_eq!(level.new_stock, 5);

        let movement = &store.snapshot().await.movements[0];
        assert_eq!(movement.reason.as_deref(), Some("Botella rota"));
        assert_eq!(
            movement.cause(),
            MovementCause::Manual {
                reason: "Botella rota".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_subtract_reason_cannot_pose_as_a_sale() {
        let store = MemoryStore::with_products([pisco(7)]);

        let err = adjust_stock(&store, &request("subtract", 3, Some("sale:7")))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::ReservedReason { .. })
        ));

        let state = store.snapshot().await;
        assert_eq!(state.products["P"].stock, 7);
        assert!(state.movements.is_empty());
    }

    #[tokio::test]
    async fn test_subtract_below_zero_is_rejected() {
        let store = MemoryStore::with_products([pisco(2)]);

        let err = adjust_stock(&store, &request("subtract", 3, Some("merma")))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                available: 2,
                requested: 3,
                ..
            }
        ));
        assert_eq!(store.snapshot().await.products["P"].stock, 2);
    }

    #[tokio::test]
    async fn test_unknown_operation_and_product() {
        let store = MemoryStore::with_products([pisco(2)]);

        let err = adjust_stock(&store, &request("remove", 1, Some("x")))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::NotAllowed { .. })
        ));

        let mut missing = request("add", 1, None);
        missing.product_id = "NOPE".to_string();
        let err = adjust_stock(&store, &missing).await.unwrap_err();
        assert!(matches!(err, CoreError::ProductNotFound(_)));
    }

    #[tokio::test]
    async fn test_deactivated_before_commit_is_a_conflict() {
        let store = MemoryStore::with_products([pisco(5)]);
        store
            .interleave_next_begin(|state| {
                if let Some(p) = state.products.get_mut("P") {
                    p.active = false;
                }
            })
            .await;

        let err = adjust_stock(&store, &request("add", 1, None)).await.unwrap_err();
        assert!(matches!(err, CoreError::ConcurrentModification { .. }));

        let state = store.snapshot().await;
        assert_eq!(state.products["P"].stock, 5);
        assert!(state.movements.is_empty());
    }

    #[tokio::test]
    async fn test_movement_failure_rolls_back_stock() {
        let store = MemoryStore::with_products([pisco(5)]);
        store.fail_movement_inserts(true);

        assert!(adjust_stock(&store, &request("add", 3, None)).await.is_err());
        assert_eq!(store.snapshot().await.products["P"].stock, 5);
    }
}
