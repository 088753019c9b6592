//! # Sale Transaction Engine
//!
//! Turns a cart into a committed sale.
//!
//! ## Commit Order
//! ```text
//! begin
//!   │
//!   ├── for each line, in cart order:
//!   │     UPDATE stock = stock - qty  WHERE active AND stock - qty >= 0
//!   │     (0 rows ⇒ abort, whole sale rolled back)
//!   │
//!   ├── for each line: read the stored unit price (inside the transaction)
//!   │     subtotal = qty × price,   total = Σ subtotal
//!   │
//!   ├── INSERT sale (total)
//!   ├── INSERT line items + movements (subtract, reason "sale:<id>")
//!   │
//! commit
//! ```
//!
//! Writing stock first means every transaction starts with a write, so the
//! prices it reads afterwards are the ones it commits against.

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::{debug, info};

use crate::api::{CompleteSaleRequest, SaleReceipt};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::store::LedgerStore;
use crate::types::{MovementCause, NewSale, NewStockMovement, SaleLineItem, StockOperation};
use crate::validation::validate_checkout;

/// A cart line after validation, with the product id trimmed.
struct Line<'a> {
    product_id: &'a str,
    quantity: i64,
}

/// Completes a sale.
///
/// Prices always come from the store; the request carries only product ids
/// and quantities. On any error nothing is persisted.
///
/// ## Errors
/// - [`CoreError::Validation`] for a malformed request (no store access)
/// - [`CoreError::ProductNotFound`] / [`CoreError::InsufficientStock`] from
///   the read-only pass
/// - [`CoreError::ConcurrentModification`] if stock moved before the commit
/// - [`CoreError::Store`] for backend failures
pub async fn complete_sale<S>(store: &S, request: &CompleteSaleRequest) -> CoreResult<SaleReceipt>
where
    S: LedgerStore + ?Sized,
{
    validate_checkout(request.worker_id, &request.payment_method, &request.items)?;

    let lines: Vec<Line<'_>> = request
        .items
        .iter()
        .map(|item| Line {
            product_id: item.product_id.trim(),
            quantity: item.quantity,
        })
        .collect();

    debug!(
        worker_id = request.worker_id,
        lines = lines.len(),
        payment_method = %request.payment_method,
        "Completing sale"
    );

    let quoted = check_availability(store, &lines).await?;

    // Phase 2: everything below is one atomic unit.
    let mut tx = store.begin().await?;

    for line in &lines {
        let affected = tx
            .conditional_adjust_stock(line.product_id, -line.quantity)
            .await?;
        if affected == 0 {
            return Err(CoreError::ConcurrentModification {
                product_id: line.product_id.to_string(),
            });
        }
    }

    let mut priced = Vec::with_capacity(lines.len());
    let mut total = Money::zero();
    for line in &lines {
        let product = tx.find_active_by_id(line.product_id).await?.ok_or_else(|| {
            CoreError::ConcurrentModification {
                product_id: line.product_id.to_string(),
            }
        })?;
        let unit_price = product.unit_price();
        let subtotal = unit_price
            .checked_mul(line.quantity)
            .ok_or_else(|| overflow(line.product_id))?;
        total = total
            .checked_add(subtotal)
            .ok_or_else(|| overflow(line.product_id))?;
        priced.push((line, unit_price, subtotal));
    }

    if total != quoted {
        debug!(quoted = %quoted, committed = %total, "Price changed between check and commit");
    }

    let created_at = Utc::now();
    let sale_id = tx
        .insert_sale(&NewSale {
            worker_id: request.worker_id,
            total: total.cents(),
            payment_method: request.payment_method.trim().to_string(),
            received_amount: request.received_amount,
            created_at,
        })
        .await?;

    for (line, unit_price, subtotal) in priced {
        tx.insert_sale_line_item(&SaleLineItem {
            sale_id,
            product_id: line.product_id.to_string(),
            quantity: line.quantity,
            unit_price: unit_price.cents(),
            subtotal: subtotal.cents(),
        })
        .await?;

        tx.insert_stock_movement(&NewStockMovement {
            product_id: line.product_id.to_string(),
            worker_id: request.worker_id,
            operation: StockOperation::Subtract,
            quantity: line.quantity,
            cause: MovementCause::Sale { sale_id },
            created_at,
        })
        .await?;
    }

    tx.commit().await?;

    info!(sale_id, total = %total, worker_id = request.worker_id, "Sale completed");

    Ok(SaleReceipt {
        sale_id,
        total: total.cents(),
    })
}

/// Read-only pass over the cart.
///
/// Quantities for the same product are summed before comparing with stock,
/// so a cart that lists one product twice cannot take more than the shelf
/// holds. Returns the total at current prices.
async fn check_availability<S>(store: &S, lines: &[Line<'_>]) -> CoreResult<Money>
where
    S: LedgerStore + ?Sized,
{
    let mut requested: BTreeMap<&str, i64> = BTreeMap::new();
    for line in lines {
        let entry = requested.entry(line.product_id).or_insert(0);
        *entry = entry
            .checked_add(line.quantity)
            .ok_or_else(|| overflow(line.product_id))?;
    }

    let mut quoted = Money::zero();
    for line in lines {
        let product = store
            .find_active_by_id(line.product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(line.product_id.to_string()))?;

        let wanted = requested.get(line.product_id).copied().unwrap_or(line.quantity);
        if !product.can_fulfil(wanted) {
            return Err(CoreError::InsufficientStock {
                product_id: product.id,
                available: product.stock,
                requested: wanted,
            });
        }

        let subtotal = product
            .unit_price()
            .checked_mul(line.quantity)
            .ok_or_else(|| overflow(line.product_id))?;
        quoted = quoted
            .checked_add(subtotal)
            .ok_or_else(|| overflow(line.product_id))?;
    }

    Ok(quoted)
}

fn overflow(product_id: &str) -> CoreError {
    CoreError::AmountOverflow {
        product_id: product_id.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
