//! # Validation Module
//!
//! Request shape checks for Stock Seguro.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (React)                                             │
//! │  └── Disables the pay button on an empty cart, trims inputs            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (no store access)                                │
//! │  ├── blank ids, non-positive quantities, empty cart                    │
//! │  ├── operation tag must be `add` or `subtract`                         │
//! │  └── subtract needs a non-blank reason                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Engines (read the store)                                     │
//! │  └── product exists and is active, enough stock                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: Database (SQLite)                                            │
//! │  └── CHECK (stock >= 0), UNIQUE, FOREIGN KEY                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is synchronous and pure: a request rejected by this
//! module has never touched the store.

use crate::api::CartLine;
use crate::error::ValidationError;
use crate::types::{NewProduct, ProductUpdate, StockOperation};
use crate::{MAX_CART_LINES, SALE_REASON_PREFIX};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// A validated manual adjustment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedAdjustment {
    pub operation: StockOperation,
    /// Trimmed reason; always `Some` for a subtract.
    pub reason: Option<String>,
}

// =============================================================================
// Field Validators
// =============================================================================

/// The identity collaborator hands us an authenticated id; zero means none.
pub fn validate_worker_id(worker_id: i64) -> ValidationResult<()> {
    if worker_id <= 0 {
        return Err(ValidationError::must_be_positive("worker id"));
    }
    Ok(())
}

/// Non-blank after trimming.
///
/// ## Example
/// ```rust
/// use stockseguro_core::validation::validate_required;
///
/// assert!(validate_required("product id", "7702116011239").is_ok());
/// assert!(validate_required("product id", "   ").is_err());
/// ```
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

/// Quantities are whole units and strictly positive.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::must_be_positive("quantity"));
    }
    Ok(())
}

fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Request Validators
// =============================================================================

/// Validates a checkout before any product is looked up.
///
/// ## Rules
/// - worker id is positive
/// - payment method is not blank
/// - cart has between 1 and [`MAX_CART_LINES`] lines
/// - every line has a product id and a positive quantity
pub fn validate_checkout(
    worker_id: i64,
    payment_method: &str,
    items: &[CartLine],
) -> ValidationResult<()> {
    validate_worker_id(worker_id)?;
    validate_required("payment method", payment_method)?;

    if items.is_empty() {
        return Err(ValidationError::EmptyCart);
    }
    if items.len() > MAX_CART_LINES {
        return Err(ValidationError::CartTooLarge {
            max: MAX_CART_LINES,
        });
    }

    for line in items {
        validate_required("product id", &line.product_id)?;
        validate_quantity(line.quantity)?;
    }

    Ok(())
}

/// Validates a manual adjustment and parses its operation tag.
///
/// A subtract without a non-blank reason is rejected: the movement log has
/// to tell breakage and miscounts apart from sales. For the same reason a
/// manual reason may not start with [`SALE_REASON_PREFIX`].
pub fn validate_adjustment(
    worker_id: i64,
    product_id: &str,
    operation: &str,
    quantity: i64,
    reason: Option<&str>,
) -> ValidationResult<CheckedAdjustment> {
    validate_worker_id(worker_id)?;
    validate_required("product id", product_id)?;
    let operation: StockOperation = operation.parse()?;
    validate_quantity(quantity)?;

    let reason = reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string);

    match operation {
        StockOperation::Subtract if reason.is_none() => Err(ValidationError::ReasonRequired),
        StockOperation::Subtract if reason.as_deref().is_some_and(is_sale_reason) => {
            Err(ValidationError::ReservedReason {
                prefix: SALE_REASON_PREFIX.to_string(),
            })
        }
        StockOperation::Subtract => Ok(CheckedAdjustment { operation, reason }),
        // Restocks never carry a reason.
        StockOperation::Add => Ok(CheckedAdjustment {
            operation,
            reason: None,
        }),
    }
}

fn is_sale_reason(reason: &str) -> bool {
    reason
        .get(..SALE_REASON_PREFIX.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(SALE_REASON_PREFIX))
}

/// Validates a product about to be created.
pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_required("id", &product.id)?;
    validate_required("barcode", &product.barcode)?;
    validate_required("name", &product.name)?;
    validate_required("category", &product.category)?;
    if product.unit_price <= 0 {
        return Err(ValidationError::must_be_positive("unit price"));
    }
    validate_non_negative("box price", product.box_price)?;
    validate_non_negative("stock", product.stock)?;
    validate_non_negative("min stock", product.min_stock)?;
    Ok(())
}

/// Validates a product edit.
pub fn validate_product_update(update: &ProductUpdate) -> ValidationResult<()> {
    validate_required("id", &update.id)?;
    validate_required("barcode", &update.barcode)?;
    validate_required("name", &update.name)?;
    validate_required("category", &update.category)?;
    if update.unit_price <= 0 {
        return Err(ValidationError::must_be_positive("unit price"));
    }
    validate_non_negative("box price", update.box_price)?;
    validate_non_negative("min stock", update.min_stock)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: &str, quantity: i64) -> CartLine {
        CartLine {
            product_id: product_id.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_checkout_rejects_bad_shape() {
        assert_eq!(
            validate_checkout(0, "efectivo", &[line("P", 1)]),
            Err(ValidationError::must_be_positive("worker id"))
        );
        assert_eq!(
            validate_checkout(1, "  ", &[line("P", 1)]),
            Err(ValidationError::required("payment method"))
        );
        assert_eq!(
            validate_checkout(1, "efectivo", &[]),
            Err(ValidationError::EmptyCart)
        );
        assert_eq!(
            validate_checkout(1, "efectivo", &[line("P", 1), line("", 2)]),
            Err(ValidationError::required("product id"))
        );
        assert_eq!(
            validate_checkout(1, "efectivo", &[line("P", 0)]),
            Err(ValidationError::must_be_positive("quantity"))
        );
        assert!(validate_checkout(1, "tarjeta", &[line("P", 3)]).is_ok());
    }

    #[test]
    fn test_checkout_line_limit() {
        let items: Vec<CartLine> = (0..=MAX_CART_LINES).map(|i| line(&i.to_string(), 1)).collect();
        assert_eq!(
            validate_checkout(1, "efectivo", &items),
            Err(ValidationError::CartTooLarge {
                max: MAX_CART_LINES
            })
        );
    }

    #[test]
    fn test_subtract_requires_reason() {
        assert_eq!(
            validate_adjustment(1, "P", "subtract", 1, None),
            Err(ValidationError::ReasonRequired)
        );
        assert_eq!(
            validate_adjustment(1, "P", "subtract", 1, Some("   ")),
            Err(ValidationError::ReasonRequired)
        );

        let checked = validate_adjustment(1, "P", "subtract", 1, Some("  Botella rota ")).unwrap();
        assert_eq!(checked.operation, StockOperation::Subtract);
        assert_eq!(checked.reason.as_deref(), Some("Botella rota"));
    }

    #[test]
    fn test_subtract_reason_cannot_look_like_a_sale() {
        for reason in ["sale:7", "  SALE:12 ", "sale:"] {
            assert_eq!(
                validate_adjustment(1, "P", "subtract", 1, Some(reason)),
                Err(ValidationError::ReservedReason {
                    prefix: SALE_REASON_PREFIX.to_string()
                })
            );
        }

        let checked = validate_adjustment(1, "P", "subtract", 1, Some("venta anulada: sale:7")).unwrap();
        assert_eq!(checked.reason.as_deref(), Some("venta anulada: sale:7"));
    }

    #[test]
    fn test_add_needs_no_reason() {
        let checked = validate_adjustment(1, "P", "add", 5, None).unwrap();
        assert_eq!(checked.operation, StockOperation::Add);
        assert_eq!(checked.reason, None);
    }

    #[test]
    fn test_adjustment_rejects_unknown_operation() {
        let err = validate_adjustment(1, "P", "transfer", 5, None).unwrap_err();
        assert!(matches!(err, ValidationError::NotAllowed { .. }));
    }

    #[test]
    fn test_new_product_rules() {
        let mut product = NewProduct {
            id: "7702116011239".to_string(),
            barcode: "7702116011239".to_string(),
            name: "Aguardiente Antioqueño 750ml".to_string(),
            category: "Licores".to_string(),
            unit_price: 28000,
            box_price: 280000,
            stock: 45,
            min_stock: 10,
            image: None,
        };
        assert!(validate_new_product(&product).is_ok());

        product.unit_price = 0;
        assert_eq!(
            validate_new_product(&product),
            Err(ValidationError::must_be_positive("unit price"))
        );

        product.unit_price = 28000;
        product.stock = -1;
        assert!(matches!(
            validate_new_product(&product),
            Err(ValidationError::MustNotBeNegative { .. })
        ));
    }
}
