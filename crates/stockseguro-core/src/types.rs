//! # Domain Types
//!
//! Catalog, identity and ledger records.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Catalog (owned by the catalog store)                                  │
//! │  ┌─────────────────┐                                                    │
//! │  │    Product      │◄─────────────┬──────────────────┐                 │
//! │  │  id / barcode   │              │ product_id (FK)  │                 │
//! │  │  unit_price     │              │                  │                 │
//! │  │  stock, active  │   ┌──────────┴──────┐  ┌────────┴────────┐        │
//! │  └─────────────────┘   │  SaleLineItem   │  │  StockMovement  │        │
//! │                        │  unit_price     │  │  operation      │        │
//! │  Ledger (append-only)  │  (snapshot)     │  │  cause          │        │
//! │  ┌─────────────────┐   └──────────┬──────┘  └────────┬────────┘        │
//! │  │      Sale       │◄─────────────┘ sale_id          │ worker_id       │
//! │  │  total (Σ)      │                                 │                 │
//! │  └────────┬────────┘                                 │                 │
//! │           │ worker_id                                │                 │
//! │           ▼                                          ▼                 │
//! │  ┌─────────────────────────────────────────────────────────────┐       │
//! │  │                         Worker                              │       │
//! │  └─────────────────────────────────────────────────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Foreign keys are references, never ownership: products are soft-deleted
//! so historical sales and movements keep resolving.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::SALE_REASON_PREFIX;

// =============================================================================
// Product
// =============================================================================

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Stable identifier (usually the EAN barcode the product shipped with).
    pub id: String,

    /// Scanner lookup key, unique across active and inactive products.
    pub barcode: String,

    pub name: String,

    pub category: String,

    /// Price of a single unit, minor currency units.
    pub unit_price: i64,

    /// Price of a full box, minor currency units.
    pub box_price: i64,

    /// Units on the shelf. Never negative.
    pub stock: i64,

    /// Informational low-stock threshold.
    pub min_stock: i64,

    /// Display glyph.
    pub image: String,

    /// False once soft-deleted.
    pub active: bool,
}

impl Product {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price)
    }

    /// Whether `quantity` units can leave the shelf right now.
    #[inline]
    pub fn can_fulfil(&self, quantity: i64) -> bool {
        self.active && self.stock >= quantity
    }

    /// Shelf status used by the stock monitor.
    pub fn stock_status(&self) -> StockStatus {
        if self.stock <= 0 {
            StockStatus::OutOfStock
        } else if self.stock <= self.min_stock {
            StockStatus::Low
        } else {
            StockStatus::Healthy
        }
    }
}

/// Shelf status of a product relative to its `min_stock`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum StockStatus {
    /// Nothing left.
    OutOfStock,
    /// `0 < stock <= min_stock`.
    Low,
    Healthy,
}

/// Payload for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewProduct {
    pub id: String,
    pub barcode: String,
    pub name: String,
    pub category: String,
    pub unit_price: i64,
    pub box_price: i64,
    pub stock: i64,
    pub min_stock: i64,
    #[serde(default)]
    pub image: Option<String>,
}

/// Payload for editing a product.
///
/// No stock field: every stock change goes through the
/// adjustment engine so it lands in the movement log.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductUpdate {
    pub id: String,
    pub barcode: String,
    pub name: String,
    pub category: String,
    pub unit_price: i64,
    pub box_price: i64,
    pub min_stock: i64,
    #[serde(default)]
    pub image: Option<String>,
}

// =============================================================================
// Worker
// =============================================================================

/// A registered store worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Worker {
    pub id: i64,
    /// National id, the legacy login key.
    pub rut: String,
    pub name: String,
    /// Login key, unique case-insensitively.
    pub email: String,
    pub active: bool,
}

/// The identity handed to the presentation layer after a login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct WorkerSession {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub rut: String,
}

impl From<Worker> for WorkerSession {
    fn from(worker: Worker) -> Self {
        WorkerSession {
            id: worker.id,
            name: worker.name,
            email: worker.email,
            rut: worker.rut,
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A completed sale. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Sale {
    pub id: i64,
    pub worker_id: i64,
    /// Σ line subtotals, computed from stored prices.
    pub total: i64,
    /// Free-form label ("efectivo", "tarjeta", ...).
    pub payment_method: String,
    /// Cash handed over by the customer, if recorded.
    pub received_amount: Option<i64>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Row written for a new sale; the id comes back from the store.
#[derive(Debug, Clone)]
pub struct NewSale {
    pub worker_id: i64,
    pub total: i64,
    pub payment_method: String,
    pub received_amount: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// One product line of a sale.
///
/// `unit_price` is a snapshot taken inside the commit; later catalog price
/// changes never reach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleLineItem {
    pub sale_id: i64,
    pub product_id: String,
    pub quantity: i64,
    pub unit_price: i64,
    /// `quantity × unit_price`.
    pub subtotal: i64,
}

// =============================================================================
// Stock Movements
// =============================================================================

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum StockOperation {
    Add,
    Subtract,
}

impl StockOperation {
    /// Wire tag: `add` or `subtract`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            StockOperation::Add => "add",
            StockOperation::Subtract => "subtract",
        }
    }

    /// Signed stock delta for `quantity` units.
    #[inline]
    pub const fn delta(&self, quantity: i64) -> i64 {
        match self {
            StockOperation::Add => quantity,
            StockOperation::Subtract => -quantity,
        }
    }
}

impl fmt::Display for StockOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StockOperation {
    type Err = ValidationError;

    /// Accepts exactly `add` or `subtract` (surrounding whitespace ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "add" => Ok(StockOperation::Add),
            "subtract" => Ok(StockOperation::Subtract),
            _ => Err(ValidationError::NotAllowed {
                field: "operation".to_string(),
                allowed: vec!["add".to_string(), "subtract".to_string()],
            }),
        }
    }
}

/// Why a movement happened.
///
/// ## Persistence
/// ```text
/// Sale { sale_id: 42 }       ──►  reason = "sale:42"
/// Manual { reason: "Rota" }  ──►  reason = "Rota"
/// Restock                    ──►  reason = NULL
/// ```
/// The string form is what the `reason` column holds; [`MovementCause::from_stored`]
/// turns it back into the typed variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "camelCase")]
#[ts(export)]
pub enum MovementCause {
    /// Decrement written by a completed sale.
    Sale {
        #[serde(rename = "saleId")]
        sale_id: i64,
    },
    /// Manual subtraction (breakage, loss, miscount).
    Manual { reason: String },
    /// Manual addition.
    Restock,
}

impl MovementCause {
    /// Value stored in the `reason` column.
    pub fn stored_reason(&self) -> Option<String> {
        match self {
            MovementCause::Sale { sale_id } => Some(format!("{}{}", SALE_REASON_PREFIX, sale_id)),
            MovementCause::Manual { reason } => Some(reason.clone()),
            MovementCause::Restock => None,
        }
    }

    /// Rebuilds the cause from a stored row.
    ///
    /// A subtract whose reason is `sale:<digits>` is a sale; any other
    /// reason is manual. An add without a reason is a restock.
    pub fn from_stored(operation: StockOperation, reason: Option<&str>) -> Self {
        match (operation, reason) {
            (_, None) => MovementCause::Restock,
            (StockOperation::Subtract, Some(text)) => text
                .strip_prefix(SALE_REASON_PREFIX)
                .and_then(|id| id.parse::<i64>().ok())
                .map(|sale_id| MovementCause::Sale { sale_id })
                .unwrap_or_else(|| MovementCause::Manual {
                    reason: text.to_string(),
                }),
            (StockOperation::Add, Some(text)) => MovementCause::Manual {
                reason: text.to_string(),
            },
        }
    }
}

/// A logged stock change. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockMovement {
    pub id: i64,
    pub product_id: String,
    pub worker_id: i64,
    pub operation: StockOperation,
    pub quantity: i64,
    pub reason: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl StockMovement {
    pub fn cause(&self) -> MovementCause {
        MovementCause::from_stored(self.operation, self.reason.as_deref())
    }
}

/// Row written for a new movement.
#[derive(Debug, Clone)]
pub struct NewStockMovement {
    pub product_id: String,
    pub worker_id: i64,
    pub operation: StockOperation,
    pub quantity: i64,
    pub cause: MovementCause,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Timestamps
// =============================================================================

/// Formats a timestamp the way the ledger stores it.
///
/// Fixed width (`2026-10-19T14:03:07.125Z`) so that text ordering in SQL
/// matches chronological ordering.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn product(stock: i64, min_stock: i64) -> Product {
        Product {
            id: "7702259001234".to_string(),
            barcode: "7702259001234".to_string(),
            name: "Cerveza Poker Lata 330ml".to_string(),
            category: "Cervezas".to_string(),
            unit_price: 2500,
            box_price: 60000,
            stock,
            min_stock,
            image: "🍺".to_string(),
            active: true,
        }
    }

    #[test]
    fn test_stock_status() {
        assert_eq!(product(0, 10).stock_status(), StockStatus::OutOfStock);
        assert_eq!(product(10, 10).stock_status(), StockStatus::Low);
        assert_eq!(product(11, 10).stock_status(), StockStatus::Healthy);
    }

    #[test]
    fn test_can_fulfil_respects_active_flag() {
        let mut p = product(3, 1);
        assert!(p.can_fulfil(3));
        assert!(!p.can_fulfil(4));
        p.active = false;
        assert!(!p.can_fulfil(1));
    }

    #[test]
    fn test_operation_parsing() {
        assert_eq!("add".parse::<StockOperation>(), Ok(StockOperation::Add));
        assert_eq!(" subtract ".parse::<StockOperation>(), Ok(StockOperation::Subtract));
        assert!("remove".parse::<StockOperation>().is_err());
        assert!("ADD".parse::<StockOperation>().is_err());
        assert_eq!(StockOperation::Subtract.delta(4), -4);
    }

    #[test]
    fn test_movement_cause_round_trip_through_reason_column() {
        let sale = MovementCause::Sale { sale_id: 42 };
        assert_eq!(sale.stored_reason().as_deref(), Some("sale:42"));
        assert_eq!(
            MovementCause::from_stored(StockOperation::Subtract, Some("sale:42")),
            sale
        );

        assert_eq!(
            MovementCause::from_stored(StockOperation::Subtract, Some("sale: botella rota")),
            MovementCause::Manual {
                reason: "sale: botella rota".to_string()
            }
        );
        assert_eq!(
            MovementCause::from_stored(StockOperation::Add, None),
            MovementCause::Restock
        );
        assert_eq!(MovementCause::Restock.stored_reason(), None);
    }

    #[test]
    fn test_movement_cause_json_shape() {
        let json = serde_json::to_value(MovementCause::Sale { sale_id: 7 }).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "sale", "saleId": 7 }));
    }

    #[test]
    fn test_timestamp_format_is_fixed_width() {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 14, 3, 7).unwrap();
        assert_eq!(format_timestamp(&at), "2026-10-19T14:03:07.000Z");
    }
}
