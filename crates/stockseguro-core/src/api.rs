//! # API Envelopes
//!
//! Request and response shapes exchanged with the presentation layer.
//!
//! ## Response Envelope
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every public operation answers with an Outcome, never a panic or an   │
//! │  error crossing the boundary.                                           │
//! │                                                                         │
//! │  success: { "ok": true,  "saleId": 12, "total": 56000 }                 │
//! │  failure: { "ok": false, "error": "Cart is empty",                     │
//! │             "code": "VALIDATION_ERROR" }                                │
//! │                                                                         │
//! │  CoreError ──► ApiError { code, message } ──► Outcome::failure          │
//! │     │                                                                   │
//! │     └── store faults are logged here and replaced by a generic message  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use ts_rs::TS;

use crate::error::{AuthError, CoreError, StoreError};
use crate::types::{Product, WorkerSession};

// =============================================================================
// Requests
// =============================================================================

/// One line of a cart as the client submits it.
///
/// Only the product and the quantity are accepted. Any price the client
/// sends along is ignored; totals are computed from stored prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    pub product_id: String,
    pub quantity: i64,
}

/// Sale completion request.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CompleteSaleRequest {
    pub worker_id: i64,
    pub payment_method: String,
    #[serde(default)]
    pub received_amount: Option<i64>,
    pub items: Vec<CartLine>,
}

/// Manual stock adjustment request.
///
/// `operation` stays a string here so that an unknown tag is reported as a
/// validation error instead of a deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AdjustStockRequest {
    pub worker_id: i64,
    pub product_id: String,
    pub operation: String,
    pub quantity: i64,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Login request.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub pin: String,
}

// =============================================================================
// Success Payloads
// =============================================================================

/// What a completed sale reports back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleReceipt {
    pub sale_id: i64,
    /// Committed total, equal to the sum of the stored line subtotals.
    pub total: i64,
}

/// What a committed adjustment reports back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockLevel {
    pub new_stock: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductList {
    pub products: Vec<Product>,
}

/// Barcode lookup result; `product` is absent when nothing matched.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductFound {
    pub product: Option<Product>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SignedIn {
    pub user: WorkerSession,
}

/// Empty success payload (soft delete, update).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Done {}

// =============================================================================
// Errors
// =============================================================================

/// Error handed to the presentation layer.
///
/// ```json
/// { "code": "INSUFFICIENT_STOCK", "message": "Insufficient stock for ..." }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ErrorCode {
    /// Malformed request, rejected before any store access
    ValidationError,

    /// Product does not exist or is inactive
    NotFound,

    /// Not enough units on the shelf
    InsufficientStock,

    /// Other business rule (duplicate id or barcode)
    BusinessLogic,

    /// Login refused
    Unauthorized,

    /// Store fault
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    fn from_store(err: StoreError) -> Self {
        // Log the backend detail, hand out a generic message
        error!(error = %err, "Store operation failed");
        ApiError::internal("Internal error, please try again")
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
            CoreError::ProductNotFound(_) => ApiError::new(ErrorCode::NotFound, err.to_string()),
            CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            CoreError::DuplicateProduct { .. }
            | CoreError::BarcodeTaken { .. }
            | CoreError::AmountOverflow { .. } => {
                ApiError::new(ErrorCode::BusinessLogic, err.to_string())
            }
            CoreError::ConcurrentModification { ref product_id } => {
                warn!(product_id = %product_id, "Commit aborted after a concurrent stock change");
                ApiError::internal(
                    "Stock changed while the operation was saving. Nothing was recorded, please try again.",
                )
            }
            CoreError::Store(e) => ApiError::from_store(e),
        }
    }
}

/// Converts login errors to API errors.
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingEmail | AuthError::MissingPin => ApiError::validation(err.to_string()),
            AuthError::InvalidCredentials | AuthError::Inactive => {
                ApiError::new(ErrorCode::Unauthorized, err.to_string())
            }
            AuthError::Store(e) => ApiError::from_store(e),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Outcome Envelope
// =============================================================================

/// `{ "ok": true, ...payload }` or `{ "ok": false, "error", "code" }`.
///
/// The payload is flattened into the envelope, so `T` must serialize as a
/// map (a struct with named fields).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome<T> {
    pub ok: bool,

    #[serde(flatten)]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
}

impl<T> Outcome<T> {
    pub fn success(data: T) -> Self {
        Outcome {
            ok: true,
            data: Some(data),
            error: None,
            code: None,
        }
    }

    pub fn failure(err: ApiError) -> Self {
        Outcome {
            ok: false,
            data: None,
            error: Some(err.message),
            code: Some(err.code),
        }
    }

    /// Folds any result whose error converts into an [`ApiError`].
    pub fn from_result<E: Into<ApiError>>(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Outcome::success(data),
            Err(e) => Outcome::failure(e.into()),
        }
    }

    /// Success payload, if any.
    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
