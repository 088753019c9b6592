//! # Error Types
//!
//! Error taxonomy for the sale and stock core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  ValidationError  - request shape (blank id, qty <= 0, no reason)      │
//! │       │              rejected before any store access                   │
//! │       ▼                                                                 │
//! │  CoreError        - business rules (not found, insufficient stock,     │
//! │       │              duplicate barcode), concurrency loss, store faults │
//! │       ▼                                                                 │
//! │  ApiError (api)   - what the presentation layer sees                   │
//! │                                                                         │
//! │  StoreError       - backend failure surfaced through the store traits  │
//! │  AuthError        - login failures (identity collaborator)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors produced by the engines.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product id does not resolve to an active product.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Requested quantity is larger than what is on the shelf.
    ///
    /// ## When This Occurs
    /// - A cart asks for more units than `stock`
    /// - A manual subtraction would take stock below zero
    #[error("Insufficient stock for {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// Another product already uses the id or barcode.
    #[error("A product with id '{id}' or barcode '{barcode}' already exists")]
    DuplicateProduct { id: String, barcode: String },

    /// Barcode is used by a different product.
    #[error("Barcode '{barcode}' is already used by another product")]
    BarcodeTaken { barcode: String },

    /// A conditional stock update inside the commit touched zero rows.
    ///
    /// The input was valid when checked; stock or the active flag moved
    /// underneath us. The whole transaction has been rolled back and the
    /// operation can be retried from scratch.
    #[error("Stock for {product_id} changed while the operation was committing")]
    ConcurrentModification { product_id: String },

    /// Price × quantity does not fit in an i64.
    #[error("Amount out of range for {product_id}")]
    AmountOverflow { product_id: String },

    /// Input validation failed.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The store failed underneath the engine.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl CoreError {
    /// True when the caller may resubmit the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CoreError::ConcurrentModification { .. } | CoreError::Store(StoreError::Unavailable(_))
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or more.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Value is not in the allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Cart has no lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// Cart exceeds the line limit.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Subtractions need a reason for the audit log.
    #[error("Please enter a short reason for the stock deduction")]
    ReasonRequired,

    /// Reason uses the prefix reserved for sale decrements.
    #[error("The reason cannot start with '{prefix}'")]
    ReservedReason { prefix: String },
}

impl ValidationError {
    /// Creates a Required error.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Creates a MustBePositive error.
    pub fn must_be_positive(field: impl Into<String>) -> Self {
        ValidationError::MustBePositive {
            field: field.into(),
        }
    }
}

// =============================================================================
// Store Error
// =============================================================================

/// Failures reported by a store implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Backend could not be reached (pool closed, exhausted, file missing).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A uniqueness constraint rejected the write.
    #[error("conflicting row: {0}")]
    Conflict(String),

    /// Anything else the backend reported.
    #[error("backend failure: {0}")]
    Backend(String),
}

// =============================================================================
// Auth Error
// =============================================================================

/// Login failures.
///
/// Unknown email and wrong PIN both map to `InvalidCredentials`.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Please enter your email")]
    MissingEmail,

    #[error("Please enter your PIN")]
    MissingPin,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User is inactive")]
    Inactive,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type for store contract methods.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
