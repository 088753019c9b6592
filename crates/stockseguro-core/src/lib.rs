//! # stockseguro-core: Sale and Stock Logic for Stock Seguro
//!
//! This crate holds everything that decides whether a sale or a stock
//! adjustment may happen, and what gets recorded when it does. It never
//! touches a database directly: the engines work against the
//! [`store::LedgerStore`] contract, implemented by `stockseguro-db` for
//! SQLite and by [`memory::MemoryStore`] in-process.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Stock Seguro Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Presentation (React, out of this repo)             │   │
//! │  │    Product search ──► Cart ──► Payment ──► Stock entry          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ request / Outcome envelopes            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            ★ stockseguro-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌────────────┐  ┌─────────┐   │   │
//! │  │   │  service  │  │   engine   │  │ validation │  │  money  │   │   │
//! │  │   │ PosService│─►│ SaleEngine │  │   rules    │  │  Money  │   │   │
//! │  │   │ Outcome   │  │ Adjustment │  └────────────┘  └─────────┘   │   │
//! │  │   └───────────┘  │ Catalog    │                                 │   │
//! │  │                  └─────┬──────┘                                 │   │
//! │  │                        │ LedgerStore / StoreTransaction         │   │
//! │  └────────────────────────┼────────────────────────────────────────┘   │
//! │                           ▼                                             │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │     stockseguro-db (SQLite)   │   memory::MemoryStore (tests)   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Products, workers, sales, line items, stock movements
//! - [`money`] - Integer money in minor currency units
//! - [`error`] - Validation, business-rule, store and auth errors
//! - [`validation`] - Request shape checks run before any store access
//! - [`store`] - The catalog/ledger contracts the engines consume
//! - [`engine`] - Sale completion, stock adjustment, catalog maintenance
//! - [`history`] - Paging and feed merging for the read-only history views
//! - [`api`] - Request/response envelopes for the presentation layer
//! - [`service`] - Boundary that turns engine results into envelopes
//! - [`memory`] - In-memory store implementation
//!
//! ## Example Usage
//!
//! ```rust
//! use stockseguro_core::money::Money;
//!
//! let unit_price = Money::from_cents(2500);
//! let line = unit_price.checked_mul(3).unwrap();
//! assert_eq!(line.cents(), 7500);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod api;
pub mod engine;
pub mod error;
pub mod history;
pub mod memory;
pub mod money;
pub mod service;
pub mod store;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{AuthError, CoreError, CoreResult, StoreError, StoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default number of rows per history page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound on rows per history page, whatever the caller asks for.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Maximum number of lines in a single cart.
///
/// ## Business Reason
/// A counter sale in a liquor store never gets near this; anything larger
/// is a client bug and would hold the write lock for too long.
pub const MAX_CART_LINES: usize = 100;

/// Prefix of the reason recorded on stock movements caused by a sale.
///
/// A sale with id 42 logs its decrements with reason `sale:42`.
pub const SALE_REASON_PREFIX: &str = "sale:";

/// Display glyph used when a product is created without one.
pub const DEFAULT_PRODUCT_IMAGE: &str = "📦";
