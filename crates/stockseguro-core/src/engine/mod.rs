//! # Engines
//!
//! The only code paths that mutate the catalog or the ledger.
//!
//! ## Two-Phase Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  request ──► validation (pure) ──► phase 1: read-only checks            │
//! │                                      find_active_by_id, stock >= qty    │
//! │                                            │                            │
//! │                                            ▼                            │
//! │                               phase 2: one StoreTransaction             │
//! │                                 conditional stock update FIRST          │
//! │                                 (0 rows ⇒ ConcurrentModification)       │
//! │                                 then ledger rows, then commit           │
//! │                                                                         │
//! │  Any error before commit drops the transaction: nothing is recorded.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Phase 1 reads may be stale by the time phase 2 runs. Nothing inside the
//! transaction relies on them; the conditional update re-checks both the
//! active flag and the stock floor.

pub mod adjustment;
pub mod catalog;
pub mod sale;

pub use adjustment::adjust_stock;
pub use sale::complete_sale;
