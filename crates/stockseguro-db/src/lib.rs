//! # stockseguro-db: SQLite Store for Stock Seguro
//!
//! SQLite persistence for the POS core: the [`stockseguro_core::store`]
//! contracts, worker identity and the history screens, over sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Stock Seguro Data Flow                             │
//! │                                                                         │
//! │  PosService<Database>::complete_sale(request)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                stockseguro-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo    │    │ 001 catalog  │  │   │
//! │  │   │ SqlitePool    │◄───│ LedgerRepo     │    │ 002 ledger   │  │   │
//! │  │   │ store.rs impl │    │ WorkerRepo     │    │              │  │   │
//! │  │   │               │    │ HistoryRepo    │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  │   ~/.local/share/pos/stockseguro.db                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Products, ledger transactions, workers, history
//! - [`store`] - `CatalogStore` / `LedgerStore` for [`Database`]
//! - [`catalog`] - Demo catalog seeding
//! - [`config`] - Environment-driven startup settings
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stockseguro_core::service::PosService;
//! use stockseguro_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/stockseguro.db")).await?;
//! let session = db.workers().authenticate("kevin@demo.com", "1234").await?;
//!
//! let service = PosService::new(Arc::new(db));
//! let outcome = service.complete_sale(&request).await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{DemoWorker, StoreConfig};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::{
    HistoryRepository, LedgerRepository, LedgerTransaction, ProductRepository, WorkerRepository,
};
