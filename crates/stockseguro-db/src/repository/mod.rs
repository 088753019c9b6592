//! # Repository Module
//!
//! SQL for Stock Seguro, one repository per concern.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Engines (stockseguro-core)                                             │
//! │       │  CatalogStore / LedgerStore                                     │
//! │       ▼                                                                 │
//! │  Database (store.rs) ──► ProductRepository   products                   │
//! │                     └──► LedgerRepository    BEGIN … COMMIT             │
//! │                              └── LedgerTransaction                      │
//! │                                   conditional stock update, sales,      │
//! │                                   line items, movements                 │
//! │                                                                         │
//! │  Login ────────────────► WorkerRepository    workers (argon2)           │
//! │  History screens ──────► HistoryRepository   read-only, paged           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`] - Catalog lookups and edits
//! - [`LedgerRepository`] - Transactions over stock and the ledger tables
//! - [`WorkerRepository`] - Worker registration and login
//! - [`HistoryRepository`] - Sales log, stock log, unified feed

pub mod history;
pub mod ledger;
pub mod product;
pub mod worker;

pub use history::HistoryRepository;
pub use ledger::{LedgerRepository, LedgerTransaction};
pub use product::ProductRepository;
pub use worker::WorkerRepository;
