//! # Store Contracts
//!
//! The persistence surface the engines consume.
//!
//! ## Contract Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CatalogStore          point lookups, existence checks, catalog edits   │
//! │       ▲                (each call is its own atomic unit)               │
//! │       │                                                                 │
//! │  LedgerStore           begin() ──► Box<dyn StoreTransaction>            │
//! │                                        │                                │
//! │                                        ├── conditional_adjust_stock     │
//! │                                        ├── insert_sale / line items     │
//! │                                        ├── insert_stock_movement        │
//! │                                        └── commit()  (drop = rollback)  │
//! │                                                                         │
//! │  Implementations: stockseguro-db::Database (SQLite)                     │
//! │                   memory::MemoryStore (in-process)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A transaction must isolate its writes from every other transaction until
//! `commit` returns, and must discard them if it is dropped first.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::{NewSale, NewStockMovement, Product, ProductUpdate, SaleLineItem};

/// Product catalog access.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Active product by id.
    async fn find_active_by_id(&self, id: &str) -> StoreResult<Option<Product>>;

    /// Active product by barcode.
    async fn find_active_by_barcode(&self, barcode: &str) -> StoreResult<Option<Product>>;

    /// Product by id, active or not.
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Product>>;

    /// True if any product, active or not, uses `id` as its id or `barcode`
    /// as its barcode.
    async fn id_or_barcode_exists(&self, id: &str, barcode: &str) -> StoreResult<bool>;

    /// True if a product other than `id` uses `barcode`.
    async fn barcode_taken_by_other(&self, barcode: &str, id: &str) -> StoreResult<bool>;

    async fn create(&self, product: &Product) -> StoreResult<()>;

    /// Writes every field of `update` and sets `active = true`. Stock is
    /// left alone. Returns affected rows.
    async fn update_fields(&self, update: &ProductUpdate) -> StoreResult<u64>;

    /// Sets `active = false`. Returns affected rows.
    async fn soft_delete(&self, id: &str) -> StoreResult<u64>;

    /// Active products ordered by category, then name.
    async fn list_active(&self) -> StoreResult<Vec<Product>>;
}

/// Ledger access: everything that writes stock goes through a transaction.
#[async_trait]
pub trait LedgerStore: CatalogStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTransaction>>;
}

/// One atomic unit of work.
#[async_trait]
pub trait StoreTransaction: Send {
    async fn find_active_by_id(&mut self, id: &str) -> StoreResult<Option<Product>>;

    /// Applies `delta` to the stock of `id` only if the product is active
    /// and the result stays `>= 0`. Returns affected rows (0 or 1).
    async fn conditional_adjust_stock(&mut self, id: &str, delta: i64) -> StoreResult<u64>;

    /// Current stock as seen by this transaction.
    async fn stock_of(&mut self, id: &str) -> StoreResult<Option<i64>>;

    /// Returns the new sale id.
    async fn insert_sale(&mut self, sale: &NewSale) -> StoreResult<i64>;

    async fn insert_sale_line_item(&mut self, item: &SaleLineItem) -> StoreResult<()>;

    /// Returns the new movement id.
    async fn insert_stock_movement(&mut self, movement: &NewStockMovement) -> StoreResult<i64>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;
}
