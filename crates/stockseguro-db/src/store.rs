//! # Store Contract Implementations
//!
//! Plugs [`Database`] into the engine contracts from
//! `stockseguro_core::store`. Each method delegates to a repository and
//! converts `DbError` into `StoreError`.
//!
//! ```rust,ignore
//! let db = Database::new(DbConfig::new(path)).await?;
//! let service = PosService::new(Arc::new(db));
//! let outcome = service.complete_sale(&request).await;
//! ```

use async_trait::async_trait;

use crate::pool::Database;
use crate::repository::ledger::LedgerTransaction;
use stockseguro_core::store::{CatalogStore, LedgerStore, StoreTransaction};
use stockseguro_core::{
    NewSale, NewStockMovement, Product, ProductUpdate, SaleLineItem, StoreResult,
};

#[async_trait]
impl CatalogStore for Database {
    async fn find_active_by_id(&self, id: &str) -> StoreResult<Option<Product>> {
        Ok(self.products().find_active_by_id(id).await?)
    }

    async fn find_active_by_barcode(&self, barcode: &str) -> StoreResult<Option<Product>> {
        Ok(self.products().find_active_by_barcode(barcode).await?)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Product>> {
        Ok(self.products().find_by_id(id).await?)
    }

    async fn id_or_barcode_exists(&self, id: &str, barcode: &str) -> StoreResult<bool> {
        Ok(self.products().id_or_barcode_exists(id, barcode).await?)
    }

    async fn barcode_taken_by_other(&self, barcode: &str, id: &str) -> StoreResult<bool> {
        Ok(self.products().barcode_taken_by_other(barcode, id).await?)
    }

    async fn create(&self, product: &Product) -> StoreResult<()> {
        Ok(self.products().insert(product).await?)
    }

    async fn update_fields(&self, update: &ProductUpdate) -> StoreResult<u64> {
        Ok(self.products().update_fields(update).await?)
    }

    async fn soft_delete(&self, id: &str) -> StoreResult<u64> {
        Ok(self.products().soft_delete(id).await?)
    }

    async fn list_active(&self) -> StoreResult<Vec<Product>> {
        Ok(self.products().list_active().await?)
    }
}

#[async_trait]
impl LedgerStore for Database {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTransaction>> {
        let tx = self.ledger().begin().await?;
        Ok(Box::new(tx))
    }
}

#[async_trait]
impl StoreTransaction for LedgerTransaction {
    async fn find_active_by_id(&mut self, id: &str) -> StoreResult<Option<Product>> {
        Ok(LedgerTransaction::find_active_by_id(self, id).await?)
    }

    async fn conditional_adjust_stock(&mut self, id: &str, delta: i64) -> StoreResult<u64> {
        Ok(LedgerTransaction::conditional_adjust_stock(self, id, delta).await?)
    }

    async fn stock_of(&mut self, id: &str) -> StoreResult<Option<i64>> {
        Ok(LedgerTransaction::stock_of(self, id).await?)
    }

    async fn insert_sale(&mut self, sale: &NewSale) -> StoreResult<i64> {
        Ok(LedgerTransaction::insert_sale(self, sale).await?)
    }

    async fn insert_sale_line_item(&mut self, item: &SaleLineItem) -> StoreResult<()> {
        Ok(LedgerTransaction::insert_sale_line_item(self, item).await?)
    }

    async fn insert_stock_movement(&mut self, movement: &NewStockMovement) -> StoreResult<i64> {
        Ok(LedgerTransaction::insert_stock_movement(self, movement).await?)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        Ok(LedgerTransaction::commit(*self).await?)
    }
}
