//! # In-Memory Store
//!
//! A [`LedgerStore`] held entirely in process memory.
//!
//! ```text
//! MemoryStore ── Arc<Mutex<MemoryState>> (committed state)
//!      │
//!      └── begin() ── locks the state for the lifetime of the transaction
//!                     and hands out a private working copy
//!                          │
//!                          ├── commit()  → working copy replaces committed state
//!                          └── drop      → working copy is discarded
//! ```
//!
//! Transactions are serialized by the mutex, the same guarantee a single
//! SQLite writer gives. Two test hooks sit on top:
//! - [`MemoryStore::fail_movement_inserts`] makes every movement insert fail
//! - [`MemoryStore::interleave_next_begin`] runs a closure against the
//!   committed state right before the next transaction starts, standing in
//!   for a writer that got there between validation and commit

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::{StoreError, StoreResult};
use crate::store::{CatalogStore, LedgerStore, StoreTransaction};
use crate::types::{
    NewSale, NewStockMovement, Product, ProductUpdate, Sale, SaleLineItem, StockMovement,
};

type Interleave = Box<dyn FnOnce(&mut MemoryState) + Send>;

/// Everything the store holds.
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    pub products: BTreeMap<String, Product>,
    pub sales: Vec<Sale>,
    pub line_items: Vec<SaleLineItem>,
    pub movements: Vec<StockMovement>,
}

impl MemoryState {
    fn active(&self, id: &str) -> Option<&Product> {
        self.products.get(id).filter(|p| p.active)
    }
}

/// In-process store implementing the catalog and ledger contracts.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    fail_movements: Arc<AtomicBool>,
    interleave: Arc<Mutex<Option<Interleave>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with `products`.
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let state = MemoryState {
            products: products.into_iter().map(|p| (p.id.clone(), p)).collect(),
            ..MemoryState::default()
        };
        MemoryStore {
            state: Arc::new(Mutex::new(state)),
            ..MemoryStore::default()
        }
    }

    /// Copy of the committed state.
    pub async fn snapshot(&self) -> MemoryState {
        self.state.lock().await.clone()
    }

    /// When set, `insert_stock_movement` fails with a backend error.
    pub fn fail_movement_inserts(&self, fail: bool) {
        self.fail_movements.store(fail, Ordering::SeqCst);
    }

    /// Runs `change` against the committed state at the start of the next
    /// `begin()`, after any validation reads have already happened.
    pub async fn interleave_next_begin<F>(&self, change: F)
    where
        F: FnOnce(&mut MemoryState) + Send + 'static,
    {
        *self.interleave.lock().await = Some(Box::new(change));
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn find_active_by_id(&self, id: &str) -> StoreResult<Option<Product>> {
        Ok(self.state.lock().await.active(id).cloned())
    }

    async fn find_active_by_barcode(&self, barcode: &str) -> StoreResult<Option<Product>> {
        let state = self.state.lock().await;
        Ok(state
            .products
            .values()
            .find(|p| p.active && p.barcode == barcode)
            .cloned())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Product>> {
        Ok(self.state.lock().await.products.get(id).cloned())
    }

    async fn id_or_barcode_exists(&self, id: &str, barcode: &str) -> StoreResult<bool> {
        let state = self.state.lock().await;
        Ok(state
            .products
            .values()
            .any(|p| p.id == id || p.barcode == barcode))
    }

    async fn barcode_taken_by_other(&self, barcode: &str, id: &str) -> StoreResult<bool> {
        let state = self.state.lock().await;
        Ok(state
            .products
            .values()
            .any(|p| p.barcode == barcode && p.id != id))
    }

    async fn create(&self, product: &Product) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        if state
            .products
            .values()
            .any(|p| p.id == product.id || p.barcode == product.barcode)
        {
            return Err(StoreError::Conflict(format!("product {}", product.id)));
        }
        state.products.insert(product.id.clone(), product.clone());
        Ok(())
    }

    async fn update_fields(&self, update: &ProductUpdate) -> StoreResult<u64> {
        let mut state = self.state.lock().await;
        if state
            .products
            .values()
            .any(|p| p.barcode == update.barcode && p.id != update.id)
        {
            return Err(StoreError::Conflict(format!("barcode {}", update.barcode)));
        }

        let Some(product) = state.products.get_mut(&update.id) else {
            return Ok(0);
        };
        product.barcode = update.barcode.clone();
        product.name = update.name.clone();
        product.category = update.category.clone();
        product.unit_price = update.unit_price;
        product.box_price = update.box_price;
        product.min_stock = update.min_stock;
        if let Some(image) = &update.image {
            product.image = image.clone();
        }
        product.active = true;
        Ok(1)
    }

    async fn soft_delete(&self, id: &str) -> StoreResult<u64> {
        let mut state = self.state.lock().await;
        match state.products.get_mut(id) {
            Some(product) => {
                product.active = false;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn list_active(&self) -> StoreResult<Vec<Product>> {
        let state = self.state.lock().await;
        let mut products: Vec<Product> = state.products.values().filter(|p| p.active).cloned().collect();
        products.sort_by(|a, b| (&a.category, &a.name).cmp(&(&b.category, &b.name)));
        Ok(products)
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTransaction>> {
        let pending = self.interleave.lock().await.take();
        let mut committed = Arc::clone(&self.state).lock_owned().await;
        if let Some(change) = pending {
            change(&mut committed);
        }

        let working = committed.clone();
        Ok(Box::new(MemoryTransaction {
            committed,
            working,
            fail_movements: self.fail_movements.load(Ordering::SeqCst),
        }))
    }
}

/// Transaction over a private copy of the state.
struct MemoryTransaction {
    committed: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
    fail_movements: bool,
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn find_active_by_id(&mut self, id: &str) -> StoreResult<Option<Product>> {
        Ok(self.working.active(id).cloned())
    }

    async fn conditional_adjust_stock(&mut self, id: &str, delta: i64) -> StoreResult<u64> {
        match self.working.products.get_mut(id) {
            Some(p) if p.active && p.stock.checked_add(delta).is_some_and(|s| s >= 0) => {
                p.stock += delta;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn stock_of(&mut self, id: &str) -> StoreResult<Option<i64>> {
        Ok(self.working.products.get(id).map(|p| p.stock))
    }

    async fn insert_sale(&mut self, sale: &NewSale) -> StoreResult<i64> {
        let id = self.working.sales.len() as i64 + 1;
        self.working.sales.push(Sale {
            id,
            worker_id: sale.worker_id,
            total: sale.total,
            payment_method: sale.payment_method.clone(),
            received_amount: sale.received_amount,
            created_at: sale.created_at,
        });
        Ok(id)
    }

    async fn insert_sale_line_item(&mut self, item: &SaleLineItem) -> StoreResult<()> {
        if !self.working.sales.iter().any(|s| s.id == item.sale_id) {
            return Err(StoreError::Backend(format!("sale {} does not exist", item.sale_id)));
        }
        self.working.line_items.push(item.clone());
        Ok(())
    }

    async fn insert_stock_movement(&mut self, movement: &NewStockMovement) -> StoreResult<i64> {
        if self.fail_movements {
            return Err(StoreError::Backend("movement log is not writable".to_string()));
        }
        let id = self.working.movements.len() as i64 + 1;
        self.working.movements.push(StockMovement {
            id,
            product_id: movement.product_id.clone(),
            worker_id: movement.worker_id,
            operation: movement.operation,
            quantity: movement.quantity,
            reason: movement.cause.stored_reason(),
            created_at: movement.created_at,
        });
        Ok(id)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTransaction {
            mut committed,
            working,
            ..
        } = *self;
        *committed = working;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            barcode: format!("B-{}", id),
            name: format!("Product {}", id),
            category: "Licores".to_string(),
            unit_price: 1000,
            box_price: 10000,
            stock,
            min_stock: 1,
            image: "🍶".to_string(),
            active: true,
        }
    }

    #[tokio::test]
    async fn test_dropped_transaction_discards_writes() {
        let store = MemoryStore::with_products([product("A", 5)]);

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.conditional_adjust_stock("A", -2).await.unwrap(), 1);
        drop(tx);

        assert_eq!(store.snapshot().await.products["A"].stock, 5);
    }

    #[tokio::test]
    async fn test_conditional_adjust_refuses_negative_and_inactive() {
        let mut inactive = product("B", 3);
        inactive.active = false;
        let store = MemoryStore::with_products([product("A", 1), inactive]);

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.conditional_adjust_stock("A", -2).await.unwrap(), 0);
        assert_eq!(tx.conditional_adjust_stock("B", -1).await.unwrap(), 0);
        assert_eq!(tx.conditional_adjust_stock("missing", 1).await.unwrap(), 0);
        assert_eq!(tx.conditional_adjust_stock("A", -1).await.unwrap(), 1);
        tx.commit().await.unwrap();

        assert_eq!(store.snapshot().await.products["A"].stock, 0);
    }

    #[tokio::test]
    async fn test_interleave_runs_once_before_begin() {
        let store = MemoryStore::with_products([product("A", 4)]);
        store
            .interleave_next_begin(|state| {
                if let Some(p) = state.products.get_mut("A") {
                    p.stock = 0;
                }
            })
            .await;

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.stock_of("A").await.unwrap(), Some(0));
        drop(tx);

        // The change landed on committed state, and only once
        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.stock_of("A").await.unwrap(), Some(0));
        assert_eq!(tx.conditional_adjust_stock("A", 2).await.unwrap(), 1);
        tx.commit().await.unwrap();
        assert_eq!(store.snapshot().await.products["A"].stock, 2);
    }

    #[tokio::test]
    async fn test_list_active_orders_by_category_then_name() {
        let mut beer = product("C", 1);
        beer.category = "Cervezas".to_string();
        beer.name = "Zeta".to_string();
        let mut gone = product("D", 1);
        gone.active = false;
        let store = MemoryStore::with_products([product("A", 1), beer, gone]);

        let names: Vec<String> = store
            .list_active()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(names, vec!["C".to_string(), "A".to_string()]);
    }
}
