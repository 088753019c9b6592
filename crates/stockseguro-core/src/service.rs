//! # POS Service
//!
//! The boundary the presentation layer calls. Every method answers with an
//! [`Outcome`]; engine errors are converted (and logged when they are
//! faults) here, so nothing propagates past this point.

use std::sync::Arc;

use crate::api::{
    AdjustStockRequest, CompleteSaleRequest, Done, Outcome, ProductFound, ProductList,
    SaleReceipt, StockLevel,
};
use crate::engine::{self, catalog};
use crate::store::LedgerStore;
use crate::types::{NewProduct, ProductUpdate};

/// Sale, stock and catalog operations over one store.
pub struct PosService<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for PosService<S> {
    fn clone(&self) -> Self {
        PosService {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> PosService<S>
where
    S: LedgerStore + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        PosService { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// `{ ok, saleId, total }`
    pub async fn complete_sale(&self, request: &CompleteSaleRequest) -> Outcome<SaleReceipt> {
        Outcome::from_result(engine::complete_sale(self.store.as_ref(), request).await)
    }

    /// `{ ok, newStock }`
    pub async fn adjust_stock(&self, request: &AdjustStockRequest) -> Outcome<StockLevel> {
        Outcome::from_result(engine::adjust_stock(self.store.as_ref(), request).await)
    }

    pub async fn create_product(&self, product: &NewProduct) -> Outcome<ProductFound> {
        let result = catalog::create_product(self.store.as_ref(), product).await;
        Outcome::from_result(result.map(|p| ProductFound { product: Some(p) }))
    }

    pub async fn update_product(&self, update: &ProductUpdate) -> Outcome<ProductFound> {
        let result = catalog::update_product(self.store.as_ref(), update).await;
        Outcome::from_result(result.map(|p| ProductFound { product: Some(p) }))
    }

    pub async fn delete_product(&self, id: &str) -> Outcome<Done> {
        let result = catalog::delete_product(self.store.as_ref(), id).await;
        Outcome::from_result(result.map(|()| Done {}))
    }

    /// `{ ok, product }`, with `product: null` when nothing matched.
    pub async fn lookup_barcode(&self, barcode: &str) -> Outcome<ProductFound> {
        let result = catalog::lookup_barcode(self.store.as_ref(), barcode).await;
        Outcome::from_result(result.map(|product| ProductFound { product }))
    }

    pub async fn list_products(&self) -> Outcome<ProductList> {
        let result = catalog::list_products(self.store.as_ref()).await;
        Outcome::from_result(result.map(|products| ProductList { products }))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
