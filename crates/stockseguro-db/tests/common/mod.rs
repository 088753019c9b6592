//! Shared setup for the SQLite integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use stockseguro_core::api::{AdjustStockRequest, CartLine, CompleteSaleRequest};
use stockseguro_core::service::PosService;
use stockseguro_core::{Product, Worker};
use stockseguro_db::{Database, DbConfig};

pub const DEMO_EMAIL: &str = "kevin@demo.com";
pub const DEMO_PIN: &str = "1234";

pub fn product(id: &str, unit_price: i64, stock: i64) -> Product {
    Product {
        id: id.to_string(),
        barcode: format!("770{}", id),
        name: format!("Producto {}", id),
        category: "Licores".to_string(),
        unit_price,
        box_price: unit_price * 12,
        stock,
        min_stock: 2,
        image: "🍶".to_string(),
        active: true,
    }
}

/// Migrated in-memory database with one worker and the given products.
pub async fn setup(products: &[Product]) -> (Database, Worker) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    prepare(db, products).await
}

async fn prepare(db: Database, products: &[Product]) -> (Database, Worker) {
    let worker = db
        .workers()
        .register("12.345.678-9", "Kevin Demo", DEMO_EMAIL, DEMO_PIN)
        .await
        .unwrap();
    for p in products {
        db.products().insert(p).await.unwrap();
    }
    (db, worker)
}

/// File database in its own temp dir, for tests that need several connections.
///
/// The directory (with the `-wal` and `-shm` files) goes away on drop.
pub struct TempDb {
    dir: TempDir,
}

impl TempDb {
    pub fn new(tag: &str) -> Self {
        let dir = tempfile::Builder::new()
            .prefix(&format!("stockseguro-{}-", tag))
            .tempdir()
            .unwrap();
        TempDb { dir }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().join("stockseguro.db")
    }

    pub async fn open(&self, products: &[Product]) -> (Database, Worker) {
        let db = Database::new(DbConfig::new(self.path()).max_connections(4))
            .await
            .unwrap();
        prepare(db, products).await
    }
}

pub fn service(db: &Database) -> PosService<Database> {
    PosService::new(Arc::new(db.clone()))
}

pub fn sale(worker_id: i64, lines: &[(&str, i64)]) -> CompleteSaleRequest {
    CompleteSaleRequest {
        worker_id,
        payment_method: "efectivo".to_string(),
        received_amount: None,
        items: lines
            .iter()
            .map(|(id, quantity)| CartLine {
                product_id: id.to_string(),
                quantity: *quantity,
            })
            .collect(),
    }
}

pub fn adjustment(
    worker_id: i64,
    product_id: &str,
    operation: &str,
    quantity: i64,
    reason: Option<&str>,
) -> AdjustStockRequest {
    AdjustStockRequest {
        worker_id,
        product_id: product_id.to_string(),
        operation: operation.to_string(),
        quantity,
        reason: reason.map(str::to_string),
    }
}

pub async fn stock_of(db: &Database, id: &str) -> i64 {
    db.products().find_by_id(id).await.unwrap().unwrap().stock
}

pub async fn count(db: &Database, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(db.pool())
        .await
        .unwrap()
}
