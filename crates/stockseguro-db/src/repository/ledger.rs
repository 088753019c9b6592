//! # Ledger Repository
//!
//! Transactions over stock and the append-only ledger tables.
//!
//! ## Write-First Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SQLite opens a deferred transaction as a reader. If its first         │
//! │  statement is a SELECT and another connection commits before our      │
//! │  first write, the upgrade to writer fails with SQLITE_BUSY_SNAPSHOT.  │
//! │                                                                         │
//! │  So every ledger transaction starts with the conditional stock        │
//! │  UPDATE. From then on this connection holds the write lock, and        │
//! │  everything it reads is current until COMMIT.                          │
//! │                                                                         │
//! │    BEGIN                                                                │
//! │    UPDATE products SET stock = stock + ?  WHERE … AND stock + ? >= 0   │
//! │    SELECT … (prices, new stock)                                         │
//! │    INSERT sales / sale_items / stock_movements                          │
//! │    COMMIT                                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::product::select_products;
use stockseguro_core::types::format_timestamp;
use stockseguro_core::{NewSale, NewStockMovement, Product, SaleLineItem};

/// Opens ledger transactions.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// Starts a transaction. Dropping it without `commit` rolls back.
    pub async fn begin(&self) -> DbResult<LedgerTransaction> {
        let tx = self.pool.begin().await.map_err(DbError::transaction)?;
        Ok(LedgerTransaction { tx })
    }
}

/// One open transaction on a pooled connection.
pub struct LedgerTransaction {
    tx: Transaction<'static, Sqlite>,
}

impl LedgerTransaction {
    /// Adds `delta` to the stock of an active product, refusing to go
    /// below zero. Returns affected rows.
    pub async fn conditional_adjust_stock(&mut self, id: &str, delta: i64) -> DbResult<u64> {
        debug!(id = %id, delta, "Conditional stock update");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock + ?2
            WHERE id = ?1 AND active = 1 AND stock + ?2 >= 0
            "#,
        )
        .bind(id)
        .bind(delta)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn find_active_by_id(&mut self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(select_products!("WHERE id = ?1 AND active = 1"))
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(product)
    }

    pub async fn stock_of(&mut self, id: &str) -> DbResult<Option<i64>> {
        let stock: Option<i64> = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(stock)
    }

    /// Inserts the sale header and returns its id.
    pub async fn insert_sale(&mut self, sale: &NewSale) -> DbResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO sales (worker_id, total, payment_method, received_amount, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(sale.worker_id)
        .bind(sale.total)
        .bind(&sale.payment_method)
        .bind(sale.received_amount)
        .bind(format_timestamp(&sale.created_at))
        .execute(&mut *self.tx)
        .await?;

        let id = result.last_insert_rowid();
        debug!(sale_id = id, total = sale.total, "Inserted sale");
        Ok(id)
    }

    pub async fn insert_sale_line_item(&mut self, item: &SaleLineItem) -> DbResult<()> {
        debug!(sale_id = item.sale_id, product_id = %item.product_id, "Adding sale item");

        sqlx::query(
            r#"
            INSERT INTO sale_items (sale_id, product_id, quantity, unit_price, subtotal)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(item.sale_id)
        .bind(&item.product_id)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.subtotal)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    /// Appends a movement and returns its id.
    pub async fn insert_stock_movement(&mut self, movement: &NewStockMovement) -> DbResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO stock_movements
                (product_id, worker_id, operation, quantity, reason, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&movement.product_id)
        .bind(movement.worker_id)
        .bind(movement.operation)
        .bind(movement.quantity)
        .bind(movement.cause.stored_reason())
        .bind(format_timestamp(&movement.created_at))
        .execute(&mut *self.tx)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn commit(self) -> DbResult<()> {
        self.tx.commit().await.map_err(DbError::transaction)
    }
}
