//! # Product Repository
//!
//! Catalog queries against the `products` table.
//!
//! ## Key Operations
//! - Point lookups by id and by barcode (active only, or any)
//! - Uniqueness probes used before create/update
//! - Create, edit (never stock), soft delete
//! - Seed upsert and catalog replacement
//!
//! Stock is only written through [`crate::repository::ledger`], inside a
//! transaction together with its movement row.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use stockseguro_core::{Product, ProductUpdate};

/// `SELECT <product columns> FROM products <tail>`
macro_rules! select_products {
    ($tail:literal) => {
        concat!(
            "SELECT id, barcode, name, category, unit_price, box_price, stock, min_stock, image, active ",
            "FROM products ",
            $tail
        )
    };
}
pub(crate) use select_products;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let product = repo.find_active_by_barcode("7702116011239").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new product repository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Active product by id.
    pub async fn find_active_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(select_products!("WHERE id = ?1 AND active = 1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    /// Active product by barcode.
    pub async fn find_active_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        debug!(barcode = %barcode, "Looking up barcode");

        let product =
            sqlx::query_as::<_, Product>(select_products!("WHERE barcode = ?1 AND active = 1"))
                .bind(barcode)
                .fetch_optional(&self.pool)
                .await?;
        Ok(product)
    }

    /// Product by id, active or not.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(select_products!("WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    /// Active products ordered by category, then name.
    pub async fn list_active(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(select_products!(
            "WHERE active = 1 ORDER BY category ASC, name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listed active products");
        Ok(products)
    }

    /// True if any row, active or not, has this id or this barcode.
    pub async fn id_or_barcode_exists(&self, id: &str, barcode: &str) -> DbResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM products WHERE id = ?1 OR barcode = ?2)",
        )
        .bind(id)
        .bind(barcode)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// True if a product other than `id` has this barcode.
    pub async fn barcode_taken_by_other(&self, barcode: &str, id: &str) -> DbResult<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM products WHERE barcode = ?1 AND id <> ?2)",
        )
        .bind(barcode)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    /// Inserts a new product.
    ///
    /// ## Errors
    /// `DbError::UniqueViolation` if the id or barcode is already used.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, barcode = %product.barcode, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, barcode, name, category, unit_price, box_price,
                stock, min_stock, image, active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&product.id)
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.unit_price)
        .bind(product.box_price)
        .bind(product.stock)
        .bind(product.min_stock)
        .bind(&product.image)
        .bind(product.active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Edits every field except stock and re-activates the row.
    ///
    /// A `None` image keeps the current one. Returns affected rows.
    pub async fn update_fields(&self, update: &ProductUpdate) -> DbResult<u64> {
        debug!(id = %update.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                barcode = ?2,
                name = ?3,
                category = ?4,
                unit_price = ?5,
                box_price = ?6,
                min_stock = ?7,
                image = COALESCE(?8, image),
                active = 1
            WHERE id = ?1
            "#,
        )
        .bind(&update.id)
        .bind(&update.barcode)
        .bind(&update.name)
        .bind(&update.category)
        .bind(update.unit_price)
        .bind(update.box_price)
        .bind(update.min_stock)
        .bind(update.image.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Marks a product inactive. Returns affected rows.
    pub async fn soft_delete(&self, id: &str) -> DbResult<u64> {
        debug!(id = %id, "Soft-deleting product");

        let result = sqlx::query("UPDATE products SET active = 0 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Number of product rows, active or not.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Replaces the catalog with `products` in one transaction.
    ///
    /// Listed rows are inserted, or updated and re-activated when they
    /// exist; the stock of an existing row is kept. Every other row is
    /// deactivated. Returns the number of rows deactivated.
    pub async fn replace_catalog(&self, products: &[Product]) -> DbResult<u64> {
        let mut tx = self.pool.begin().await?;

        for product in products {
            sqlx::query(
                r#"
                INSERT INTO products (
                    id, barcode, name, category, unit_price, box_price,
                    stock, min_stock, image, active
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 1)
                ON CONFLICT (id) DO UPDATE SET
                    barcode = excluded.barcode,
                    name = excluded.name,
                    category = excluded.category,
                    unit_price = excluded.unit_price,
                    box_price = excluded.box_price,
                    min_stock = excluded.min_stock,
                    image = excluded.image,
                    active = 1
                "#,
            )
            .bind(&product.id)
            .bind(&product.barcode)
            .bind(&product.name)
            .bind(&product.category)
            .bind(product.unit_price)
            .bind(product.box_price)
            .bind(product.stock)
            .bind(product.min_stock)
            .bind(&product.image)
            .execute(&mut *tx)
            .await?;
        }

        let mut deactivate: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("UPDATE products SET active = 0 WHERE active = 1");
        if !products.is_empty() {
            deactivate.push(" AND id NOT IN (");
            let mut ids = deactivate.separated(", ");
            for product in products {
                ids.push_bind(product.id.as_str());
            }
            ids.push_unseparated(")");
        }
        let deactivated = deactivate.build().execute(&mut *tx).await?.rows_affected();

        tx.commit().await?;

        debug!(listed = products.len(), deactivated, "Catalog replaced");
        Ok(deactivated)
    }
}
