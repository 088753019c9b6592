//! # History Repository
//!
//! Read-only, paged views over the ledger tables. Newest first; ties on
//! `created_at` are broken by id, also descending.
//!
//! ## Sales Page
//! ```text
//! 1. SELECT sales ⋈ workers  LIMIT page_size OFFSET offset
//! 2. SELECT sale_items ⋈ products WHERE sale_id IN (<page ids>)
//! 3. attach items to their sale, in insertion order
//! ```
//! Two queries per page regardless of page size.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use stockseguro_core::history::{
    merge_feed, FeedEntry, MovementHeadline, MovementRecord, Page, PageRequest, SaleHeadline,
    SaleRecord, SaleRecordItem,
};
use stockseguro_core::{MovementCause, StockOperation};

#[derive(FromRow)]
struct SaleRow {
    id: i64,
    total: i64,
    payment_method: String,
    received_amount: Option<i64>,
    created_at: DateTime<Utc>,
    cashier: String,
    cashier_email: String,
}

#[derive(FromRow)]
struct SaleItemRow {
    sale_id: i64,
    product_id: String,
    name: String,
    quantity: i64,
    unit_price: i64,
    subtotal: i64,
}

#[derive(FromRow)]
struct MovementRow {
    id: i64,
    product_id: String,
    product: String,
    worker_id: i64,
    worker: String,
    worker_email: String,
    operation: StockOperation,
    quantity: i64,
    reason: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<MovementRow> for MovementRecord {
    fn from(row: MovementRow) -> Self {
        let cause = MovementCause::from_stored(row.operation, row.reason.as_deref());
        MovementRecord {
            id: row.id,
            product_id: row.product_id,
            product: row.product,
            worker_id: row.worker_id,
            worker: row.worker,
            worker_email: row.worker_email,
            operation: row.operation,
            quantity: row.quantity,
            reason: row.reason,
            cause,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct SaleHeadlineRow {
    id: i64,
    created_at: DateTime<Utc>,
    user: String,
    total: i64,
}

#[derive(FromRow)]
struct MovementHeadlineRow {
    id: i64,
    created_at: DateTime<Utc>,
    user: String,
    operation: StockOperation,
    quantity: i64,
    product: String,
    reason: Option<String>,
}

/// Repository for the history screens.
#[derive(Debug, Clone)]
pub struct HistoryRepository {
    pool: SqlitePool,
}

impl HistoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        HistoryRepository { pool }
    }

    /// Sales with cashier and line items.
    pub async fn sales_page(&self, request: &PageRequest) -> DbResult<Page<SaleRecord>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT s.id, s.total, s.payment_method, s.received_amount, s.created_at,
                   w.name AS cashier, w.email AS cashier_email
            FROM sales s
            JOIN workers w ON w.id = s.worker_id
            ORDER BY s.created_at DESC, s.id DESC
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(i64::from(request.page_size()))
        .bind(request.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        let mut items = self.items_for(&rows).await?;

        let records = rows
            .into_iter()
            .map(|row| SaleRecord {
                items: items.remove(&row.id).unwrap_or_default(),
                id: row.id,
                total: row.total,
                payment_method: row.payment_method,
                received_amount: row.received_amount,
                created_at: row.created_at,
                cashier: row.cashier,
                cashier_email: row.cashier_email,
            })
            .collect::<Vec<_>>();

        debug!(page = request.page(), rows = records.len(), total, "Sales page");
        Ok(Page::new(request, total, records))
    }

    async fn items_for(&self, sales: &[SaleRow]) -> DbResult<HashMap<i64, Vec<SaleRecordItem>>> {
        let mut grouped: HashMap<i64, Vec<SaleRecordItem>> = HashMap::new();
        if sales.is_empty() {
            return Ok(grouped);
        }

        let mut query: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            "SELECT si.sale_id, si.product_id, p.name, si.quantity, si.unit_price, si.subtotal \
             FROM sale_items si \
             JOIN products p ON p.id = si.product_id \
             WHERE si.sale_id IN (",
        );
        let mut ids = query.separated(", ");
        for sale in sales {
            ids.push_bind(sale.id);
        }
        ids.push_unseparated(") ORDER BY si.id ASC");

        let rows = query
            .build_query_as::<SaleItemRow>()
            .fetch_all(&self.pool)
            .await?;

        for row in rows {
            grouped.entry(row.sale_id).or_default().push(SaleRecordItem {
                product_id: row.product_id,
                name: row.name,
                quantity: row.quantity,
                unit_price: row.unit_price,
                subtotal: row.subtotal,
            });
        }
        Ok(grouped)
    }

    /// Stock movements with product and worker names.
    pub async fn movements_page(&self, request: &PageRequest) -> DbResult<Page<MovementRecord>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_movements")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT m.id, m.product_id, p.name AS product,
                   m.worker_id, w.name AS worker, w.email AS worker_email,
                   m.operation, m.quantity, m.reason, m.created_at
            FROM stock_movements m
            JOIN products p ON p.id = m.product_id
            JOIN workers w ON w.id = m.worker_id
            ORDER BY m.created_at DESC, m.id DESC
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(i64::from(request.page_size()))
        .bind(request.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        let records: Vec<MovementRecord> = rows.into_iter().map(MovementRecord::from).collect();

        debug!(page = request.page(), rows = records.len(), total, "Movements page");
        Ok(Page::new(request, total, records))
    }

    /// Sales and movements merged into one newest-first feed.
    ///
    /// `total` is the sum of both tables.
    pub async fn feed_page(&self, request: &PageRequest) -> DbResult<Page<FeedEntry>> {
        let window = request.merge_window() as i64;

        let sales_total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;
        let movements_total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_movements")
            .fetch_one(&self.pool)
            .await?;

        let sales = sqlx::query_as::<_, SaleHeadlineRow>(
            r#"
            SELECT s.id, s.created_at, w.name AS user, s.total
            FROM sales s
            JOIN workers w ON w.id = s.worker_id
            ORDER BY s.created_at DESC, s.id DESC
            LIMIT ?1
            "#,
        )
        .bind(window)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|row| SaleHeadline {
            id: row.id,
            created_at: row.created_at,
            user: row.user,
            total: row.total,
        })
        .collect();

        let movements = sqlx::query_as::<_, MovementHeadlineRow>(
            r#"
            SELECT m.id, m.created_at, w.name AS user, m.operation, m.quantity,
                   p.name AS product, m.reason
            FROM stock_movements m
            JOIN products p ON p.id = m.product_id
            JOIN workers w ON w.id = m.worker_id
            ORDER BY m.created_at DESC, m.id DESC
            LIMIT ?1
            "#,
        )
        .bind(window)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|row| MovementHeadline {
            id: row.id,
            created_at: row.created_at,
            user: row.user,
            operation: row.operation,
            quantity: row.quantity,
            product: row.product,
            reason: row.reason,
        })
        .collect();

        let entries = merge_feed(sales, movements, request);
        let total = sales_total + movements_total;

        debug!(page = request.page(), rows = entries.len(), total, "Feed page");
        Ok(Page::new(request, total, entries))
    }
}
