//! # History Views
//!
//! Read-only shapes for the sales log, the stock log and the unified
//! activity feed, plus the paging and merge rules behind them. The queries
//! themselves live in `stockseguro-db`.
//!
//! ## Unified Feed Merge
//! ```text
//! page 3, size 10  ⇒  offset 20
//!
//!   sales (newest first)      movements (newest first)
//!   take offset + size = 30   take offset + size = 30
//!            \                     /
//!             merge by created_at desc
//!                      │
//!               skip 20, take 10
//! ```
//! Taking `offset + size` rows from each source is enough: the first
//! `offset + size` rows of the merged stream can only come from the first
//! `offset + size` rows of either input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{MovementCause, StockOperation};
use crate::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

// =============================================================================
// Paging
// =============================================================================

/// Page request as the client sends it; both fields optional.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PageRequest {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        PageRequest {
            page: Some(page),
            page_size: Some(page_size),
        }
    }

    /// Page number, at least 1.
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Rows per page, clamped to `1..=MAX_PAGE_SIZE`.
    pub fn page_size(&self) -> u32 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(self.page_size())
    }

    /// Rows each source must supply for a merged page.
    pub fn merge_window(&self) -> u64 {
        self.offset() + u64::from(self.page_size())
    }
}

/// One page of rows plus the total row count.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Page<T> {
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
    pub rows: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(request: &PageRequest, total: i64, rows: Vec<T>) -> Self {
        Page {
            page: request.page(),
            page_size: request.page_size(),
            total,
            rows,
        }
    }
}

// =============================================================================
// Sales Log
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleRecord {
    pub id: i64,
    pub total: i64,
    pub payment_method: String,
    pub received_amount: Option<i64>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub cashier: String,
    pub cashier_email: String,
    /// Line items in the order they were rung up.
    pub items: Vec<SaleRecordItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleRecordItem {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: i64,
    pub subtotal: i64,
}

// =============================================================================
// Stock Log
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MovementRecord {
    pub id: i64,
    pub product_id: String,
    pub product: String,
    pub worker_id: i64,
    pub worker: String,
    pub worker_email: String,
    pub operation: StockOperation,
    pub quantity: i64,
    pub reason: Option<String>,
    pub cause: MovementCause,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unified Feed
// =============================================================================

/// Display tone of a feed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum FeedTone {
    Success,
    Warning,
}

/// One row of the activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FeedEntry {
    /// `SALE-<id>` or `STK-<id>`.
    pub id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub user: String,
    pub action: String,
    pub details: String,
    #[serde(rename = "type")]
    pub tone: FeedTone,
}

/// Sale as the feed query returns it.
#[derive(Debug, Clone)]
pub struct SaleHeadline {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub user: String,
    pub total: i64,
}

/// Movement as the feed query returns it.
#[derive(Debug, Clone)]
pub struct MovementHeadline {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub user: String,
    pub operation: StockOperation,
    pub quantity: i64,
    pub product: String,
    pub reason: Option<String>,
}

impl From<SaleHeadline> for FeedEntry {
    fn from(sale: SaleHeadline) -> Self {
        FeedEntry {
            id: format!("SALE-{}", sale.id),
            created_at: sale.created_at,
            user: sale.user,
            action: "Completed sale".to_string(),
            details: format!("Sale completed. Total: {}", sale.total),
            tone: FeedTone::Success,
        }
    }
}

impl From<MovementHeadline> for FeedEntry {
    fn from(movement: MovementHeadline) -> Self {
        let (action, sign, tone) = match movement.operation {
            StockOperation::Add => ("Stock added", '+', FeedTone::Success),
            StockOperation::Subtract => ("Stock deducted", '-', FeedTone::Warning),
        };
        let reason = movement
            .reason
            .filter(|r| !r.is_empty())
            .map(|r| format!(" ({})", r))
            .unwrap_or_default();

        FeedEntry {
            id: format!("STK-{}", movement.id),
            created_at: movement.created_at,
            user: movement.user,
            action: action.to_string(),
            details: format!("{}{} {}{}", sign, movement.quantity, movement.product, reason),
            tone,
        }
    }
}

/// Merges two newest-first lists into one feed page.
///
/// Both inputs must already be sorted by `created_at` descending and hold
/// at least [`PageRequest::merge_window`] rows each (or everything there
/// is). On equal timestamps sales come first.
pub fn merge_feed(
    sales: Vec<SaleHeadline>,
    movements: Vec<MovementHeadline>,
    request: &PageRequest,
) -> Vec<FeedEntry> {
    let mut sales = sales.into_iter().peekable();
    let mut movements = movements.into_iter().peekable();
    let mut merged = Vec::with_capacity(sales.len() + movements.len());

    loop {
        let take_sale = match (sales.peek(), movements.peek()) {
            (Some(s), Some(m)) => s.created_at >= m.created_at,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        let entry = if take_sale {
            sales.next().map(FeedEntry::from)
        } else {
            movements.next().map(FeedEntry::from)
        };
        merged.extend(entry);
    }

    merged
        .into_iter()
        .skip(request.offset() as usize)
        .take(request.page_size() as usize)
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap() + Duration::minutes(minute)
    }

    fn sale(id: i64, minute: i64) -> SaleHeadline {
        SaleHeadline {
            id,
            created_at: at(minute),
            user: "Kevin Demo".to_string(),
            total: 56000,
        }
    }

    fn movement(id: i64, minute: i64, operation: StockOperation) -> MovementHeadline {
        MovementHeadline {
            id,
            created_at: at(minute),
            user: "Kevin Demo".to_string(),
            operation,
            quantity: 5,
            product: "Pisco".to_string(),
            reason: match operation {
                StockOperation::Add => None,
                StockOperation::Subtract => Some("rota".to_string()),
            },
        }
    }

    #[test]
    fn test_page_request_clamps() {
        let request = PageRequest::default();
        assert_eq!((request.page(), request.page_size()), (1, DEFAULT_PAGE_SIZE));

        let request = PageRequest::new(0, 500);
        assert_eq!((request.page(), request.page_size()), (1, MAX_PAGE_SIZE));

        let request = PageRequest::new(3, 0);
        assert_eq!(request.page_size(), 1);
        assert_eq!(request.offset(), 2);

        let request = PageRequest::new(3, 10);
        assert_eq!(request.offset(), 20);
        assert_eq!(request.merge_window(), 30);
    }

    #[test]
    fn test_feed_entry_wording() {
        let entry = FeedEntry::from(sale(12, 0));
        assert_eq!(entry.id, "SALE-12");
        assert_eq!(entry.action, "Completed sale");
        assert_eq!(entry.details, "Sale completed. Total: 56000");
        assert_eq!(entry.tone, FeedTone::Success);

        let entry = FeedEntry::from(movement(4, 0, StockOperation::Add));
        assert_eq!(entry.id, "STK-4");
        assert_eq!(entry.action, "Stock added");
        assert_eq!(entry.details, "+5 Pisco");

        let entry = FeedEntry::from(movement(5, 0, StockOperation::Subtract));
        assert_eq!(entry.action, "Stock deducted");
        assert_eq!(entry.details, "-5 Pisco (rota)");
        assert_eq!(entry.tone, FeedTone::Warning);

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "warning");
    }

    #[test]
    fn test_merge_interleaves_newest_first() {
        let sales = vec![sale(2, 30), sale(1, 10)];
        let movements = vec![
            movement(3, 40, StockOperation::Add),
            movement(2, 20, StockOperation::Subtract),
            movement(1, 0, StockOperation::Add),
        ];

        let ids: Vec<String> = merge_feed(sales, movements, &PageRequest::new(1, 10))
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["STK-3", "SALE-2", "STK-2", "SALE-1", "STK-1"]);
    }

    #[test]
    fn test_merge_deep_page() {
        // 4 sales at even minutes, 4 movements at odd minutes, newest first
        let sales: Vec<_> = (0..4).rev().map(|i| sale(i + 1, i * 2)).collect();
        let movements: Vec<_> = (0..4)
            .rev()
            .map(|i| movement(i + 1, i * 2 + 1, StockOperation::Add))
            .collect();

        let ids: Vec<String> = merge_feed(sales, movements, &PageRequest::new(2, 3))
            .into_iter()
            .map(|e| e.id)
            .collect();
        // Full order: STK-4 SALE-4 STK-3 | SALE-3 STK-2 SALE-2 | STK-1 SALE-1
        assert_eq!(ids, vec!["SALE-3", "STK-2", "SALE-2"]);
    }
}
