//! Sales log, stock log and activity feed.

mod common;

use std::time::Duration;

use common::*;
use stockseguro_core::api::{ErrorCode, Outcome};
use stockseguro_core::history::{FeedTone, PageRequest};
use stockseguro_core::{MovementCause, StockOperation};
use stockseguro_db::Database;

/// Gap between writes so `created_at` orders them.
async fn tick() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}

/// sale #1 (A×2, B×1), restock A +5, deduction B -1 "rota", sale #2 (B×1)
async fn busy_day() -> (Database, i64) {
    let (db, worker) = setup(&[product("A", 2500, 10), product("B", 3200, 10)]).await;
    let pos = service(&db);

    assert!(pos.complete_sale(&sale(worker.id, &[("A", 2), ("B", 1)])).await.ok);
    tick().await;
    assert!(pos.adjust_stock(&adjustment(worker.id, "A", "add", 5, None)).await.ok);
    tick().await;
    assert!(pos
        .adjust_stock(&adjustment(worker.id, "B", "subtract", 1, Some("rota")))
        .await
        .ok);
    tick().await;
    assert!(pos.complete_sale(&sale(worker.id, &[("B", 1)])).await.ok);

    (db, worker.id)
}

#[tokio::test]
async fn test_sales_page_newest_first_with_items() {
    let (db, _) = busy_day().await;

    let page = db.history().sales_page(&PageRequest::default()).await.unwrap();
    assert_eq!((page.page, page.page_size, page.total), (1, 10, 2));
    assert_eq!(page.rows.len(), 2);

    let newest = &page.rows[0];
    assert_eq!(newest.total, 3200);
    assert_eq!(newest.cashier, "Kevin Demo");
    assert_eq!(newest.cashier_email, DEMO_EMAIL);
    assert_eq!(newest.items.len(), 1);

    let oldest = &page.rows[1];
    assert_eq!(oldest.total, 8200);
    let items: Vec<(&str, i64, i64)> = oldest
        .items
        .iter()
        .map(|i| (i.product_id.as_str(), i.quantity, i.subtotal))
        .collect();
    assert_eq!(items, vec![("A", 2, 5000), ("B", 1, 3200)]);
    assert_eq!(oldest.items[0].name, "Producto A");
    assert!(newest.created_at > oldest.created_at);

    let second = db.history().sales_page(&PageRequest::new(2, 1)).await.unwrap();
    assert_eq!(second.total, 2);
    assert_eq!(second.rows[0].id, oldest.id);
}

#[tokio::test]
async fn test_movements_page_types_the_cause() {
    let (db, _) = busy_day().await;

    let page = db.history().movements_page(&PageRequest::new(1, 50)).await.unwrap();
    assert_eq!(page.total, 5);

    let causes: Vec<(StockOperation, &str, MovementCause)> = page
        .rows
        .iter()
        .map(|m| (m.operation, m.product_id.as_str(), m.cause.clone()))
        .collect();

    let sales = db.history().sales_page(&PageRequest::default()).await.unwrap();
    let (second_sale, first_sale) = (sales.rows[0].id, sales.rows[1].id);

    assert_eq!(causes[0], (StockOperation::Subtract, "B", MovementCause::Sale { sale_id: second_sale }));
    assert_eq!(
        causes[1],
        (StockOperation::Subtract, "B", MovementCause::Manual { reason: "rota".to_string() })
    );
    assert_eq!(causes[2], (StockOperation::Add, "A", MovementCause::Restock));
    // Both lines of the first sale share a timestamp; higher id first
    assert_eq!(causes[3], (StockOperation::Subtract, "B", MovementCause::Sale { sale_id: first_sale }));
    assert_eq!(causes[4], (StockOperation::Subtract, "A", MovementCause::Sale { sale_id: first_sale }));

    assert_eq!(page.rows[1].worker, "Kevin Demo");
    assert_eq!(page.rows[1].product, "Producto B");
}

#[tokio::test]
async fn test_manual_reason_never_reads_back_as_a_sale() {
    let (db, worker) = setup(&[product("P", 4500, 10)]).await;
    let pos = service(&db);

    let outcome = pos
        .adjust_stock(&adjustment(worker.id, "P", "subtract", 3, Some("sale:7")))
        .await;
    assert!(!outcome.ok);
    assert_eq!(outcome.code, Some(ErrorCode::ValidationError));
    assert_eq!(stock_of(&db, "P").await, 10);

    assert!(pos
        .adjust_stock(&adjustment(worker.id, "P", "subtract", 3, Some("devolución sale:7")))
        .await
        .ok);

    let page = db.history().movements_page(&PageRequest::default()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(
        page.rows[0].cause,
        MovementCause::Manual {
            reason: "devolución sale:7".to_string()
        }
    );
}

#[tokio::test]
async fn test_feed_merges_both_logs() {
    let (db, _) = busy_day().await;

    let page = db.history().feed_page(&PageRequest::default()).await.unwrap();
    assert_eq!(page.total, 7);

    let actions: Vec<&str> = page.rows.iter().map(|e| e.action.as_str()).collect();
    // Sales sort ahead of their own decrements on equal timestamps
    assert_eq!(
        actions,
        vec![
            "Completed sale",
            "Stock deducted",
            "Stock deducted",
            "Stock added",
            "Completed sale",
            "Stock deducted",
            "Stock deducted",
        ]
    );
    assert_eq!(page.rows[2].details, "-1 Producto B (rota)");
    assert_eq!(page.rows[2].tone, FeedTone::Warning);
    assert_eq!(page.rows[3].details, "+5 Producto A");
    assert!(page.rows[0].id.starts_with("SALE-"));
    assert!(page.rows[1].id.starts_with("STK-"));
}

#[tokio::test]
async fn test_feed_deep_page_matches_full_listing() {
    let (db, _) = busy_day().await;
    let history = db.history();

    let all = history.feed_page(&PageRequest::new(1, 50)).await.unwrap().rows;
    let page = history.feed_page(&PageRequest::new(3, 2)).await.unwrap();

    assert_eq!(page.page, 3);
    assert_eq!(page.rows, all[4..6].to_vec());

    let past_end = history.feed_page(&PageRequest::new(9, 2)).await.unwrap();
    assert!(past_end.rows.is_empty());
    assert_eq!(past_end.total, 7);
}

#[tokio::test]
async fn test_history_envelope() {
    let (db, _) = busy_day().await;

    let outcome = Outcome::from_result(db.history().sales_page(&PageRequest::new(1, 1)).await);
    let json = serde_json::to_value(&outcome).unwrap();

    assert_eq!(json["ok"], true);
    assert_eq!(json["pageSize"], 1);
    assert_eq!(json["total"], 2);
    assert_eq!(json["rows"][0]["cashierEmail"], DEMO_EMAIL);
    assert_eq!(json["rows"][0]["items"][0]["unitPrice"], 3200);
}
