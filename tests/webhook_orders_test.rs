mod common;

use common::*;
use retail_api::entities::{
    location::LocationKind, product::ProductStatus, sales_transaction,
    sales_transaction::TransactionStatus,
};
use retail_api::errors::ServiceError;
use retail_api::services::webhook_orders::{WebhookOrder, WebhookOrderLine, WebhookOrderService};
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;

fn service(db: &std::sync::Arc<retail_api::db::DbPool>) -> WebhookOrderService {
    let (events, rx) = event_channel();
    drop(rx);
    WebhookOrderService::new(db.clone(), events)
}

#[tokio::test]
async fn unknown_skus_are_skipped_without_failing_the_batch() {
    let db = setup_db().await;
    let service = service(&db);

    let warehouse = create_location(&db, "Main HQ", LocationKind::Warehouse).await;
    let shirt = create_product(
        &db,
        "TSHIRT-01",
        "Logo T-Shirt",
        dec!(200),
        dec!(500),
        5,
        ProductStatus::Approved,
    )
    .await;
    set_stock(&db, shirt.id, warehouse.id, 10).await;

    let outcome = service
        .ingest(WebhookOrder {
            order_id: "ORD-123".to_string(),
            source: Some("SHOPIFY".to_string()),
            location_id: None,
            items: vec![
                WebhookOrderLine {
                    sku: "TSHIRT-01".to_string(),
                    quantity: 2,
                    price: dec!(500),
                },
                WebhookOrderLine {
                    sku: "GHOST-SKU".to_string(),
                    quantity: 1,
                    price: dec!(100),
                },
            ],
        })
        .await
        .expect("ingestion must not fail on unknown SKUs");

    assert_eq!(outcome.fulfilled_lines, 1);
    assert_eq!(outcome.skipped_skus, vec!["GHOST-SKU".to_string()]);
    assert!(outcome.invoice_number.starts_with("WEB-SHOPIFY-ORD-123-"));

    // The transaction commits with the recognized lines; the stated total
    // still covers the whole payload, skipped lines included.
    let recorded = sales_transaction::Entity::find_by_id(outcome.transaction_id)
        .one(db.as_ref())
        .await
        .unwrap()
        .expect("transaction should exist");
    assert_eq!(recorded.total_amount, dec!(1100));
    assert_eq!(recorded.source, "SHOPIFY");
    assert_eq!(recorded.payment_method, "ONLINE");
    assert_eq!(recorded.status, TransactionStatus::Completed);

    assert_eq!(count_transaction_items(&db).await, 1);
    assert_eq!(stock_at(&db, shirt.id, warehouse.id).await, Some(8));
}

#[tokio::test]
async fn online_orders_may_drive_stock_negative() {
    let db = setup_db().await;
    let service = service(&db);

    let warehouse = create_location(&db, "Main HQ", LocationKind::Warehouse).await;
    let shirt = create_product(
        &db,
        "TSHIRT-01",
        "Logo T-Shirt",
        dec!(200),
        dec!(500),
        5,
        ProductStatus::Approved,
    )
    .await;
    set_stock(&db, shirt.id, warehouse.id, 1).await;

    let outcome = service
        .ingest(WebhookOrder {
            order_id: "ORD-900".to_string(),
            source: Some("SHOPIFY".to_string()),
            location_id: None,
            items: vec![WebhookOrderLine {
                sku: "TSHIRT-01".to_string(),
                quantity: 5,
                price: dec!(500),
            }],
        })
        .await
        .expect("overselling is allowed on this path");

    assert_eq!(outcome.fulfilled_lines, 1);
    // Backlog surfaces as negative on-hand stock
    assert_eq!(stock_at(&db, shirt.id, warehouse.id).await, Some(-4));

    let movements = movements_for(&db, shirt.id).await;
    assert_eq!(movements.len(), 1);
    assert!(movements[0].reason.contains("ORD-900"));
    assert!(movements[0].reason.contains("SHOPIFY"));
}

#[tokio::test]
async fn missing_inventory_rows_are_created_with_the_backlog() {
    let db = setup_db().await;
    let service = service(&db);

    create_location(&db, "Main HQ", LocationKind::Warehouse).await;
    let shirt = create_product(
        &db,
        "TSHIRT-01",
        "Logo T-Shirt",
        dec!(200),
        dec!(500),
        5,
        ProductStatus::Approved,
    )
    .await;

    service
        .ingest(WebhookOrder {
            order_id: "ORD-901".to_string(),
            source: None,
            location_id: None,
            items: vec![WebhookOrderLine {
                sku: "TSHIRT-01".to_string(),
                quantity: 3,
                price: dec!(500),
            }],
        })
        .await
        .expect("ingestion should succeed with no prior inventory row");

    let warehouse = retail_api::entities::location::Entity::find()
        .one(db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stock_at(&db, shirt.id, warehouse.id).await, Some(-3));
}

#[tokio::test]
async fn fulfillment_prefers_the_oldest_warehouse_then_any_location() {
    let db = setup_db().await;
    let service = service(&db);

    // A store exists before any warehouse; the warehouse still wins.
    let store = create_location(&db, "Downtown Store", LocationKind::Store).await;
    let warehouse = create_location(&db, "Main HQ", LocationKind::Warehouse).await;
    let shirt = create_product(
        &db,
        "TSHIRT-01",
        "Logo T-Shirt",
        dec!(200),
        dec!(500),
        5,
        ProductStatus::Approved,
    )
    .await;
    set_stock(&db, shirt.id, warehouse.id, 10).await;
    set_stock(&db, shirt.id, store.id, 10).await;

    let outcome = service
        .ingest(WebhookOrder {
            order_id: "ORD-77".to_string(),
            source: Some("WOOCOMMERCE".to_string()),
            location_id: None,
            items: vec![WebhookOrderLine {
                sku: "TSHIRT-01".to_string(),
                quantity: 2,
                price: dec!(500),
            }],
        })
        .await
        .unwrap();

    let recorded = sales_transaction::Entity::find_by_id(outcome.transaction_id)
        .one(db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(recorded.location_id, warehouse.id);
    assert_eq!(stock_at(&db, shirt.id, warehouse.id).await, Some(8));
    assert_eq!(stock_at(&db, shirt.id, store.id).await, Some(10));
}

#[tokio::test]
async fn ingestion_fails_when_no_location_exists() {
    let db = setup_db().await;
    let service = service(&db);

    let err = service
        .ingest(WebhookOrder {
            order_id: "ORD-1".to_string(),
            source: None,
            location_id: None,
            items: vec![],
        })
        .await
        .expect_err("no fulfillment site available");

    assert!(matches!(err, ServiceError::InternalError(_)));
}

#[tokio::test]
async fn blank_order_ids_are_rejected_and_sources_default() {
    let db = setup_db().await;
    let service = service(&db);

    create_location(&db, "Main HQ", LocationKind::Warehouse).await;

    let err = service
        .ingest(WebhookOrder {
            order_id: "  ".to_string(),
            source: None,
            location_id: None,
            items: vec![],
        })
        .await
        .expect_err("blank order id must be rejected");
    assert!(matches!(err, ServiceError::ValidationError(_)));

    let outcome = service
        .ingest(WebhookOrder {
            order_id: "ORD-2".to_string(),
            source: None,
            location_id: None,
            items: vec![],
        })
        .await
        .expect("empty item lists are tolerated");
    assert!(outcome.invoice_number.starts_with("WEB-ONLINE_STORE-ORD-2-"));
    assert_eq!(outcome.fulfilled_lines, 0);
}
