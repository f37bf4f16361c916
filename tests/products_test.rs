mod common;

use common::*;
use retail_api::entities::{location::LocationKind, product::ProductStatus};
use retail_api::errors::ServiceError;
use retail_api::services::products::{CreateProductInput, ProductCatalogService};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn service(db: &std::sync::Arc<retail_api::db::DbPool>) -> ProductCatalogService {
    let (events, rx) = event_channel();
    drop(rx);
    ProductCatalogService::new(db.clone(), events)
}

fn input(sku: &str, name: &str) -> CreateProductInput {
    CreateProductInput {
        name: name.to_string(),
        sku: sku.to_string(),
        description: None,
        category: "General".to_string(),
        barcode: None,
        image_url: None,
        cost_price: dec!(10),
        selling_price: dec!(25),
        tax_pct: Decimal::ZERO,
        reorder_level: 5,
    }
}

#[tokio::test]
async fn new_products_start_pending_and_skus_must_be_unique() {
    let db = setup_db().await;
    let service = service(&db);

    let created = service
        .create_product(input("BEANS-1KG", "Espresso Beans 1kg"))
        .await
        .expect("creation should succeed");
    assert_eq!(created.status, ProductStatus::Pending);
    assert_eq!(created.sku, "BEANS-1KG");

    let err = service
        .create_product(input("BEANS-1KG", "Another Bag"))
        .await
        .expect_err("duplicate SKU must be rejected");
    match err {
        ServiceError::InvalidOperation(msg) => assert!(msg.contains("BEANS-1KG")),
        other => panic!("expected InvalidOperation, got {:?}", other),
    }
}

#[tokio::test]
async fn import_skips_duplicates_but_keeps_the_rest() {
    let db = setup_db().await;
    let service = service(&db);

    service
        .create_product(input("EXISTS-01", "Already Here"))
        .await
        .unwrap();

    let summary = service
        .import_products(vec![
            input("NEW-01", "First New"),
            input("EXISTS-01", "Colliding Row"),
            input("NEW-02", "Second New"),
        ])
        .await
        .expect("import should succeed overall");

    assert_eq!(summary.created, 2);
    assert_eq!(summary.errors.len(), 1);
    assert!(summary.errors[0].contains("EXISTS-01"));

    let listed = service.list_products().await.unwrap();
    assert_eq!(listed.len(), 3);
}

#[tokio::test]
async fn import_rejects_an_empty_payload() {
    let db = setup_db().await;
    let service = service(&db);

    let err = service
        .import_products(vec![])
        .await
        .expect_err("empty imports must be rejected");
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn approval_moves_pending_products_exactly_once() {
    let db = setup_db().await;
    let service = service(&db);

    let pending = service
        .create_product(input("NEW-01", "Waiting Widget"))
        .await
        .unwrap();

    let approved = service
        .review_product(pending.id, ProductStatus::Approved)
        .await
        .expect("pending -> approved is allowed");
    assert_eq!(approved.status, ProductStatus::Approved);

    // No second transition, in any direction
    let err = service
        .review_product(pending.id, ProductStatus::Rejected)
        .await
        .expect_err("approved products cannot be re-reviewed");
    assert!(matches!(err, ServiceError::InvalidOperation(_)));

    let rejected_target = service
        .create_product(input("NEW-02", "Doomed Widget"))
        .await
        .unwrap();
    let rejected = service
        .review_product(rejected_target.id, ProductStatus::Rejected)
        .await
        .expect("pending -> rejected is allowed");
    assert_eq!(rejected.status, ProductStatus::Rejected);

    // PENDING is never a valid review decision
    let third = service
        .create_product(input("NEW-03", "Pending Widget"))
        .await
        .unwrap();
    let err = service
        .review_product(third.id, ProductStatus::Pending)
        .await
        .expect_err("cannot review back to pending");
    assert!(matches!(err, ServiceError::InvalidInput(_)));
}

#[tokio::test]
async fn listing_includes_the_per_location_breakdown() {
    let db = setup_db().await;
    let service = service(&db);

    let warehouse = create_location(&db, "Main HQ", LocationKind::Warehouse).await;
    let store = create_location(&db, "Downtown Store", LocationKind::Store).await;
    let beans = create_product(
        &db,
        "BEANS-1KG",
        "Espresso Beans 1kg",
        dec!(10),
        dec!(25),
        5,
        ProductStatus::Approved,
    )
    .await;
    set_stock(&db, beans.id, warehouse.id, 30).await;
    set_stock(&db, beans.id, store.id, 12).await;

    let listed = service.list_products().await.unwrap();
    assert_eq!(listed.len(), 1);

    let row = &listed[0];
    assert_eq!(row.product.id, beans.id);
    assert_eq!(row.total_stock, 42);
    assert_eq!(row.inventory.len(), 2);
    assert!(row
        .inventory
        .iter()
        .any(|l| l.location_id == warehouse.id && l.quantity == 30));
    assert!(row
        .inventory
        .iter()
        .any(|l| l.location_id == store.id && l.quantity == 12));
}
