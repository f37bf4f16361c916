mod common;

use common::*;
use retail_api::entities::{
    location::LocationKind, product::ProductStatus, sales_transaction,
    sales_transaction::TransactionStatus, transaction_item,
};
use retail_api::errors::ServiceError;
use retail_api::services::checkout::{CheckoutInput, CheckoutLine, CheckoutService};
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

#[tokio::test]
async fn checkout_commits_items_stock_and_movements_together() {
    let db = setup_db().await;
    let (events, _rx) = event_channel();
    let service = CheckoutService::new(db.clone(), events);

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
    let mugs = create_product(
        &db,
        "MUG-01",
        "Stoneware Mug",
        dec!(3),
        dec!(8),
        5,
        ProductStatus::Approved,
    )
    .await;
    set_stock(&db, beans.id, store.id, 10).await;
    set_stock(&db, mugs.id, store.id, 5).await;

    let receipt = service
        .checkout(CheckoutInput {
            location_id: store.id,
            payment_method: "CASH".to_string(),
            total_amount: dec!(58),
            customer_id: None,
            lines: vec![
                CheckoutLine {
                    product_id: beans.id,
                    quantity: 2,
                },
                CheckoutLine {
                    product_id: mugs.id,
                    quantity: 1,
                },
            ],
        })
        .await
        .expect("checkout should commit");

    assert!(receipt.invoice_number.starts_with("INV-"));

    // Stock decremented at the store
    assert_eq!(stock_at(&db, beans.id, store.id).await, Some(8));
    assert_eq!(stock_at(&db, mugs.id, store.id).await, Some(4));

    // One transaction row carrying the stated total
    let recorded = sales_transaction::Entity::find_by_id(receipt.transaction_id)
        .one(db.as_ref())
        .await
        .unwrap()
        .expect("transaction should exist");
    assert_eq!(recorded.total_amount, dec!(58));
    assert_eq!(recorded.source, "POS");
    assert_eq!(recorded.status, TransactionStatus::Completed);

    // One item per cart line, priced at the product's current selling price
    let items = transaction_item::Entity::find()
        .filter(transaction_item::Column::TransactionId.eq(receipt.transaction_id))
        .all(db.as_ref())
        .await
        .unwrap();
    assert_eq!(items.len(), 2);
    let beans_item = items.iter().find(|i| i.product_id == beans.id).unwrap();
    assert_eq!(beans_item.quantity, 2);
    assert_eq!(beans_item.unit_price, dec!(25));

    // One movement per line, flowing out of the store
    let beans_movements = movements_for(&db, beans.id).await;
    assert_eq!(beans_movements.len(), 1);
    assert_eq!(beans_movements[0].from_location_id, Some(store.id));
    assert_eq!(beans_movements[0].to_location_id, None);
    assert!(beans_movements[0].reason.contains(&receipt.invoice_number));
}

#[tokio::test]
async fn insufficient_stock_rolls_back_the_whole_cart() {
    let db = setup_db().await;
    let (events, _rx) = event_channel();
    let service = CheckoutService::new(db.clone(), events);

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
    let mugs = create_product(
        &db,
        "MUG-01",
        "Stoneware Mug",
        dec!(3),
        dec!(8),
        5,
        ProductStatus::Approved,
    )
    .await;
    set_stock(&db, beans.id, store.id, 10).await;
    set_stock(&db, mugs.id, store.id, 3).await;

    let err = service
        .checkout(CheckoutInput {
            location_id: store.id,
            payment_method: "CASH".to_string(),
            total_amount: dec!(100),
            customer_id: None,
            lines: vec![
                CheckoutLine {
                    product_id: beans.id,
                    quantity: 2,
                },
                CheckoutLine {
                    product_id: mugs.id,
                    quantity: 4, // only 3 available
                },
            ],
        })
        .await
        .expect_err("checkout must fail");

    match &err {
        ServiceError::InsufficientStock(msg) => {
            assert!(msg.contains("Stoneware Mug"));
            assert!(msg.contains("3"));
        }
        other => panic!("expected InsufficientStock, got {:?}", other),
    }

    // Nothing persisted: no transaction, no items, no movements, stock intact
    assert_eq!(count_transactions(&db).await, 0);
    assert_eq!(count_transaction_items(&db).await, 0);
    assert_eq!(count_movements_for(&db, beans.id).await, 0);
    assert_eq!(stock_at(&db, beans.id, store.id).await, Some(10));
    assert_eq!(stock_at(&db, mugs.id, store.id).await, Some(3));
}

#[tokio::test]
async fn unapproved_products_cannot_be_sold() {
    let db = setup_db().await;
    let (events, _rx) = event_channel();
    let service = CheckoutService::new(db.clone(), events);

    let store = create_location(&db, "Downtown Store", LocationKind::Store).await;
    let pending = create_product(
        &db,
        "NEW-01",
        "Unreviewed Widget",
        dec!(1),
        dec!(2),
        5,
        ProductStatus::Pending,
    )
    .await;
    set_stock(&db, pending.id, store.id, 10).await;

    let err = service
        .checkout(CheckoutInput {
            location_id: store.id,
            payment_method: "CARD".to_string(),
            total_amount: dec!(2),
            customer_id: None,
            lines: vec![CheckoutLine {
                product_id: pending.id,
                quantity: 1,
            }],
        })
        .await
        .expect_err("pending products must be rejected");

    assert!(matches!(err, ServiceError::InvalidOperation(_)));
    assert_eq!(count_transactions(&db).await, 0);
    assert_eq!(stock_at(&db, pending.id, store.id).await, Some(10));
}

#[tokio::test]
async fn empty_carts_and_unknown_locations_are_rejected() {
    let db = setup_db().await;
    let (events, _rx) = event_channel();
    let service = CheckoutService::new(db.clone(), events);

    let store = create_location(&db, "Downtown Store", LocationKind::Store).await;

    let err = service
        .checkout(CheckoutInput {
            location_id: store.id,
            payment_method: "CASH".to_string(),
            total_amount: dec!(0),
            customer_id: None,
            lines: vec![],
        })
        .await
        .expect_err("empty cart must be rejected");
    assert!(matches!(err, ServiceError::ValidationError(_)));

    let approved = create_product(
        &db,
        "OK-01",
        "Widget",
        dec!(1),
        dec!(2),
        5,
        ProductStatus::Approved,
    )
    .await;

    let err = service
        .checkout(CheckoutInput {
            location_id: Uuid::new_v4(),
            payment_method: "CASH".to_string(),
            total_amount: dec!(2),
            customer_id: None,
            lines: vec![CheckoutLine {
                product_id: approved.id,
                quantity: 1,
            }],
        })
        .await
        .expect_err("unknown location must be rejected");
    assert!(matches!(err, ServiceError::NotFound(_)));
}
