#![allow(dead_code)]

use chrono::Utc;
use retail_api::db::{establish_connection_with_config, run_migrations, DbConfig, DbPool};
use retail_api::entities::{
    customer, inventory_level,
    location::{self, LocationKind},
    product::{self, ProductStatus},
    sales_transaction::{self, TransactionStatus},
    stock_movement, transaction_item,
};
use retail_api::events::{Event, EventSender};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Fresh in-memory SQLite database with the embedded migrations applied.
/// A single connection keeps every statement on the same in-memory store.
pub async fn setup_db() -> Arc<DbPool> {
    let config = DbConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        ..Default::default()
    };
    let db = establish_connection_with_config(&config)
        .await
        .expect("Failed to create test database");
    run_migrations(&db).await.expect("Failed to run migrations");
    Arc::new(db)
}

/// Event channel for service construction. Keep the receiver alive for the
/// duration of the test so post-commit publishes have somewhere to go.
pub fn event_channel() -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(64);
    (EventSender::new(tx), rx)
}

pub async fn create_location(db: &DbPool, name: &str, kind: LocationKind) -> location::Model {
    location::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        kind: Set(kind),
        address: Set(None),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to create location")
}

pub async fn create_product(
    db: &DbPool,
    sku: &str,
    name: &str,
    cost_price: Decimal,
    selling_price: Decimal,
    reorder_level: i32,
    status: ProductStatus,
) -> product::Model {
    let now = Utc::now();
    product::ActiveModel {
        id: Set(Uuid::new_v4()),
        sku: Set(sku.to_string()),
        name: Set(name.to_string()),
        description: Set(None),
        category: Set("General".to_string()),
        barcode: Set(None),
        image_url: Set(None),
        cost_price: Set(cost_price),
        selling_price: Set(selling_price),
        tax_pct: Set(Decimal::ZERO),
        reorder_level: Set(reorder_level),
        status: Set(status),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to create product")
}

pub async fn set_stock(db: &DbPool, product_id: Uuid, location_id: Uuid, quantity: i32) {
    inventory_level::ActiveModel {
        product_id: Set(product_id),
        location_id: Set(location_id),
        quantity: Set(quantity),
        updated_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to seed inventory");
}

pub async fn stock_at(db: &DbPool, product_id: Uuid, location_id: Uuid) -> Option<i32> {
    inventory_level::Entity::find_by_id((product_id, location_id))
        .one(db)
        .await
        .expect("Failed to query inventory")
        .map(|level| level.quantity)
}

pub async fn create_customer(db: &DbPool, name: &str) -> customer::Model {
    customer::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(None),
        phone: Set(None),
        loyalty_points: Set(0),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to create customer")
}

pub async fn create_transaction(
    db: &DbPool,
    location_id: Uuid,
    customer_id: Option<Uuid>,
    total_amount: Decimal,
    status: TransactionStatus,
) -> sales_transaction::Model {
    sales_transaction::ActiveModel {
        id: Set(Uuid::new_v4()),
        invoice_number: Set(format!("INV-TEST-{}", Uuid::new_v4())),
        total_amount: Set(total_amount),
        payment_method: Set("CASH".to_string()),
        status: Set(status),
        source: Set("POS".to_string()),
        location_id: Set(location_id),
        customer_id: Set(customer_id),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to create transaction")
}

pub async fn create_transaction_item(
    db: &DbPool,
    transaction_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    unit_price: Decimal,
) -> transaction_item::Model {
    transaction_item::ActiveModel {
        id: Set(Uuid::new_v4()),
        transaction_id: Set(transaction_id),
        product_id: Set(product_id),
        quantity: Set(quantity),
        unit_price: Set(unit_price),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to create transaction item")
}

pub async fn count_transactions(db: &DbPool) -> u64 {
    sales_transaction::Entity::find()
        .count(db)
        .await
        .expect("Failed to count transactions")
}

pub async fn count_transaction_items(db: &DbPool) -> u64 {
    transaction_item::Entity::find()
        .count(db)
        .await
        .expect("Failed to count transaction items")
}

pub async fn count_movements_for(db: &DbPool, product_id: Uuid) -> u64 {
    stock_movement::Entity::find()
        .filter(stock_movement::Column::ProductId.eq(product_id))
        .count(db)
        .await
        .expect("Failed to count stock movements")
}

pub async fn movements_for(db: &DbPool, product_id: Uuid) -> Vec<stock_movement::Model> {
    stock_movement::Entity::find()
        .filter(stock_movement::Column::ProductId.eq(product_id))
        .all(db)
        .await
        .expect("Failed to load stock movements")
}
