use crate::{
    db::DbPool,
    entities::{
        location::{self, LocationKind},
        product,
        sales_transaction::{self, TransactionStatus},
        stock_movement, transaction_item,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::inventory::upsert_delta,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

const ONLINE_PAYMENT_METHOD: &str = "ONLINE";
const DEFAULT_SOURCE: &str = "ONLINE_STORE";

/// One line of an externally fulfilled order, priced by the remote platform.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookOrderLine {
    pub sku: String,
    pub quantity: i32,
    pub price: Decimal,
}

/// An e-commerce order pushed in by webhook.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookOrder {
    pub order_id: String,
    pub source: Option<String>,
    pub location_id: Option<Uuid>,
    pub items: Vec<WebhookOrderLine>,
}

/// Result of ingesting one webhook order.
#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookOrderOutcome {
    pub transaction_id: Uuid,
    pub invoice_number: String,
    pub fulfilled_lines: usize,
    /// SKUs present in the payload that no product matched. These lines are
    /// skipped, not failed, so the rest of the order still lands.
    pub skipped_skus: Vec<String>,
}

/// Ingests externally fulfilled orders.
///
/// This path intentionally skips the non-negative stock check: online
/// orders may oversell, and a negative on-hand figure is how fulfillment
/// backlog is surfaced to operators.
#[derive(Clone)]
pub struct WebhookOrderService {
    db: Arc<DbPool>,
    event_sender: EventSender,
}

impl WebhookOrderService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Picks the fulfillment site when the payload names none: the first
    /// warehouse by creation order, else the first location of any kind.
    async fn resolve_fulfillment_location<C: ConnectionTrait>(
        conn: &C,
    ) -> Result<location::Model, ServiceError> {
        if let Some(warehouse) = location::Entity::find()
            .filter(location::Column::Kind.eq(LocationKind::Warehouse))
            .order_by_asc(location::Column::CreatedAt)
            .one(conn)
            .await?
        {
            return Ok(warehouse);
        }

        location::Entity::find()
            .order_by_asc(location::Column::CreatedAt)
            .one(conn)
            .await?
            .ok_or_else(|| {
                ServiceError::InternalError("no locations available for fulfillment".to_string())
            })
    }

    #[instrument(skip(self, order), fields(order_id = %order.order_id, lines = order.items.len()))]
    pub async fn ingest(&self, order: WebhookOrder) -> Result<WebhookOrderOutcome, ServiceError> {
        if order.order_id.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "webhook payload must carry an order id".to_string(),
            ));
        }

        let source = order
            .source
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SOURCE)
            .to_string();

        let txn = self.db.begin().await?;

        let fulfillment_location = match order.location_id {
            Some(id) => location::Entity::find_by_id(id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::ValidationError(format!("location {} not found", id))
                })?,
            None => Self::resolve_fulfillment_location(&txn).await?,
        };

        let total_amount: Decimal = order
            .items
            .iter()
            .map(|item| item.price * Decimal::from(item.quantity))
            .sum();

        let invoice_number = format!(
            "WEB-{}-{}-{}",
            source,
            order.order_id,
            Utc::now().timestamp_millis()
        );
        let transaction_id = Uuid::new_v4();

        let record = sales_transaction::ActiveModel {
            id: Set(transaction_id),
            invoice_number: Set(invoice_number.clone()),
            total_amount: Set(total_amount),
            payment_method: Set(ONLINE_PAYMENT_METHOD.to_string()),
            status: Set(TransactionStatus::Completed),
            source: Set(source.clone()),
            location_id: Set(fulfillment_location.id),
            customer_id: Set(None),
            created_at: Set(Utc::now()),
        };
        record.insert(&txn).await?;

        let mut fulfilled_lines = 0usize;
        let mut skipped_skus = Vec::new();

        for item in &order.items {
            let matched = product::Entity::find()
                .filter(product::Column::Sku.eq(item.sku.as_str()))
                .one(&txn)
                .await?;

            let Some(matched) = matched else {
                warn!(sku = %item.sku, "product not found, skipping stock deduction");
                skipped_skus.push(item.sku.clone());
                continue;
            };

            // No post-check here: negative quantities are allowed.
            upsert_delta(&txn, matched.id, fulfillment_location.id, -item.quantity).await?;

            let line_item = transaction_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                transaction_id: Set(transaction_id),
                product_id: Set(matched.id),
                quantity: Set(item.quantity),
                unit_price: Set(item.price),
                created_at: Set(Utc::now()),
            };
            line_item.insert(&txn).await?;

            let movement = stock_movement::ActiveModel {
                id: Set(Uuid::new_v4()),
                product_id: Set(matched.id),
                from_location_id: Set(Some(fulfillment_location.id)),
                to_location_id: Set(None),
                quantity: Set(item.quantity),
                reason: Set(format!("Online order #{} ({})", order.order_id, source)),
                created_at: Set(Utc::now()),
            };
            movement.insert(&txn).await?;

            fulfilled_lines += 1;
        }

        txn.commit().await?;

        info!(
            %transaction_id,
            %invoice_number,
            fulfilled_lines,
            skipped = skipped_skus.len(),
            "webhook order ingested"
        );

        self.event_sender
            .publish(Event::WebhookOrderFulfilled {
                transaction_id,
                order_id: order.order_id.clone(),
                source,
                fulfilled_lines,
                skipped_lines: skipped_skus.len(),
            })
            .await;

        Ok(WebhookOrderOutcome {
            transaction_id,
            invoice_number,
            fulfilled_lines,
            skipped_skus,
        })
    }
}
