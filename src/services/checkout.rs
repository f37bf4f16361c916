use crate::{
    db::DbPool,
    entities::{
        product::{self, ProductStatus},
        sales_transaction::{self, TransactionStatus},
        stock_movement, transaction_item,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::inventory::{apply_delta, ensure_location_exists},
};
use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

const POS_SOURCE: &str = "POS";

/// One cart line as submitted by the register.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutLine {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// A POS checkout request. `total_amount` is the register's stated total; it
/// is recorded as-is and not recomputed here.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutInput {
    pub location_id: Uuid,
    pub payment_method: String,
    pub total_amount: Decimal,
    pub customer_id: Option<Uuid>,
    pub lines: Vec<CheckoutLine>,
}

/// What the register gets back after a committed sale.
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutReceipt {
    pub transaction_id: Uuid,
    pub invoice_number: String,
}

fn pos_invoice_number() -> String {
    let suffix: u16 = rand::thread_rng().gen_range(0..1000);
    format!("INV-{}-{:03}", Utc::now().timestamp_millis(), suffix)
}

/// Converts a cart into one immutable sales transaction.
#[derive(Clone)]
pub struct CheckoutService {
    db: Arc<DbPool>,
    event_sender: EventSender,
}

impl CheckoutService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Runs the whole sale in one transaction: create the sales record,
    /// then per cart line verify sufficient stock, decrement it, and write
    /// the line item and its movement. Any failure rolls everything back —
    /// there is no partial deduction.
    #[instrument(skip(self, input), fields(location_id = %input.location_id, lines = input.lines.len()))]
    pub async fn checkout(&self, input: CheckoutInput) -> Result<CheckoutReceipt, ServiceError> {
        if input.lines.is_empty() {
            return Err(ServiceError::ValidationError(
                "checkout cart must not be empty".to_string(),
            ));
        }
        if input.payment_method.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "payment method is required".to_string(),
            ));
        }
        if input.lines.iter().any(|line| line.quantity <= 0) {
            return Err(ServiceError::InvalidInput(
                "cart line quantities must be positive".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        ensure_location_exists(&txn, input.location_id).await?;

        let invoice_number = pos_invoice_number();
        let transaction_id = Uuid::new_v4();

        let record = sales_transaction::ActiveModel {
            id: Set(transaction_id),
            invoice_number: Set(invoice_number.clone()),
            total_amount: Set(input.total_amount),
            payment_method: Set(input.payment_method.trim().to_string()),
            status: Set(TransactionStatus::Completed),
            source: Set(POS_SOURCE.to_string()),
            location_id: Set(input.location_id),
            customer_id: Set(input.customer_id),
            created_at: Set(Utc::now()),
        };
        record.insert(&txn).await?;

        for line in &input.lines {
            let item = product::Entity::find_by_id(line.product_id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("product {} not found", line.product_id))
                })?;

            if item.status != ProductStatus::Approved {
                return Err(ServiceError::InvalidOperation(format!(
                    "product {} is not approved for sale",
                    item.name
                )));
            }

            let available = crate::entities::inventory_level::Entity::find_by_id((
                item.id,
                input.location_id,
            ))
            .one(&txn)
            .await?
            .map(|level| level.quantity)
            .unwrap_or(0);

            if available < line.quantity {
                return Err(ServiceError::InsufficientStock(format!(
                    "insufficient stock for {}. Available: {}",
                    item.name, available
                )));
            }

            apply_delta(&txn, item.id, input.location_id, -line.quantity).await?;

            let line_item = transaction_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                transaction_id: Set(transaction_id),
                product_id: Set(item.id),
                quantity: Set(line.quantity),
                unit_price: Set(item.selling_price),
                created_at: Set(Utc::now()),
            };
            line_item.insert(&txn).await?;

            let movement = stock_movement::ActiveModel {
                id: Set(Uuid::new_v4()),
                product_id: Set(item.id),
                from_location_id: Set(Some(input.location_id)),
                to_location_id: Set(None),
                quantity: Set(line.quantity),
                reason: Set(format!("POS sale {}", invoice_number)),
                created_at: Set(Utc::now()),
            };
            movement.insert(&txn).await?;
        }

        txn.commit().await?;

        info!(%transaction_id, %invoice_number, "checkout committed");

        self.event_sender
            .publish(Event::CheckoutCompleted {
                transaction_id,
                location_id: input.location_id,
                total_amount: input.total_amount,
            })
            .await;

        Ok(CheckoutReceipt {
            transaction_id,
            invoice_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoice_numbers_carry_the_pos_prefix() {
        let invoice = pos_invoice_number();
        assert!(invoice.starts_with("INV-"));
        // prefix, millisecond timestamp, three-digit suffix
        assert_eq!(invoice.split('-').count(), 3);
    }
}
