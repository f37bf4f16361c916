use crate::{
    db::DbPool,
    entities::{inventory_level, location, product, stock_movement},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

/// Manual stock adjustment: a signed delta plus the mandatory reason that
/// ends up in the movement audit log.
#[derive(Debug, Clone, Deserialize)]
pub struct StockAdjustment {
    pub product_id: Uuid,
    pub location_id: Uuid,
    pub quantity: i32,
    pub reason: String,
}

/// Stock transfer between two distinct locations.
#[derive(Debug, Clone, Deserialize)]
pub struct StockTransfer {
    pub product_id: Uuid,
    pub from_location_id: Uuid,
    pub to_location_id: Uuid,
    pub quantity: i32,
}

/// Both sides of a committed transfer.
#[derive(Debug, Serialize, ToSchema)]
pub struct TransferOutcome {
    pub source_inventory: inventory_level::Model,
    pub dest_inventory: inventory_level::Model,
}

/// One row of the inventory listing, joined with its product and location.
#[derive(Debug, Serialize, ToSchema)]
pub struct InventoryRow {
    pub product_id: Uuid,
    pub product_name: String,
    pub sku: String,
    pub location_id: Uuid,
    pub location_name: String,
    pub quantity: i32,
}

/// A product whose summed stock across all locations is at or below its
/// reorder level.
#[derive(Debug, Serialize, ToSchema)]
pub struct LowStockAlert {
    pub product: product::Model,
    pub total_stock: i64,
}

/// Applies a relative quantity change to an existing inventory row and
/// returns the updated row, or `None` when no row exists for the compound
/// key. The increment happens in the store, not via read-modify-write in
/// application code, so concurrent writers cannot lose updates.
pub(crate) async fn apply_delta<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    location_id: Uuid,
    delta: i32,
) -> Result<Option<inventory_level::Model>, ServiceError> {
    let result = inventory_level::Entity::update_many()
        .col_expr(
            inventory_level::Column::Quantity,
            Expr::col(inventory_level::Column::Quantity).add(delta),
        )
        .col_expr(inventory_level::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(inventory_level::Column::ProductId.eq(product_id))
        .filter(inventory_level::Column::LocationId.eq(location_id))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Ok(None);
    }

    let level = inventory_level::Entity::find_by_id((product_id, location_id))
        .one(conn)
        .await?
        .ok_or_else(|| {
            ServiceError::InternalError("inventory row vanished mid-transaction".to_string())
        })?;

    Ok(Some(level))
}

/// Like [`apply_delta`], but creates the row (seeded with the delta) when it
/// does not exist yet.
pub(crate) async fn upsert_delta<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    location_id: Uuid,
    delta: i32,
) -> Result<inventory_level::Model, ServiceError> {
    if let Some(level) = apply_delta(conn, product_id, location_id, delta).await? {
        return Ok(level);
    }

    let level = inventory_level::ActiveModel {
        product_id: Set(product_id),
        location_id: Set(location_id),
        quantity: Set(delta),
        updated_at: Set(Utc::now()),
    };

    Ok(level.insert(conn).await?)
}

pub(crate) async fn ensure_product_exists<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
) -> Result<product::Model, ServiceError> {
    product::Entity::find_by_id(product_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("product {} not found", product_id)))
}

pub(crate) async fn ensure_location_exists<C: ConnectionTrait>(
    conn: &C,
    location_id: Uuid,
) -> Result<location::Model, ServiceError> {
    location::Entity::find_by_id(location_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("location {} not found", location_id)))
}

/// Service for stock mutations and inventory reads.
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DbPool>,
    event_sender: EventSender,
}

impl InventoryService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Applies a signed manual adjustment in a single transaction: upsert
    /// the row by incrementing its quantity, then verify the result is not
    /// negative — a violation aborts everything. One movement row records
    /// the change under the given reason.
    #[instrument(skip(self))]
    pub async fn adjust_stock(
        &self,
        adjustment: StockAdjustment,
    ) -> Result<inventory_level::Model, ServiceError> {
        if adjustment.reason.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "adjustment reason is required".to_string(),
            ));
        }
        if adjustment.quantity == 0 {
            return Err(ServiceError::InvalidInput(
                "adjustment quantity must be non-zero".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        ensure_product_exists(&txn, adjustment.product_id).await?;
        ensure_location_exists(&txn, adjustment.location_id).await?;

        let level = upsert_delta(
            &txn,
            adjustment.product_id,
            adjustment.location_id,
            adjustment.quantity,
        )
        .await?;

        if level.quantity < 0 {
            txn.rollback().await?;
            return Err(ServiceError::InsufficientStock(format!(
                "insufficient stock. Cannot reduce by {}",
                adjustment.quantity.abs()
            )));
        }

        let movement = stock_movement::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(adjustment.product_id),
            from_location_id: Set((adjustment.quantity < 0).then_some(adjustment.location_id)),
            to_location_id: Set((adjustment.quantity > 0).then_some(adjustment.location_id)),
            quantity: Set(adjustment.quantity.abs()),
            reason: Set(adjustment.reason.trim().to_string()),
            created_at: Set(Utc::now()),
        };
        movement.insert(&txn).await?;

        txn.commit().await?;

        info!(
            product_id = %adjustment.product_id,
            location_id = %adjustment.location_id,
            delta = adjustment.quantity,
            new_quantity = level.quantity,
            "stock adjusted"
        );

        self.event_sender
            .publish(Event::StockAdjusted {
                product_id: adjustment.product_id,
                location_id: adjustment.location_id,
                delta: adjustment.quantity,
                new_quantity: level.quantity,
            })
            .await;

        Ok(level)
    }

    /// Moves quantity between two locations atomically: decrement source,
    /// verify it did not go negative, upsert-increment destination, and
    /// record exactly one movement carrying both endpoints.
    #[instrument(skip(self))]
    pub async fn transfer_stock(
        &self,
        transfer: StockTransfer,
    ) -> Result<TransferOutcome, ServiceError> {
        if transfer.quantity <= 0 {
            return Err(ServiceError::InvalidInput(
                "transfer quantity must be positive".to_string(),
            ));
        }
        if transfer.from_location_id == transfer.to_location_id {
            return Err(ServiceError::ValidationError(
                "source and destination locations cannot be the same".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        ensure_product_exists(&txn, transfer.product_id).await?;
        ensure_location_exists(&txn, transfer.from_location_id).await?;
        ensure_location_exists(&txn, transfer.to_location_id).await?;

        let source = apply_delta(
            &txn,
            transfer.product_id,
            transfer.from_location_id,
            -transfer.quantity,
        )
        .await?
        .ok_or_else(|| {
            ServiceError::InvalidOperation(
                "no inventory record found at source location".to_string(),
            )
        })?;

        if source.quantity < 0 {
            txn.rollback().await?;
            return Err(ServiceError::InsufficientStock(
                "insufficient stock at source location".to_string(),
            ));
        }

        let destination = upsert_delta(
            &txn,
            transfer.product_id,
            transfer.to_location_id,
            transfer.quantity,
        )
        .await?;

        let movement = stock_movement::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(transfer.product_id),
            from_location_id: Set(Some(transfer.from_location_id)),
            to_location_id: Set(Some(transfer.to_location_id)),
            quantity: Set(transfer.quantity),
            reason: Set("Transfer".to_string()),
            created_at: Set(Utc::now()),
        };
        movement.insert(&txn).await?;

        txn.commit().await?;

        info!(
            product_id = %transfer.product_id,
            from = %transfer.from_location_id,
            to = %transfer.to_location_id,
            quantity = transfer.quantity,
            "stock transferred"
        );

        self.event_sender
            .publish(Event::StockTransferred {
                product_id: transfer.product_id,
                from_location_id: transfer.from_location_id,
                to_location_id: transfer.to_location_id,
                quantity: transfer.quantity,
            })
            .await;

        Ok(TransferOutcome {
            source_inventory: source,
            dest_inventory: destination,
        })
    }

    /// Inventory listing, optionally scoped to one location.
    #[instrument(skip(self))]
    pub async fn list_levels(
        &self,
        location_id: Option<Uuid>,
    ) -> Result<Vec<InventoryRow>, ServiceError> {
        let db = self.db.as_ref();

        let mut query = inventory_level::Entity::find();
        if let Some(location_id) = location_id {
            query = query.filter(inventory_level::Column::LocationId.eq(location_id));
        }
        let levels = query
            .find_also_related(product::Entity)
            .all(db)
            .await?;

        let locations: HashMap<Uuid, String> = location::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|l| (l.id, l.name))
            .collect();

        let rows = levels
            .into_iter()
            .filter_map(|(level, maybe_product)| {
                let product = maybe_product?;
                let location_name = locations.get(&level.location_id)?.clone();
                Some(InventoryRow {
                    product_id: level.product_id,
                    product_name: product.name,
                    sku: product.sku,
                    location_id: level.location_id,
                    location_name,
                    quantity: level.quantity,
                })
            })
            .collect();

        Ok(rows)
    }

    /// Products whose total stock across all locations has fallen to or
    /// below their reorder level, lowest totals first.
    #[instrument(skip(self))]
    pub async fn low_stock_alerts(&self) -> Result<Vec<LowStockAlert>, ServiceError> {
        let db = self.db.as_ref();

        let products = product::Entity::find()
            .order_by_asc(product::Column::Name)
            .all(db)
            .await?;
        let levels = inventory_level::Entity::find().all(db).await?;

        let mut totals: HashMap<Uuid, i64> = HashMap::new();
        for level in levels {
            *totals.entry(level.product_id).or_insert(0) += i64::from(level.quantity);
        }

        let mut alerts: Vec<LowStockAlert> = products
            .into_iter()
            .filter_map(|p| {
                let total_stock = totals.get(&p.id).copied().unwrap_or(0);
                (total_stock <= i64::from(p.reorder_level)).then_some(LowStockAlert {
                    product: p,
                    total_stock,
                })
            })
            .collect();

        alerts.sort_by_key(|alert| alert.total_stock);

        Ok(alerts)
    }
}
