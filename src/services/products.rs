use crate::{
    db::DbPool,
    entities::{
        inventory_level, location,
        product::{self, ProductStatus},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

/// Fields accepted when registering a product. Prices default to zero and
/// the reorder level to 5 when not supplied.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub category: String,
    pub barcode: Option<String>,
    pub image_url: Option<String>,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub tax_pct: Decimal,
    pub reorder_level: i32,
}

/// Per-location stock breakdown attached to a product listing row.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductLocationStock {
    pub location_id: Uuid,
    pub location_name: String,
    pub quantity: i32,
}

/// Product plus its inventory across locations.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductWithStock {
    pub product: product::Model,
    pub total_stock: i64,
    pub inventory: Vec<ProductLocationStock>,
}

/// Outcome of a bulk import: how many rows landed, and why the rest did not.
#[derive(Debug, Serialize, ToSchema)]
pub struct ImportSummary {
    pub created: usize,
    pub errors: Vec<String>,
}

/// Catalog management: creation, bulk import, listing, and the approval
/// workflow.
#[derive(Clone)]
pub struct ProductCatalogService {
    db: Arc<DbPool>,
    event_sender: EventSender,
}

impl ProductCatalogService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    async fn insert_product<C: ConnectionTrait>(
        conn: &C,
        input: &CreateProductInput,
    ) -> Result<product::Model, ServiceError> {
        if input.name.trim().is_empty()
            || input.sku.trim().is_empty()
            || input.category.trim().is_empty()
        {
            return Err(ServiceError::ValidationError(
                "name, sku and category are required".to_string(),
            ));
        }

        // Check-then-insert: the unique index on sku is the backstop for the
        // race window between these two statements.
        let existing = product::Entity::find()
            .filter(product::Column::Sku.eq(input.sku.trim()))
            .one(conn)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::InvalidOperation(format!(
                "product with SKU {} already exists",
                input.sku.trim()
            )));
        }

        let now = Utc::now();
        let model = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            sku: Set(input.sku.trim().to_string()),
            name: Set(input.name.trim().to_string()),
            description: Set(input.description.clone()),
            category: Set(input.category.trim().to_string()),
            barcode: Set(input.barcode.clone()),
            image_url: Set(input.image_url.clone()),
            cost_price: Set(input.cost_price),
            selling_price: Set(input.selling_price),
            tax_pct: Set(input.tax_pct),
            reorder_level: Set(input.reorder_level),
            status: Set(ProductStatus::Pending),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(model.insert(conn).await?)
    }

    /// Registers a new product in `Pending` status.
    #[instrument(skip(self, input), fields(sku = %input.sku))]
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<product::Model, ServiceError> {
        let created = Self::insert_product(self.db.as_ref(), &input).await?;

        info!(product_id = %created.id, sku = %created.sku, "product created");
        self.event_sender
            .publish(Event::ProductCreated(created.id))
            .await;

        Ok(created)
    }

    /// Bulk import with per-row isolation: rows that collide on SKU or fail
    /// validation are reported and skipped, the rest are inserted.
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub async fn import_products(
        &self,
        rows: Vec<CreateProductInput>,
    ) -> Result<ImportSummary, ServiceError> {
        if rows.is_empty() {
            return Err(ServiceError::ValidationError(
                "import payload must contain at least one product".to_string(),
            ));
        }

        let db = self.db.as_ref();
        let mut created = 0usize;
        let mut errors = Vec::new();

        for row in &rows {
            match Self::insert_product(db, row).await {
                Ok(_) => created += 1,
                Err(ServiceError::InvalidOperation(_)) => {
                    errors.push(format!("SKU {} already exists. Skipped.", row.sku.trim()));
                }
                Err(err) => {
                    errors.push(format!(
                        "Failed to import {}: {}",
                        if row.sku.trim().is_empty() {
                            "unknown product"
                        } else {
                            row.sku.trim()
                        },
                        err
                    ));
                }
            }
        }

        info!(created, skipped = errors.len(), "product import finished");

        Ok(ImportSummary { created, errors })
    }

    /// Full catalog, newest first, with per-location inventory.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<ProductWithStock>, ServiceError> {
        let db = self.db.as_ref();

        let products = product::Entity::find()
            .order_by_desc(product::Column::CreatedAt)
            .all(db)
            .await?;

        let levels = inventory_level::Entity::find().all(db).await?;
        let locations: HashMap<Uuid, String> = location::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|l| (l.id, l.name))
            .collect();

        let mut by_product: HashMap<Uuid, Vec<ProductLocationStock>> = HashMap::new();
        for level in levels {
            let location_name = locations
                .get(&level.location_id)
                .cloned()
                .unwrap_or_default();
            by_product
                .entry(level.product_id)
                .or_default()
                .push(ProductLocationStock {
                    location_id: level.location_id,
                    location_name,
                    quantity: level.quantity,
                });
        }

        Ok(products
            .into_iter()
            .map(|p| {
                let inventory = by_product.remove(&p.id).unwrap_or_default();
                let total_stock = inventory.iter().map(|row| i64::from(row.quantity)).sum();
                ProductWithStock {
                    product: p,
                    total_stock,
                    inventory,
                }
            })
            .collect())
    }

    /// Looks up one product.
    pub async fn get_product(&self, product_id: Uuid) -> Result<product::Model, ServiceError> {
        product::Entity::find_by_id(product_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("product {} not found", product_id)))
    }

    /// Approval workflow: `Pending` moves to `Approved` or `Rejected`
    /// exactly once. Every other transition is refused.
    #[instrument(skip(self))]
    pub async fn review_product(
        &self,
        product_id: Uuid,
        decision: ProductStatus,
    ) -> Result<product::Model, ServiceError> {
        if decision == ProductStatus::Pending {
            return Err(ServiceError::InvalidInput(
                "status must be APPROVED or REJECTED".to_string(),
            ));
        }

        let existing = self.get_product(product_id).await?;

        if existing.status != ProductStatus::Pending {
            return Err(ServiceError::InvalidOperation(format!(
                "cannot move product from {} to {}",
                existing.status, decision
            )));
        }

        let mut active: product::ActiveModel = existing.into();
        active.status = Set(decision);
        active.updated_at = Set(Utc::now());
        let updated = active.update(self.db.as_ref()).await?;

        info!(product_id = %updated.id, status = %updated.status, "product reviewed");
        self.event_sender
            .publish(Event::ProductReviewed {
                product_id: updated.id,
                status: updated.status.to_string(),
            })
            .await;

        Ok(updated)
    }
}
