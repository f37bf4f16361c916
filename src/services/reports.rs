use crate::{
    db::DbPool,
    entities::{
        customer, inventory_level, product,
        sales_transaction::{self, TransactionStatus},
        transaction_item,
    },
    errors::ServiceError,
};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

/// Revenue and sales count over completed transactions.
#[derive(Debug, Serialize, ToSchema)]
pub struct SalesSummary {
    pub total_revenue: Decimal,
    pub total_sales: u64,
}

/// One row of the profit margin report.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfitMarginEntry {
    pub product_id: Uuid,
    pub name: String,
    pub sku: String,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub profit: Decimal,
    pub margin_pct: Decimal,
}

/// A product holding stock with no sales history, and the capital it ties up.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeadStockEntry {
    pub product_id: Uuid,
    pub name: String,
    pub sku: String,
    pub cost_price: Decimal,
    pub total_stock: i64,
    pub dead_capital: Decimal,
}

/// A customer with their derived purchase statistics.
#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerInsight {
    pub customer: customer::Model,
    pub transaction_count: u64,
    pub lifetime_value: Decimal,
}

/// Pure aggregation reads; nothing here mutates state.
#[derive(Clone)]
pub struct ReportService {
    db: Arc<DbPool>,
}

impl ReportService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Total revenue and count of completed transactions, optionally
    /// filtered to one location.
    #[instrument(skip(self))]
    pub async fn sales_summary(
        &self,
        location_id: Option<Uuid>,
    ) -> Result<SalesSummary, ServiceError> {
        let mut query = sales_transaction::Entity::find()
            .filter(sales_transaction::Column::Status.eq(TransactionStatus::Completed));
        if let Some(location_id) = location_id {
            query = query.filter(sales_transaction::Column::LocationId.eq(location_id));
        }

        let totals: Vec<Decimal> = query
            .select_only()
            .column(sales_transaction::Column::TotalAmount)
            .into_tuple()
            .all(self.db.as_ref())
            .await?;

        Ok(SalesSummary {
            total_revenue: totals.iter().copied().sum(),
            total_sales: totals.len() as u64,
        })
    }

    /// Per-product margin percentage, highest first. A zero selling price
    /// yields a zero margin rather than a division error.
    #[instrument(skip(self))]
    pub async fn profit_margins(&self) -> Result<Vec<ProfitMarginEntry>, ServiceError> {
        let products = product::Entity::find().all(self.db.as_ref()).await?;

        let hundred = Decimal::from(100);
        let mut entries: Vec<ProfitMarginEntry> = products
            .into_iter()
            .map(|p| {
                let profit = p.selling_price - p.cost_price;
                let margin_pct = if p.selling_price > Decimal::ZERO {
                    profit / p.selling_price * hundred
                } else {
                    Decimal::ZERO
                };
                ProfitMarginEntry {
                    product_id: p.id,
                    name: p.name,
                    sku: p.sku,
                    cost_price: p.cost_price,
                    selling_price: p.selling_price,
                    profit,
                    margin_pct,
                }
            })
            .collect();

        entries.sort_by(|a, b| b.margin_pct.cmp(&a.margin_pct));

        Ok(entries)
    }

    /// Products with stock on hand but not a single transaction item ever,
    /// valued at stock × cost price and sorted by tied-up capital.
    #[instrument(skip(self))]
    pub async fn dead_stock(&self) -> Result<Vec<DeadStockEntry>, ServiceError> {
        let db = self.db.as_ref();

        let products = product::Entity::find().all(db).await?;
        let levels = inventory_level::Entity::find().all(db).await?;

        let sold: HashSet<Uuid> = transaction_item::Entity::find()
            .select_only()
            .column(transaction_item::Column::ProductId)
            .distinct()
            .into_tuple()
            .all(db)
            .await?
            .into_iter()
            .collect();

        let mut totals: HashMap<Uuid, i64> = HashMap::new();
        for level in levels {
            *totals.entry(level.product_id).or_insert(0) += i64::from(level.quantity);
        }

        let mut entries: Vec<DeadStockEntry> = products
            .into_iter()
            .filter_map(|p| {
                let total_stock = totals.get(&p.id).copied().unwrap_or(0);
                if total_stock <= 0 || sold.contains(&p.id) {
                    return None;
                }
                let dead_capital = p.cost_price * Decimal::from(total_stock);
                Some(DeadStockEntry {
                    product_id: p.id,
                    name: p.name,
                    sku: p.sku,
                    cost_price: p.cost_price,
                    total_stock,
                    dead_capital,
                })
            })
            .collect();

        entries.sort_by(|a, b| b.dead_capital.cmp(&a.dead_capital));

        Ok(entries)
    }

    /// Customers with their transaction count and lifetime value, newest
    /// customers first. Lifetime value is derived here, never stored.
    #[instrument(skip(self))]
    pub async fn customer_insights(&self) -> Result<Vec<CustomerInsight>, ServiceError> {
        let db = self.db.as_ref();

        let customers = customer::Entity::find()
            .order_by_desc(customer::Column::CreatedAt)
            .all(db)
            .await?;

        let linked: Vec<(Option<Uuid>, Decimal)> = sales_transaction::Entity::find()
            .filter(sales_transaction::Column::CustomerId.is_not_null())
            .select_only()
            .column(sales_transaction::Column::CustomerId)
            .column(sales_transaction::Column::TotalAmount)
            .into_tuple()
            .all(db)
            .await?;

        let mut stats: HashMap<Uuid, (u64, Decimal)> = HashMap::new();
        for (customer_id, amount) in linked.into_iter() {
            if let Some(customer_id) = customer_id {
                let entry = stats.entry(customer_id).or_insert((0, Decimal::ZERO));
                entry.0 += 1;
                entry.1 += amount;
            }
        }

        Ok(customers
            .into_iter()
            .map(|c| {
                let (transaction_count, lifetime_value) =
                    stats.get(&c.id).copied().unwrap_or((0, Decimal::ZERO));
                CustomerInsight {
                    customer: c,
                    transaction_count,
                    lifetime_value,
                }
            })
            .collect())
    }
}
