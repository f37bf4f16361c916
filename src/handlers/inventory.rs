use crate::auth::consts as perm;
use crate::auth::{AuthRouterExt, AuthUser};
use crate::entities::inventory_level;
use crate::handlers::common::validate_input;
use crate::services::inventory::{
    InventoryRow, LowStockAlert, StockAdjustment, StockTransfer, TransferOutcome,
};
use crate::{ApiResponse, ApiResult, AppState};
use axum::{
    extract::{Json, Query, State},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Inventory routes. Reads, adjustments, and transfers carry separate
/// permissions so the warehouse and inventory roles stay distinct.
pub fn inventory_routes() -> Router<AppState> {
    let read = Router::new()
        .route("/", get(list_inventory))
        .route("/low-stock", get(low_stock))
        .with_permission(perm::INVENTORY_READ);

    let adjust = Router::new()
        .route("/adjust", post(adjust_stock))
        .with_permission(perm::INVENTORY_ADJUST);

    let transfer = Router::new()
        .route("/transfer", post(transfer_stock))
        .with_permission(perm::INVENTORY_TRANSFER);

    Router::new().merge(read).merge(adjust).merge(transfer)
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct InventoryListQuery {
    /// Restrict the listing to one location
    pub location_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AdjustStockRequest {
    #[serde(alias = "productId")]
    pub product_id: Uuid,
    #[serde(alias = "locationId")]
    pub location_id: Uuid,
    /// Signed delta: positive adds stock, negative removes it
    pub quantity: i32,
    #[validate(length(min = 1, message = "reason is required"))]
    pub reason: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TransferStockRequest {
    #[serde(alias = "productId")]
    pub product_id: Uuid,
    #[serde(alias = "fromLocationId")]
    pub from_location_id: Uuid,
    #[serde(alias = "toLocationId")]
    pub to_location_id: Uuid,
    #[validate(range(min = 1, message = "quantity must be positive"))]
    pub quantity: i32,
}

/// List inventory levels
#[utoipa::path(
    get,
    path = "/api/v1/inventory",
    params(InventoryListQuery),
    responses(
        (status = 200, description = "Inventory levels", body = ApiResponse<Vec<InventoryRow>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Inventory"
)]
pub async fn list_inventory(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<InventoryListQuery>,
) -> ApiResult<Vec<InventoryRow>> {
    let rows = state
        .services
        .inventory
        .list_levels(query.location_id)
        .await?;

    Ok(axum::Json(ApiResponse::success(rows)))
}

/// Products at or below their reorder level
#[utoipa::path(
    get,
    path = "/api/v1/inventory/low-stock",
    responses(
        (status = 200, description = "Low stock alerts", body = ApiResponse<Vec<LowStockAlert>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Inventory"
)]
pub async fn low_stock(
    _user: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Vec<LowStockAlert>> {
    let alerts = state.services.inventory.low_stock_alerts().await?;

    Ok(axum::Json(ApiResponse::success(alerts)))
}

/// Manually adjust stock at a location
#[utoipa::path(
    post,
    path = "/api/v1/inventory/adjust",
    request_body = AdjustStockRequest,
    responses(
        (status = 200, description = "Updated inventory row", body = ApiResponse<inventory_level::Model>),
        (status = 400, description = "Insufficient stock or invalid payload", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Inventory"
)]
pub async fn adjust_stock(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<AdjustStockRequest>,
) -> ApiResult<inventory_level::Model> {
    validate_input(&payload)?;

    debug!(actor = %user.email, product_id = %payload.product_id, "stock adjustment requested");

    let level = state
        .services
        .inventory
        .adjust_stock(StockAdjustment {
            product_id: payload.product_id,
            location_id: payload.location_id,
            quantity: payload.quantity,
            reason: payload.reason,
        })
        .await?;

    Ok(axum::Json(ApiResponse::success(level)))
}

/// Transfer stock between locations
#[utoipa::path(
    post,
    path = "/api/v1/inventory/transfer",
    request_body = TransferStockRequest,
    responses(
        (status = 200, description = "Both sides of the transfer", body = ApiResponse<TransferOutcome>),
        (status = 400, description = "Insufficient stock at source or invalid payload", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Inventory"
)]
pub async fn transfer_stock(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<TransferStockRequest>,
) -> ApiResult<TransferOutcome> {
    validate_input(&payload)?;

    debug!(actor = %user.email, product_id = %payload.product_id, "stock transfer requested");

    let outcome = state
        .services
        .inventory
        .transfer_stock(StockTransfer {
            product_id: payload.product_id,
            from_location_id: payload.from_location_id,
            to_location_id: payload.to_location_id,
            quantity: payload.quantity,
        })
        .await?;

    Ok(axum::Json(ApiResponse::success(outcome)))
}
