use crate::auth::consts as perm;
use crate::auth::{AuthRouterExt, AuthUser};
use crate::entities::product::{self, ProductStatus};
use crate::handlers::common::{
    created_response, ensure_decimal_non_negative, ensure_i32_non_negative,
    normalize_optional_string, normalize_string,
};
use crate::services::products::{CreateProductInput, ImportSummary, ProductWithStock};
use crate::{errors::ServiceError, ApiResponse, ApiResult, AppState};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;

const DEFAULT_REORDER_LEVEL: i32 = 5;

/// Product catalog routes: listing for every authenticated role, creation
/// and import for inventory-capable roles, approval for Super Admin only.
pub fn products_routes() -> Router<AppState> {
    let read = Router::new()
        .route("/", get(list_products))
        .with_permission(perm::PRODUCTS_READ);

    let create = Router::new()
        .route("/", post(create_product))
        .route("/import", post(import_products))
        .with_permission(perm::PRODUCTS_CREATE);

    let approve = Router::new()
        .route("/:id/approve", put(review_product))
        .with_permission(perm::PRODUCTS_APPROVE);

    Router::new().merge(read).merge(create).merge(approve)
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub category: String,
    pub barcode: Option<String>,
    #[serde(alias = "imageUrl")]
    pub image_url: Option<String>,
    #[serde(alias = "costPrice")]
    pub cost_price: Option<Decimal>,
    #[serde(alias = "sellingPrice")]
    pub selling_price: Option<Decimal>,
    #[serde(alias = "taxPct")]
    pub tax_pct: Option<Decimal>,
    #[serde(alias = "reorderLevel")]
    pub reorder_level: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ImportProductsRequest {
    pub products: Vec<CreateProductRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewProductRequest {
    /// APPROVED or REJECTED
    pub status: ProductStatus,
}

fn normalize_request(payload: CreateProductRequest) -> Result<CreateProductInput, ServiceError> {
    let name = normalize_string(payload.name);
    if name.is_empty() {
        return Err(ServiceError::ValidationError(
            "Product name cannot be blank".to_string(),
        ));
    }

    let sku = normalize_string(payload.sku);
    if sku.is_empty() {
        return Err(ServiceError::ValidationError(
            "SKU cannot be blank".to_string(),
        ));
    }

    let category = normalize_string(payload.category);
    if category.is_empty() {
        return Err(ServiceError::ValidationError(
            "Category cannot be blank".to_string(),
        ));
    }

    let cost_price = payload.cost_price.unwrap_or(Decimal::ZERO);
    let selling_price = payload.selling_price.unwrap_or(Decimal::ZERO);
    let tax_pct = payload.tax_pct.unwrap_or(Decimal::ZERO);
    let reorder_level = payload.reorder_level.unwrap_or(DEFAULT_REORDER_LEVEL);

    ensure_decimal_non_negative(&cost_price, "cost_price")?;
    ensure_decimal_non_negative(&selling_price, "selling_price")?;
    ensure_decimal_non_negative(&tax_pct, "tax_pct")?;
    ensure_i32_non_negative(reorder_level, "reorder_level")?;

    Ok(CreateProductInput {
        name,
        sku,
        description: normalize_optional_string(payload.description),
        category,
        barcode: normalize_optional_string(payload.barcode),
        image_url: normalize_optional_string(payload.image_url),
        cost_price,
        selling_price,
        tax_pct,
        reorder_level,
    })
}

/// List products with per-location stock
#[utoipa::path(
    get,
    path = "/api/v1/products",
    responses(
        (status = 200, description = "Product catalog", body = ApiResponse<Vec<ProductWithStock>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Products"
)]
pub async fn list_products(
    _user: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Vec<ProductWithStock>> {
    let products = state.services.products.list_products().await?;

    Ok(axum::Json(ApiResponse::success(products)))
}

/// Register a new product (starts in PENDING status)
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<product::Model>),
        (status = 400, description = "Invalid payload or duplicate SKU", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Products"
)]
pub async fn create_product(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let input = normalize_request(payload)?;

    debug!(actor = %user.email, sku = %input.sku, "product creation requested");

    let created = state.services.products.create_product(input).await?;

    Ok(created_response(ApiResponse::success(created)))
}

/// Bulk import products; rows with duplicate SKUs are skipped and reported
#[utoipa::path(
    post,
    path = "/api/v1/products/import",
    request_body = ImportProductsRequest,
    responses(
        (status = 200, description = "Import summary", body = ApiResponse<ImportSummary>),
        (status = 400, description = "Empty or malformed payload", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Products"
)]
pub async fn import_products(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ImportProductsRequest>,
) -> ApiResult<ImportSummary> {
    debug!(actor = %user.email, rows = payload.products.len(), "product import requested");

    // Normalization failures become per-row errors rather than failing the
    // whole batch.
    let mut rows = Vec::new();
    let mut errors = Vec::new();
    for raw in payload.products {
        let sku = raw.sku.clone();
        match normalize_request(raw) {
            Ok(input) => rows.push(input),
            Err(err) => errors.push(format!(
                "Failed to import {}: {}",
                if sku.trim().is_empty() {
                    "unknown product".to_string()
                } else {
                    sku
                },
                err
            )),
        }
    }

    if rows.is_empty() && !errors.is_empty() {
        return Ok(axum::Json(ApiResponse::success(ImportSummary {
            created: 0,
            errors,
        })));
    }

    let mut summary = state.services.products.import_products(rows).await?;
    summary.errors.extend(errors);

    Ok(axum::Json(ApiResponse::success(summary)))
}

/// Approve or reject a pending product
#[utoipa::path(
    put,
    path = "/api/v1/products/{id}/approve",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = ReviewProductRequest,
    responses(
        (status = 200, description = "Updated product", body = ApiResponse<product::Model>),
        (status = 400, description = "Invalid status transition", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown product", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Products"
)]
pub async fn review_product(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviewProductRequest>,
) -> ApiResult<product::Model> {
    debug!(actor = %user.email, product_id = %id, status = %payload.status, "product review requested");

    let updated = state
        .services
        .products
        .review_product(id, payload.status)
        .await?;

    Ok(axum::Json(ApiResponse::success(updated)))
}
