use crate::auth::consts as perm;
use crate::auth::{AuthRouterExt, AuthUser};
use crate::services::reports::{
    CustomerInsight, DeadStockEntry, ProfitMarginEntry, SalesSummary,
};
use crate::{ApiResponse, ApiResult, AppState};
use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

/// Build the analytics Router scoped under `/api/v1/analytics`.
pub fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(sales_summary))
        .with_permission(perm::ANALYTICS_READ)
}

/// Build the reports Router scoped under `/api/v1/reports`.
pub fn reports_routes() -> Router<AppState> {
    Router::new()
        .route("/profit-margins", get(profit_margins))
        .route("/dead-stock", get(dead_stock))
        .route("/customers", get(customer_insights))
        .with_permission(perm::REPORTS_READ)
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SalesSummaryQuery {
    /// Restrict totals to one location
    pub location_id: Option<Uuid>,
}

/// Revenue and sales count over completed transactions
#[utoipa::path(
    get,
    path = "/api/v1/analytics",
    params(SalesSummaryQuery),
    responses(
        (status = 200, description = "Sales summary", body = ApiResponse<SalesSummary>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Analytics"
)]
pub async fn sales_summary(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<SalesSummaryQuery>,
) -> ApiResult<SalesSummary> {
    let summary = state
        .services
        .reports
        .sales_summary(query.location_id)
        .await?;

    Ok(axum::Json(ApiResponse::success(summary)))
}

/// Profit margin per product, highest first
#[utoipa::path(
    get,
    path = "/api/v1/reports/profit-margins",
    responses(
        (status = 200, description = "Margin report", body = ApiResponse<Vec<ProfitMarginEntry>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Reports"
)]
pub async fn profit_margins(
    _user: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Vec<ProfitMarginEntry>> {
    let entries = state.services.reports.profit_margins().await?;

    Ok(axum::Json(ApiResponse::success(entries)))
}

/// Stock held by products with no sales history
#[utoipa::path(
    get,
    path = "/api/v1/reports/dead-stock",
    responses(
        (status = 200, description = "Dead stock report", body = ApiResponse<Vec<DeadStockEntry>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Reports"
)]
pub async fn dead_stock(
    _user: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Vec<DeadStockEntry>> {
    let entries = state.services.reports.dead_stock().await?;

    Ok(axum::Json(ApiResponse::success(entries)))
}

/// Customers with derived lifetime value
#[utoipa::path(
    get,
    path = "/api/v1/reports/customers",
    responses(
        (status = 200, description = "Customer insights", body = ApiResponse<Vec<CustomerInsight>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Reports"
)]
pub async fn customer_insights(
    _user: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Vec<CustomerInsight>> {
    let insights = state.services.reports.customer_insights().await?;

    Ok(axum::Json(ApiResponse::success(insights)))
}
