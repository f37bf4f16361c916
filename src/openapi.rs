use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Retail API",
        version = "0.1.0",
        description = r#"
# Retail Management API

Backend for multi-location retail operations: point-of-sale checkout,
inventory tracking across locations, product catalog with an approval
workflow, customer records, and sales reporting.

## Authentication

All endpoints except the order webhook require a JWT obtained from
`POST /auth/login`:

```
Authorization: Bearer <your-jwt-token>
```

The order webhook (`POST /api/v1/webhooks/orders`) is authenticated by a
static bearer secret configured via `APP__WEBHOOK_ORDER_SECRET`.

## Error Handling

Errors use a consistent JSON body with appropriate status codes:

```json
{
  "error": "Bad Request",
  "message": "Insufficient stock for Espresso Beans 1kg. Available: 3",
  "timestamp": "2025-11-02T10:30:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Auth", description = "Credential login"),
        (name = "POS", description = "Point-of-sale checkout"),
        (name = "Inventory", description = "Stock levels, adjustments and transfers"),
        (name = "Products", description = "Catalog management and approval"),
        (name = "Webhooks", description = "External order ingestion"),
        (name = "Analytics", description = "Sales totals"),
        (name = "Reports", description = "Margin, dead stock and customer reports"),
        (name = "Locations", description = "Warehouse, store and exhibition sites"),
        (name = "Customers", description = "Customer records")
    ),
    paths(
        crate::auth::login_handler,
        crate::handlers::checkout::create_checkout,
        crate::handlers::inventory::list_inventory,
        crate::handlers::inventory::low_stock,
        crate::handlers::inventory::adjust_stock,
        crate::handlers::inventory::transfer_stock,
        crate::handlers::products::list_products,
        crate::handlers::products::create_product,
        crate::handlers::products::import_products,
        crate::handlers::products::review_product,
        crate::handlers::webhooks::ingest_order,
        crate::handlers::analytics::sales_summary,
        crate::handlers::analytics::profit_margins,
        crate::handlers::analytics::dead_stock,
        crate::handlers::analytics::customer_insights,
        crate::handlers::locations::list_locations,
        crate::handlers::locations::create_location,
        crate::handlers::customers::list_customers,
        crate::handlers::customers::create_customer,
    ),
    components(
        schemas(
            crate::auth::LoginRequest,
            crate::auth::TokenPair,
            crate::handlers::checkout::CheckoutRequest,
            crate::handlers::checkout::CartLineRequest,
            crate::handlers::inventory::AdjustStockRequest,
            crate::handlers::inventory::TransferStockRequest,
            crate::handlers::products::CreateProductRequest,
            crate::handlers::products::ImportProductsRequest,
            crate::handlers::products::ReviewProductRequest,
            crate::handlers::webhooks::WebhookOrderRequest,
            crate::handlers::webhooks::WebhookOrderItemRequest,
            crate::handlers::customers::CreateCustomerRequest,
            crate::handlers::locations::CreateLocationRequest,
            crate::services::checkout::CheckoutReceipt,
            crate::services::inventory::TransferOutcome,
            crate::services::inventory::InventoryRow,
            crate::services::inventory::LowStockAlert,
            crate::services::products::ProductWithStock,
            crate::services::products::ProductLocationStock,
            crate::services::products::ImportSummary,
            crate::services::webhook_orders::WebhookOrderOutcome,
            crate::services::reports::SalesSummary,
            crate::services::reports::ProfitMarginEntry,
            crate::services::reports::DeadStockEntry,
            crate::services::reports::CustomerInsight,
            crate::entities::product::ProductStatus,
            crate::entities::location::LocationKind,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_covers_the_core_operations() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string(&openapi).unwrap();
        assert!(json.contains("Retail API"));
        assert!(json.contains("/api/v1/pos/checkout"));
        assert!(json.contains("/api/v1/inventory/transfer"));
        assert!(json.contains("/api/v1/webhooks/orders"));
    }
}
