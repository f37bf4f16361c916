use crate::services::webhook_orders::{WebhookOrder, WebhookOrderLine, WebhookOrderOutcome};
use crate::{errors::ServiceError, ApiResponse, ApiResult, AppState};
use axum::{
    extract::{Json, State},
    http::{header, HeaderMap},
    routing::post,
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

/// Webhook routes. These bypass the session-token layers; the caller is
/// authenticated by a static bearer secret instead.
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/orders", post(ingest_order))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct WebhookOrderItemRequest {
    pub sku: String,
    pub quantity: i32,
    pub price: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct WebhookOrderRequest {
    #[serde(alias = "orderId")]
    pub order_id: String,
    pub source: Option<String>,
    #[serde(alias = "locationId")]
    pub location_id: Option<Uuid>,
    pub items: Vec<WebhookOrderItemRequest>,
}

fn verify_webhook_token(headers: &HeaderMap, secret: &str) -> Result<(), ServiceError> {
    let expected = format!("Bearer {}", secret);
    match headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    {
        Some(value) if value == expected => Ok(()),
        _ => {
            warn!("webhook request with missing or mismatched bearer token");
            Err(ServiceError::Unauthorized(
                "unauthorized webhook request".to_string(),
            ))
        }
    }
}

/// Ingest an externally fulfilled order
#[utoipa::path(
    post,
    path = "/api/v1/webhooks/orders",
    request_body = WebhookOrderRequest,
    responses(
        (status = 200, description = "Order ingested", body = ApiResponse<WebhookOrderOutcome>),
        (status = 400, description = "Malformed payload", body = crate::errors::ErrorResponse),
        (status = 401, description = "Bearer secret mismatch", body = crate::errors::ErrorResponse),
        (status = 500, description = "No fulfillment location available", body = crate::errors::ErrorResponse)
    ),
    tag = "Webhooks"
)]
pub async fn ingest_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<WebhookOrderRequest>,
) -> ApiResult<WebhookOrderOutcome> {
    verify_webhook_token(&headers, &state.config.webhook_order_secret)?;

    let order = WebhookOrder {
        order_id: payload.order_id,
        source: payload.source,
        location_id: payload.location_id,
        items: payload
            .items
            .into_iter()
            .map(|item| WebhookOrderLine {
                sku: item.sku,
                quantity: item.quantity,
                price: item.price,
            })
            .collect(),
    };

    let outcome = state.services.webhook_orders.ingest(order).await?;

    Ok(axum::Json(ApiResponse::success(outcome)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_must_match_exactly() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer right-secret"),
        );
        assert!(verify_webhook_token(&headers, "right-secret").is_ok());
        assert!(verify_webhook_token(&headers, "other-secret").is_err());

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("right-secret"),
        );
        assert!(
            verify_webhook_token(&headers, "right-secret").is_err(),
            "scheme prefix is required"
        );

        assert!(verify_webhook_token(&HeaderMap::new(), "right-secret").is_err());
    }
}
