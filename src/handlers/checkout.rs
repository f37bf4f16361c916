use crate::auth::consts as perm;
use crate::auth::{AuthRouterExt, AuthUser};
use crate::handlers::common::validate_input;
use crate::services::checkout::{CheckoutInput, CheckoutLine, CheckoutReceipt};
use crate::{ApiResponse, ApiResult, AppState};
use axum::{
    extract::{Json, State},
    routing::post,
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Register checkout routes, gated on the checkout permission.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(create_checkout))
        .with_permission(perm::POS_CHECKOUT)
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CartLineRequest {
    #[serde(alias = "productId")]
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CheckoutRequest {
    #[validate(length(min = 1, message = "cart must not be empty"))]
    pub cart: Vec<CartLineRequest>,
    #[serde(alias = "paymentMethod")]
    #[validate(length(min = 1, message = "payment method is required"))]
    pub payment_method: String,
    #[serde(alias = "locationId")]
    pub location_id: Uuid,
    /// Register-stated total, recorded as-is.
    #[serde(alias = "totalAmount")]
    pub total_amount: Decimal,
    #[serde(alias = "customerId")]
    pub customer_id: Option<Uuid>,
}

/// Process a point-of-sale checkout
#[utoipa::path(
    post,
    path = "/api/v1/pos/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Sale committed", body = ApiResponse<CheckoutReceipt>),
        (status = 400, description = "Insufficient stock or invalid cart", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "POS"
)]
pub async fn create_checkout(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CheckoutRequest>,
) -> ApiResult<CheckoutReceipt> {
    validate_input(&payload)?;

    debug!(cashier = %user.email, location_id = %payload.location_id, "checkout requested");

    let input = CheckoutInput {
        location_id: payload.location_id,
        payment_method: payload.payment_method,
        total_amount: payload.total_amount,
        customer_id: payload.customer_id,
        lines: payload
            .cart
            .into_iter()
            .map(|line| CheckoutLine {
                product_id: line.product_id,
                quantity: line.quantity,
            })
            .collect(),
    };

    let receipt = state.services.checkout.checkout(input).await?;

    Ok(axum::Json(ApiResponse::success(receipt)))
}
