use crate::auth::consts as perm;
use crate::auth::{AuthRouterExt, AuthUser};
use crate::entities::customer;
use crate::handlers::common::{created_response, normalize_optional_string, validate_input};
use crate::services::customers::CreateCustomerInput;
use crate::{errors::ServiceError, ApiResponse, ApiResult, AppState};
use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

pub fn customers_routes() -> Router<AppState> {
    let read = Router::new()
        .route("/", get(list_customers))
        .with_permission(perm::CUSTOMERS_READ);

    let create = Router::new()
        .route("/", post(create_customer))
        .with_permission(perm::CUSTOMERS_CREATE);

    Router::new().merge(read).merge(create)
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(alias = "loyaltyPoints")]
    pub loyalty_points: Option<i32>,
}

/// List customers, newest first
#[utoipa::path(
    get,
    path = "/api/v1/customers",
    responses(
        (status = 200, description = "Customers", body = ApiResponse<Vec<customer::Model>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Customers"
)]
pub async fn list_customers(
    _user: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Vec<customer::Model>> {
    let customers = state.services.customers.list_customers().await?;

    Ok(axum::Json(ApiResponse::success(customers)))
}

/// Register a customer
#[utoipa::path(
    post,
    path = "/api/v1/customers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created", body = ApiResponse<customer::Model>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Customers"
)]
pub async fn create_customer(
    _user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateCustomerRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;

    let created = state
        .services
        .customers
        .create_customer(CreateCustomerInput {
            name: payload.name,
            email: normalize_optional_string(payload.email),
            phone: normalize_optional_string(payload.phone),
            loyalty_points: payload.loyalty_points,
        })
        .await?;

    Ok(created_response(ApiResponse::success(created)))
}
