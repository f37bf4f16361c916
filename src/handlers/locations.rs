use crate::auth::consts as perm;
use crate::auth::{AuthRouterExt, AuthUser};
use crate::entities::location::{self, LocationKind};
use crate::handlers::common::{created_response, normalize_optional_string, validate_input};
use crate::services::locations::CreateLocationInput;
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

pub fn locations_routes() -> Router<AppState> {
    let read = Router::new()
        .route("/", get(list_locations))
        .with_permission(perm::LOCATIONS_READ);

    let create = Router::new()
        .route("/", post(create_location))
        .with_permission(perm::LOCATIONS_CREATE);

    Router::new().merge(read).merge(create)
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLocationRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub kind: LocationKind,
    pub address: Option<String>,
}

/// List locations ordered by name
#[utoipa::path(
    get,
    path = "/api/v1/locations",
    responses(
        (status = 200, description = "Locations", body = ApiResponse<Vec<location::Model>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Locations"
)]
pub async fn list_locations(
    _user: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Vec<location::Model>> {
    let locations = state.services.locations.list_locations().await?;

    Ok(axum::Json(ApiResponse::success(locations)))
}

/// Register a location
#[utoipa::path(
    post,
    path = "/api/v1/locations",
    request_body = CreateLocationRequest,
    responses(
        (status = 201, description = "Location created", body = ApiResponse<location::Model>),
        (status = 400, description = "Invalid payload or duplicate name", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Locations"
)]
pub async fn create_location(
    _user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateLocationRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;

    let created = state
        .services
        .locations
        .create_location(CreateLocationInput {
            name: payload.name,
            kind: payload.kind,
            address: normalize_optional_string(payload.address),
        })
        .await?;

    Ok(created_response(ApiResponse::success(created)))
}
