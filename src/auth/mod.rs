/*!
 * # Authentication and Authorization
 *
 * Credential login issues an HS256 JWT whose claims carry the user's role
 * and the role's resolved permission list. Protected routers are wrapped by
 * [`AuthRouterExt::with_permission`]: an auth layer validates the bearer
 * token and stores an [`AuthUser`] in the request extensions, then a
 * permission layer checks the required permission string. Handlers receive
 * the request-scoped [`AuthUser`] through an extractor instead of any
 * ambient session lookup.
 */

use axum::{
    extract::{Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{role, user};

pub mod permissions;
pub mod rbac;

pub use self::permissions as consts;

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,              // Subject (user ID)
    pub name: String,             // User's display name
    pub email: String,            // User's email
    pub role: String,             // Role name
    pub permissions: Vec<String>, // Resolved permission strings
    pub jti: String,              // JWT ID
    pub iat: i64,                 // Issued at
    pub exp: i64,                 // Expiration
    pub nbf: i64,                 // Not valid before
    pub iss: String,              // Issuer
    pub aud: String,              // Audience
}

/// Authenticated caller, extracted from a validated token. This is the
/// request-scoped authorization context passed into every operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub permissions: Vec<String>,
    pub token_id: String,
}

impl AuthUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    pub fn is_super_admin(&self) -> bool {
        self.has_role(rbac::ROLE_SUPER_ADMIN)
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        jwt_issuer: String,
        jwt_audience: String,
        token_expiration: Duration,
    ) -> Self {
        Self {
            jwt_secret,
            jwt_issuer,
            jwt_audience,
            token_expiration,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Token has expired")]
    ExpiredToken,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Account is deactivated")]
    InactiveUser,
    #[error("Insufficient permissions")]
    InsufficientPermissions,
    #[error("Token creation failed: {0}")]
    TokenCreation(String),
    #[error("Hash error: {0}")]
    HashError(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Role-denied and unauthenticated requests are both 401 by contract.
        let (status, error_code, error_message) = match &self {
            Self::MissingAuth => (
                StatusCode::UNAUTHORIZED,
                "AUTH_MISSING",
                "Missing authentication token".to_string(),
            ),
            Self::InvalidToken(msg) => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_TOKEN",
                msg.clone(),
            ),
            Self::ExpiredToken => (
                StatusCode::UNAUTHORIZED,
                "AUTH_TOKEN_EXPIRED",
                "Token has expired".to_string(),
            ),
            Self::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_CREDENTIALS",
                "Invalid email or password".to_string(),
            ),
            Self::InactiveUser => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INACTIVE_USER",
                "Account is deactivated".to_string(),
            ),
            Self::InsufficientPermissions => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INSUFFICIENT_PERMISSIONS",
                "Insufficient permissions".to_string(),
            ),
            Self::TokenCreation(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_TOKEN_CREATION_FAILED",
                msg.clone(),
            ),
            Self::HashError(_) | Self::DatabaseError(_) | Self::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_INTERNAL_ERROR",
                "Internal server error".to_string(),
            ),
        };

        let body = Json(serde_json::json!({
            "error": {
                "code": error_code,
                "message": error_message,
            }
        }));

        (status, body).into_response()
    }
}

/// Access token issued on login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Login credentials
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Hash a password with argon2, producing a PHC string.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::HashError(e.to_string()))
}

/// Verify a password against a stored PHC string.
pub fn verify_password(stored_hash: &str, password: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Mint an access token for the given identity.
pub fn issue_token(
    config: &AuthConfig,
    user_id: Uuid,
    name: &str,
    email: &str,
    role: &str,
    permissions: Vec<String>,
) -> Result<TokenPair, AuthError> {
    let now = Utc::now();
    let expires_at = now
        + ChronoDuration::from_std(config.token_expiration)
            .map_err(|_| AuthError::InternalError("Invalid token duration".to_string()))?;

    let claims = Claims {
        sub: user_id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        permissions,
        jti: Uuid::new_v4().to_string(),
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
        nbf: now.timestamp(),
        iss: config.jwt_issuer.clone(),
        aud: config.jwt_audience.clone(),
    };

    let access_token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

    Ok(TokenPair {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: config.token_expiration.as_secs() as i64,
    })
}

/// Decode and validate an access token.
pub fn decode_token(config: &AuthConfig, token: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[config.jwt_audience.clone()]);
    validation.set_issuer(&[config.jwt_issuer.clone()]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        _ => AuthError::InvalidToken(e.to_string()),
    })
}

/// Authentication service handling credential checks and token issuance.
#[derive(Debug, Clone)]
pub struct AuthService {
    pub config: AuthConfig,
    db: Arc<DatabaseConnection>,
}

impl AuthService {
    pub fn new(config: AuthConfig, db: Arc<DatabaseConnection>) -> Self {
        Self { config, db }
    }

    /// Verify credentials and return the user with their role.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(user::Model, role::Model), AuthError> {
        let account = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.db)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&account.password_hash, password)? {
            return Err(AuthError::InvalidCredentials);
        }

        if !account.active {
            return Err(AuthError::InactiveUser);
        }

        let account_role = role::Entity::find_by_id(account.role_id)
            .one(&*self.db)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?
            .ok_or_else(|| AuthError::InternalError("user has no role assigned".to_string()))?;

        Ok((account, account_role))
    }

    /// Full login flow: credentials → token carrying role + permissions.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        let (account, account_role) = self.authenticate(email, password).await?;

        let mut permission_list = account_role.permission_list();
        if permission_list.is_empty() {
            permission_list = rbac::permissions_for_role(&account_role.name)
                .into_iter()
                .map(str::to_string)
                .collect();
        }

        debug!(user_id = %account.id, role = %account_role.name, "login succeeded");

        issue_token(
            &self.config,
            account.id,
            &account.name,
            &account.email,
            &account_role.name,
            permission_list,
        )
    }

    /// Validate a bearer token and build the request-scoped identity.
    pub fn validate_token(&self, token: &str) -> Result<AuthUser, AuthError> {
        let claims = decode_token(&self.config, token)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AuthError::InvalidToken("malformed subject claim".to_string()))?;

        Ok(AuthUser {
            user_id,
            name: claims.name,
            email: claims.email,
            role: claims.role,
            permissions: claims.permissions,
            token_id: claims.jti,
        })
    }
}

/// Extract authentication info from request headers
fn extract_auth_from_headers(
    headers: &HeaderMap,
    auth_service: &AuthService,
) -> Result<AuthUser, AuthError> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        if let Ok(auth_value) = auth_header.to_str() {
            if let Some(token) = auth_value.strip_prefix("Bearer ") {
                return auth_service.validate_token(token.trim());
            }
        }
    }

    Err(AuthError::MissingAuth)
}

/// Authentication middleware that validates the bearer token and stores the
/// caller identity in the request extensions.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication service not available",
            )
                .into_response();
        }
    };

    let auth_result = extract_auth_from_headers(request.headers(), &auth_service);

    match auth_result {
        Ok(auth_user) => {
            request.extensions_mut().insert(auth_user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Permission middleware checking the required permission string against the
/// authenticated caller. Super Admin passes every check.
pub async fn permission_middleware(
    State(required_permission): State<String>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or(AuthError::MissingAuth)?;

    if auth_user.is_super_admin() || auth_user.has_permission(&required_permission) {
        return Ok(next.run(request).await);
    }

    Err(AuthError::InsufficientPermissions)
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_permission(self, permission: &str) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_permission(self, permission: &str) -> Self {
        self.layer(axum::middleware::from_fn_with_state(
            permission.to_string(),
            permission_middleware,
        ))
        .with_auth()
    }
}

/// Authentication routes
pub fn auth_routes() -> axum::Router<crate::AppState> {
    axum::Router::new().route("/login", axum::routing::post(login_handler))
}

/// Credential login issuing a session token
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenPair),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login_handler(
    State(state): State<crate::AppState>,
    Json(credentials): Json<LoginRequest>,
) -> Result<Json<TokenPair>, AuthError> {
    let token_pair = state
        .auth
        .login(&credentials.email, &credentials.password)
        .await?;

    Ok(Json(token_pair))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig::new(
            "unit-test-signing-key-which-is-plenty-long-for-hs256-use-0123456789".to_string(),
            "retail-api".to_string(),
            "retail-api-clients".to_string(),
            Duration::from_secs(1800),
        )
    }

    #[test]
    fn token_round_trip_preserves_identity() {
        let config = test_config();
        let user_id = Uuid::new_v4();
        let pair = issue_token(
            &config,
            user_id,
            "Pat",
            "pat@example.com",
            rbac::ROLE_CASHIER,
            vec![consts::POS_CHECKOUT.to_string()],
        )
        .expect("token should be issued");

        assert_eq!(pair.token_type, "Bearer");

        let claims = decode_token(&config, &pair.access_token).expect("token should validate");
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.role, rbac::ROLE_CASHIER);
        assert_eq!(claims.permissions, vec![consts::POS_CHECKOUT.to_string()]);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let config = test_config();
        let pair = issue_token(
            &config,
            Uuid::new_v4(),
            "Pat",
            "pat@example.com",
            rbac::ROLE_CASHIER,
            vec![],
        )
        .unwrap();

        let mut other = test_config();
        other.jwt_secret = "a-completely-different-signing-key-also-long-enough-9876543210".into();
        assert!(matches!(
            decode_token(&other, &pair.access_token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("hunter2!").expect("hash");
        assert!(verify_password(&hash, "hunter2!").unwrap());
        assert!(!verify_password(&hash, "hunter3!").unwrap());
    }

    #[test]
    fn permission_checks() {
        let auth_user = AuthUser {
            user_id: Uuid::new_v4(),
            name: "Kim".into(),
            email: "kim@example.com".into(),
            role: rbac::ROLE_WAREHOUSE_MANAGER.into(),
            permissions: rbac::permissions_for_role(rbac::ROLE_WAREHOUSE_MANAGER)
                .into_iter()
                .map(str::to_string)
                .collect(),
            token_id: "jti".into(),
        };
        assert!(auth_user.has_permission(consts::INVENTORY_TRANSFER));
        assert!(!auth_user.has_permission(consts::PRODUCTS_APPROVE));
        assert!(!auth_user.is_super_admin());
    }
}
