mod common;

use chrono::Utc;
use common::*;
use retail_api::auth::{hash_password, rbac, AuthConfig, AuthError, AuthService};
use retail_api::entities::{role, user};
use sea_orm::{ActiveModelTrait, Set};
use std::time::Duration;
use uuid::Uuid;

fn auth_config() -> AuthConfig {
    AuthConfig::new(
        "integration-test-signing-key-long-enough-for-hs256-0123456789abcdef".to_string(),
        "retail-api".to_string(),
        "retail-api-clients".to_string(),
        Duration::from_secs(1800),
    )
}

async fn create_role(db: &retail_api::db::DbPool, name: &str) -> role::Model {
    role::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        permissions: Set(serde_json::json!(rbac::permissions_for_role(name))),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to create role")
}

async fn create_user(
    db: &retail_api::db::DbPool,
    email: &str,
    password: &str,
    role_id: Uuid,
    active: bool,
) -> user::Model {
    let now = Utc::now();
    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set("Test User".to_string()),
        email: Set(email.to_string()),
        password_hash: Set(hash_password(password).expect("hashing should succeed")),
        role_id: Set(role_id),
        active: Set(active),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to create user")
}

#[tokio::test]
async fn login_issues_a_token_carrying_role_and_permissions() {
    let db = setup_db().await;
    let service = AuthService::new(auth_config(), db.clone());

    let cashier_role = create_role(&db, rbac::ROLE_CASHIER).await;
    let account = create_user(&db, "pat@example.com", "s3cure-pw", cashier_role.id, true).await;

    let pair = service
        .login("pat@example.com", "s3cure-pw")
        .await
        .expect("login should succeed");
    assert_eq!(pair.token_type, "Bearer");

    let identity = service
        .validate_token(&pair.access_token)
        .expect("token should validate");
    assert_eq!(identity.user_id, account.id);
    assert_eq!(identity.role, rbac::ROLE_CASHIER);
    assert!(identity.has_permission(retail_api::auth::consts::POS_CHECKOUT));
    assert!(!identity.has_permission(retail_api::auth::consts::PRODUCTS_APPROVE));
    assert!(!identity.is_super_admin());
}

#[tokio::test]
async fn wrong_password_and_unknown_email_both_read_as_invalid_credentials() {
    let db = setup_db().await;
    let service = AuthService::new(auth_config(), db.clone());

    let cashier_role = create_role(&db, rbac::ROLE_CASHIER).await;
    create_user(&db, "pat@example.com", "s3cure-pw", cashier_role.id, true).await;

    assert!(matches!(
        service.login("pat@example.com", "wrong-pw").await,
        Err(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        service.login("nobody@example.com", "s3cure-pw").await,
        Err(AuthError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn deactivated_accounts_cannot_log_in() {
    let db = setup_db().await;
    let service = AuthService::new(auth_config(), db.clone());

    let cashier_role = create_role(&db, rbac::ROLE_CASHIER).await;
    create_user(&db, "gone@example.com", "s3cure-pw", cashier_role.id, false).await;

    assert!(matches!(
        service.login("gone@example.com", "s3cure-pw").await,
        Err(AuthError::InactiveUser)
    ));
}

#[tokio::test]
async fn super_admin_tokens_carry_the_full_grant_set() {
    let db = setup_db().await;
    let service = AuthService::new(auth_config(), db.clone());

    let admin_role = create_role(&db, rbac::ROLE_SUPER_ADMIN).await;
    create_user(&db, "root@example.com", "s3cure-pw", admin_role.id, true).await;

    let pair = service.login("root@example.com", "s3cure-pw").await.unwrap();
    let identity = service.validate_token(&pair.access_token).unwrap();

    assert!(identity.is_super_admin());
    for permission in retail_api::auth::consts::ALL {
        assert!(identity.has_permission(permission), "missing {}", permission);
    }
}
