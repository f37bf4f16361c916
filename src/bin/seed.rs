//! Bootstrap seeder - provisions the built-in roles, an initial Super Admin
//! account, and a default warehouse.
//!
//! Run with: cargo run --bin seed
//!
//! The admin credentials come from SEED_ADMIN_EMAIL / SEED_ADMIN_PASSWORD,
//! falling back to admin@example.com / admin123 for local development.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use tracing::info;
use uuid::Uuid;

use retail_api::{
    auth::{hash_password, rbac},
    config,
    db::{establish_connection_from_app_config, run_migrations},
    entities::{
        location::{self, LocationKind},
        role, user,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load_config()?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    info!("Seeding database at {}", cfg.database_url());

    let db = establish_connection_from_app_config(&cfg).await?;
    run_migrations(&db).await?;

    // Roles, from the canonical rbac table
    let mut super_admin_role_id = None;
    for (name, permissions) in rbac::builtin_roles() {
        let existing = role::Entity::find()
            .filter(role::Column::Name.eq(name))
            .one(&db)
            .await?;

        let role_id = match existing {
            Some(found) => found.id,
            None => {
                let created = role::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    name: Set(name.to_string()),
                    permissions: Set(serde_json::json!(permissions)),
                    created_at: Set(Utc::now()),
                }
                .insert(&db)
                .await?;
                info!("Created role: {}", name);
                created.id
            }
        };

        if name == rbac::ROLE_SUPER_ADMIN {
            super_admin_role_id = Some(role_id);
        }
    }
    let super_admin_role_id =
        super_admin_role_id.expect("builtin roles always include Super Admin");

    // Initial admin account
    let admin_email =
        std::env::var("SEED_ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string());
    let admin_password =
        std::env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());

    let existing_admin = user::Entity::find()
        .filter(user::Column::Email.eq(admin_email.as_str()))
        .one(&db)
        .await?;

    if existing_admin.is_none() {
        let now = Utc::now();
        user::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set("Super Admin".to_string()),
            email: Set(admin_email.clone()),
            password_hash: Set(hash_password(&admin_password)
                .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?),
            role_id: Set(super_admin_role_id),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&db)
        .await?;
        info!("Created admin user: {}", admin_email);
    } else {
        info!("Admin user already present: {}", admin_email);
    }

    // Default fulfillment warehouse
    let existing_hq = location::Entity::find()
        .filter(location::Column::Name.eq("Main HQ"))
        .one(&db)
        .await?;

    if existing_hq.is_none() {
        location::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set("Main HQ".to_string()),
            kind: Set(LocationKind::Warehouse),
            address: Set(None),
            created_at: Set(Utc::now()),
        }
        .insert(&db)
        .await?;
        info!("Created default warehouse: Main HQ");
    }

    info!("Seeding completed");
    Ok(())
}
