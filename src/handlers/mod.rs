pub mod analytics;
pub mod checkout;
pub mod common;
pub mod customers;
pub mod inventory;
pub mod locations;
pub mod products;
pub mod webhooks;

use crate::db::DbPool;
use crate::events::EventSender;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub checkout: Arc<crate::services::checkout::CheckoutService>,
    pub inventory: Arc<crate::services::inventory::InventoryService>,
    pub webhook_orders: Arc<crate::services::webhook_orders::WebhookOrderService>,
    pub products: Arc<crate::services::products::ProductCatalogService>,
    pub reports: Arc<crate::services::reports::ReportService>,
    pub customers: Arc<crate::services::customers::CustomerService>,
    pub locations: Arc<crate::services::locations::LocationService>,
}

impl AppServices {
    /// Build the services container over one shared pool and event channel.
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        let checkout = Arc::new(crate::services::checkout::CheckoutService::new(
            db.clone(),
            event_sender.clone(),
        ));
        let inventory = Arc::new(crate::services::inventory::InventoryService::new(
            db.clone(),
            event_sender.clone(),
        ));
        let webhook_orders = Arc::new(crate::services::webhook_orders::WebhookOrderService::new(
            db.clone(),
            event_sender.clone(),
        ));
        let products = Arc::new(crate::services::products::ProductCatalogService::new(
            db.clone(),
            event_sender.clone(),
        ));
        let reports = Arc::new(crate::services::reports::ReportService::new(db.clone()));
        let customers = Arc::new(crate::services::customers::CustomerService::new(
            db.clone(),
            event_sender.clone(),
        ));
        let locations = Arc::new(crate::services::locations::LocationService::new(
            db,
            event_sender,
        ));

        Self {
            checkout,
            inventory,
            webhook_orders,
            products,
            reports,
            customers,
            locations,
        }
    }
}
