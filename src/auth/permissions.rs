//! Permission strings gating each operation. Routes are wrapped with
//! `AuthRouterExt::with_permission` using these constants; the role →
//! permission grants live in [`super::rbac`].

pub const POS_CHECKOUT: &str = "pos:checkout";

pub const INVENTORY_READ: &str = "inventory:read";
pub const INVENTORY_ADJUST: &str = "inventory:adjust";
pub const INVENTORY_TRANSFER: &str = "inventory:transfer";

pub const PRODUCTS_READ: &str = "products:read";
pub const PRODUCTS_CREATE: &str = "products:create";
pub const PRODUCTS_APPROVE: &str = "products:approve";

pub const LOCATIONS_READ: &str = "locations:read";
pub const LOCATIONS_CREATE: &str = "locations:create";

pub const CUSTOMERS_READ: &str = "customers:read";
pub const CUSTOMERS_CREATE: &str = "customers:create";

pub const ANALYTICS_READ: &str = "analytics:read";
pub const REPORTS_READ: &str = "reports:read";

/// Every permission known to the system, in one place so role grants and
/// seeding stay exhaustive.
pub const ALL: &[&str] = &[
    POS_CHECKOUT,
    INVENTORY_READ,
    INVENTORY_ADJUST,
    INVENTORY_TRANSFER,
    PRODUCTS_READ,
    PRODUCTS_CREATE,
    PRODUCTS_APPROVE,
    LOCATIONS_READ,
    LOCATIONS_CREATE,
    CUSTOMERS_READ,
    CUSTOMERS_CREATE,
    ANALYTICS_READ,
    REPORTS_READ,
];
