//! Fixed role → permission table.
//!
//! Authorization is a per-route permission check against the permission list
//! carried in the session token; this table is the single place those lists
//! come from. The seeder persists it into the `roles` table.

use super::consts as perm;

pub const ROLE_SUPER_ADMIN: &str = "Super Admin";
pub const ROLE_STORE_MANAGER: &str = "Store Manager";
pub const ROLE_INVENTORY_MANAGER: &str = "Inventory Manager";
pub const ROLE_WAREHOUSE_MANAGER: &str = "Warehouse Manager";
pub const ROLE_CASHIER: &str = "Cashier";

const READ_PERMISSIONS: &[&str] = &[
    perm::PRODUCTS_READ,
    perm::INVENTORY_READ,
    perm::LOCATIONS_READ,
    perm::CUSTOMERS_READ,
];

/// Permissions granted to a role. Unknown role names get nothing.
pub fn permissions_for_role(role: &str) -> Vec<&'static str> {
    match role {
        ROLE_SUPER_ADMIN => perm::ALL.to_vec(),
        ROLE_STORE_MANAGER => {
            let mut grants = READ_PERMISSIONS.to_vec();
            grants.extend([
                perm::POS_CHECKOUT,
                perm::INVENTORY_ADJUST,
                perm::INVENTORY_TRANSFER,
                perm::PRODUCTS_CREATE,
                perm::LOCATIONS_CREATE,
                perm::CUSTOMERS_CREATE,
                perm::ANALYTICS_READ,
            ]);
            grants
        }
        ROLE_INVENTORY_MANAGER => {
            let mut grants = READ_PERMISSIONS.to_vec();
            grants.extend([perm::INVENTORY_ADJUST, perm::PRODUCTS_CREATE]);
            grants
        }
        ROLE_WAREHOUSE_MANAGER => {
            let mut grants = READ_PERMISSIONS.to_vec();
            grants.push(perm::INVENTORY_TRANSFER);
            grants
        }
        ROLE_CASHIER => {
            let mut grants = READ_PERMISSIONS.to_vec();
            grants.extend([perm::POS_CHECKOUT, perm::CUSTOMERS_CREATE]);
            grants
        }
        _ => Vec::new(),
    }
}

/// The built-in role set, used by the seeder.
pub fn builtin_roles() -> Vec<(&'static str, Vec<&'static str>)> {
    [
        ROLE_SUPER_ADMIN,
        ROLE_STORE_MANAGER,
        ROLE_INVENTORY_MANAGER,
        ROLE_WAREHOUSE_MANAGER,
        ROLE_CASHIER,
    ]
    .into_iter()
    .map(|name| (name, permissions_for_role(name)))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn super_admin_has_every_permission() {
        let grants = permissions_for_role(ROLE_SUPER_ADMIN);
        for p in perm::ALL {
            assert!(grants.contains(p), "missing {}", p);
        }
    }

    #[test]
    fn approval_is_super_admin_only() {
        for role in [
            ROLE_STORE_MANAGER,
            ROLE_INVENTORY_MANAGER,
            ROLE_WAREHOUSE_MANAGER,
            ROLE_CASHIER,
        ] {
            assert!(
                !permissions_for_role(role).contains(&perm::PRODUCTS_APPROVE),
                "{} must not approve products",
                role
            );
        }
    }

    #[test]
    fn adjustment_and_transfer_grants_are_disjoint_at_the_edges() {
        assert!(permissions_for_role(ROLE_INVENTORY_MANAGER).contains(&perm::INVENTORY_ADJUST));
        assert!(!permissions_for_role(ROLE_INVENTORY_MANAGER).contains(&perm::INVENTORY_TRANSFER));
        assert!(permissions_for_role(ROLE_WAREHOUSE_MANAGER).contains(&perm::INVENTORY_TRANSFER));
        assert!(!permissions_for_role(ROLE_WAREHOUSE_MANAGER).contains(&perm::INVENTORY_ADJUST));
    }

    #[test]
    fn unknown_role_gets_nothing() {
        assert!(permissions_for_role("Intern").is_empty());
    }

    #[test]
    fn builtin_roles_cover_the_canonical_set() {
        let roles = builtin_roles();
        assert_eq!(roles.len(), 5);
        assert!(roles.iter().any(|(name, _)| *name == ROLE_CASHIER));
    }
}
