pub mod checkout;
pub mod customers;
pub mod inventory;
pub mod locations;
pub mod products;
pub mod reports;
pub mod webhook_orders;
