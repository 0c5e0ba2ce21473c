pub mod auth;
pub mod catalog_service;
pub mod dashboard_service;
pub mod email;
pub mod finance_service;
pub mod inventory_service;
pub mod order_service;
pub mod pricing;
pub mod provisioning_service;
