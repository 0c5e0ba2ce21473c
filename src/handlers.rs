pub mod auth;
pub mod catalog;
pub mod categories;
pub mod clients;
pub mod dashboard;
pub mod finance;
pub mod orders;
pub mod products;
pub mod settings;
pub mod stock;
pub mod webhooks;
