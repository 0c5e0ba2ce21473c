pub mod auth;
pub mod catalog;
pub mod category;
pub mod client;
pub mod dashboard;
pub mod finance;
pub mod order;
pub mod product;
pub mod settings;
pub mod stock;
pub mod webhook;
