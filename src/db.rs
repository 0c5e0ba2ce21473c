pub mod user_repo;
pub use user_repo::UserRepository;
pub mod subscription_repo;
pub use subscription_repo::SubscriptionRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
pub mod client_repo;
pub use client_repo::ClientRepository;
pub mod category_repo;
pub use category_repo::CategoryRepository;
pub mod product_repo;
pub use product_repo::ProductRepository;
pub mod order_repo;
pub use order_repo::OrderRepository;
pub mod stock_repo;
pub use stock_repo::StockRepository;
pub mod finance_repo;
pub use finance_repo::FinanceRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
