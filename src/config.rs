// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        CategoryRepository, ClientRepository, DashboardRepository, FinanceRepository, OrderRepository,
        ProductRepository, SettingsRepository, StockRepository, SubscriptionRepository, UserRepository,
    },
    services::{
        auth::AuthService,
        catalog_service::CatalogService,
        dashboard_service::DashboardService,
        email::{DisabledMailer, Mailer, ResendMailer},
        finance_service::FinanceService,
        inventory_service::InventoryService,
        order_service::OrderService,
        provisioning_service::ProvisioningService,
    },
};

const DEFAULT_EMAIL_FROM: &str = "Confeitaria <no-reply@confeitaria.app>";
const DEFAULT_APP_URL: &str = "http://localhost:5173";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

// Configuração lida do ambiente (.env em desenvolvimento)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub cakto_webhook_secret: String,
    pub resend_api_key: Option<String>,
    pub email_from: String,
    pub app_url: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub trial_days: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{} deve ser definida", key))
        };
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            cakto_webhook_secret: required("CAKTO_WEBHOOK_SECRET")?,
            resend_api_key: optional("RESEND_API_KEY"),
            email_from: optional("EMAIL_FROM").unwrap_or_else(|| DEFAULT_EMAIL_FROM.to_string()),
            app_url: optional("APP_URL").unwrap_or_else(|| DEFAULT_APP_URL.to_string()),
            bind_addr: optional("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            db_max_connections: optional("DB_MAX_CONNECTIONS")
                .map(|v| v.trim().parse::<u32>())
                .transpose()
                .context("DB_MAX_CONNECTIONS deve ser um número")?
                .unwrap_or(5),
            trial_days: optional("TRIAL_DAYS")
                .map(|v| v.trim().parse::<i64>())
                .transpose()
                .context("TRIAL_DAYS deve ser um número")?
                .unwrap_or(7),
        })
    }

    fn login_url(&self) -> String {
        format!("{}/login", self.app_url.trim_end_matches('/'))
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub i18n_store: I18nStore,

    // Serviços (regras com mais de uma tabela)
    pub auth_service: AuthService,
    pub order_service: OrderService,
    pub catalog_service: CatalogService,
    pub provisioning_service: ProvisioningService,
    pub finance_service: FinanceService,
    pub dashboard_service: DashboardService,

    // Repositórios usados direto pelos handlers de cadastro
    pub client_repo: ClientRepository,
    pub category_repo: CategoryRepository,
    pub product_repo: ProductRepository,
    pub stock_repo: StockRepository,
    pub settings_repo: SettingsRepository,
    pub finance_repo: FinanceRepository,
    pub order_repo: OrderRepository,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Self::from_parts(db_pool, config)
    }

    /// Monta o gráfico de dependências sobre um pool já criado.
    pub fn from_parts(db_pool: PgPool, config: Config) -> anyhow::Result<Self> {
        let i18n_store = I18nStore::load()?;

        let mailer: Arc<dyn Mailer> = match &config.resend_api_key {
            Some(key) => Arc::new(ResendMailer::new(key.clone(), config.email_from.clone())),
            None => {
                tracing::warn!("⚠️ RESEND_API_KEY não definida: e-mails de credenciais não serão enviados");
                Arc::new(DisabledMailer)
            }
        };

        // --- Repositórios ---
        let user_repo = UserRepository::new(db_pool.clone());
        let subscription_repo = SubscriptionRepository::new();
        let settings_repo = SettingsRepository::new();
        let client_repo = ClientRepository::new();
        let category_repo = CategoryRepository::new();
        let product_repo = ProductRepository::new();
        let order_repo = OrderRepository::new();
        let stock_repo = StockRepository::new();
        let finance_repo = FinanceRepository::new();
        let dashboard_repo = DashboardRepository::new();

        // --- Serviços ---
        let auth_service = AuthService::new(
            user_repo.clone(),
            settings_repo.clone(),
            config.jwt_secret.clone(),
            config.trial_days,
            db_pool.clone(),
        );
        let inventory_service = InventoryService::new(product_repo.clone());
        let order_service = OrderService::new(
            order_repo.clone(),
            product_repo.clone(),
            client_repo.clone(),
            inventory_service,
        );
        let catalog_service = CatalogService::new(
            db_pool.clone(),
            user_repo.clone(),
            settings_repo.clone(),
            category_repo.clone(),
            product_repo.clone(),
            client_repo.clone(),
            order_service.clone(),
        );
        let provisioning_service = ProvisioningService::new(
            db_pool.clone(),
            user_repo,
            subscription_repo,
            settings_repo.clone(),
            mailer,
            config.login_url(),
        );
        let finance_service = FinanceService::new(finance_repo.clone());
        let dashboard_service = DashboardService::new(dashboard_repo);

        Ok(Self {
            db_pool,
            config: Arc::new(config),
            i18n_store,
            auth_service,
            order_service,
            catalog_service,
            provisioning_service,
            finance_service,
            dashboard_service,
            client_repo,
            category_repo,
            product_repo,
            stock_repo,
            settings_repo,
            finance_repo,
            order_repo,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("DATABASE_URL", "postgres://localhost/confeitaria"),
        ("JWT_SECRET", "segredo"),
        ("CAKTO_WEBHOOK_SECRET", "cakto"),
    ];

    #[test]
    fn applies_defaults_for_optional_values() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.trial_days, 7);
        assert_eq!(config.resend_api_key, None);
        assert_eq!(config.login_url(), "http://localhost:5173/login");
    }

    #[test]
    fn missing_webhook_secret_fails() {
        let err = Config::from_lookup(lookup(&REQUIRED[..2])).unwrap_err();
        assert!(err.to_string().contains("CAKTO_WEBHOOK_SECRET"));
    }

    #[test]
    fn parses_numeric_overrides() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("TRIAL_DAYS", "14"));
        vars.push(("APP_URL", "https://app.confeitaria.app/"));
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.trial_days, 14);
        assert_eq!(config.login_url(), "https://app.confeitaria.app/login");

        vars.push(("DB_MAX_CONNECTIONS", "muitas"));
        assert!(Config::from_lookup(lookup(&vars)).is_err());
    }
}
