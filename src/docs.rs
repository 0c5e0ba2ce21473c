// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::change_password,

        // --- Settings ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,

        // --- Clientes ---
        handlers::clients::create_client,
        handlers::clients::list_clients,
        handlers::clients::get_client,
        handlers::clients::update_client,
        handlers::clients::delete_client,
        handlers::clients::list_client_orders,

        // --- Categorias ---
        handlers::categories::create_category,
        handlers::categories::list_categories,
        handlers::categories::category_tree,
        handlers::categories::update_category,
        handlers::categories::delete_category,

        // --- Produtos ---
        handlers::products::create_product,
        handlers::products::list_products,
        handlers::products::get_product,
        handlers::products::update_product,
        handlers::products::delete_product,
        handlers::products::set_stock,
        handlers::products::set_catalog_visibility,

        // --- Pedidos ---
        handlers::orders::create_order,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::update_order,
        handlers::orders::change_order_status,
        handlers::orders::delete_order,

        // --- Estoque ---
        handlers::stock::create_stock_item,
        handlers::stock::list_stock_items,
        handlers::stock::low_stock_alerts,
        handlers::stock::get_stock_item,
        handlers::stock::update_stock_item,
        handlers::stock::adjust_stock_item,
        handlers::stock::delete_stock_item,

        // --- Financeiro ---
        handlers::finance::create_entry,
        handlers::finance::list_entries,
        handlers::finance::delete_entry,
        handlers::finance::get_summary,
        handlers::finance::top_products,

        // --- Dashboard ---
        handlers::dashboard::get_summary,

        // --- Catálogo público ---
        handlers::catalog::get_catalog,
        handlers::catalog::checkout,

        // --- Webhooks ---
        handlers::webhooks::cakto_webhook,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::Profile,
            models::auth::SubscriptionStatus,
            models::auth::MeResponse,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::ChangePasswordPayload,
            models::auth::AuthResponse,

            // --- Settings ---
            models::settings::BakerySettings,
            models::settings::UpdateSettingsRequest,

            // --- Cadastros ---
            models::client::Client,
            models::client::ClientPayload,
            models::category::Category,
            models::category::CategoryNode,
            models::category::CategoryPayload,
            models::product::ProductSize,
            models::product::VariationOption,
            models::product::VariationGroup,
            models::product::ProductAddon,
            models::product::Product,
            models::product::ProductPayload,
            models::product::SetStockPayload,
            models::product::CatalogVisibilityPayload,

            // --- Pedidos ---
            models::order::OrderStatus,
            models::order::OrderOrigin,
            models::order::SelectedVariation,
            models::order::SelectedAddon,
            models::order::Order,
            models::order::OrderItem,
            models::order::OrderDetail,
            models::order::VariationChoice,
            models::order::OrderItemInput,
            models::order::CreateOrderPayload,
            models::order::UpdateOrderPayload,
            models::order::ChangeStatusPayload,
            models::order::AppliedStockAdjustment,
            models::order::StatusChangeResponse,

            // --- Estoque ---
            models::stock::StockItem,
            models::stock::StockItemPayload,
            models::stock::AdjustStockPayload,

            // --- Financeiro ---
            models::finance::EntryKind,
            models::finance::FinancialEntry,
            models::finance::FinancialEntryPayload,
            models::finance::PaymentMethodBreakdown,
            models::finance::StatusBreakdown,
            models::finance::FinanceSummary,
            models::finance::TopProductEntry,

            // --- Dashboard ---
            models::dashboard::DashboardSummary,
            models::dashboard::UpcomingDelivery,

            // --- Catálogo ---
            models::catalog::PublicProduct,
            models::catalog::PublicCatalog,
            models::catalog::CheckoutCustomer,
            models::catalog::CatalogItemInput,
            models::catalog::CheckoutPayload,
            models::catalog::CheckoutResponse,

            // --- Webhooks ---
            models::webhook::CaktoWebhookPayload,
            models::webhook::CaktoData,
            models::webhook::CaktoCustomer,
            models::webhook::CaktoPayment,
            models::webhook::CaktoOffer,
            models::webhook::CaktoProduct,
            models::webhook::WebhookResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário e Assinatura"),
        (name = "Configurações", description = "Dados da Confeitaria"),
        (name = "Clientes", description = "Cadastro de Clientes"),
        (name = "Categorias", description = "Categorias e Subcategorias"),
        (name = "Produtos", description = "Produtos, Tamanhos, Variações e Adicionais"),
        (name = "Pedidos", description = "Orçamentos e Pedidos"),
        (name = "Estoque", description = "Matéria-prima e Alertas"),
        (name = "Financeiro", description = "Lançamentos e Relatórios"),
        (name = "Dashboard", description = "Indicadores do Dia"),
        (name = "Catálogo", description = "Vitrine Pública"),
        (name = "Webhooks", description = "Integração com a Cakto")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_public_and_protected_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/orders/{id}/status"));
        assert!(doc.paths.paths.contains_key("/api/catalog/{tenant_id}/checkout"));
        assert!(doc.paths.paths.contains_key("/api/webhooks/cakto"));
        let schemes = doc.components.as_ref().map(|c| c.security_schemes.contains_key("api_jwt"));
        assert_eq!(schemes, Some(true));
    }
}
