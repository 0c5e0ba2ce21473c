// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// Todos os erros de domínio passam por aqui.
// A tradução para HTTP acontece em `to_api_error`, que conhece o idioma do cliente.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Assinatura expirada")]
    SubscriptionExpired,

    // O &str é a chave do recurso em `resources.*` (ex: "order", "client")
    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(&'static str),

    #[error("Opção '{option}' não existe no produto '{product}'")]
    UnknownOption { product: String, option: String },

    #[error("Variação obrigatória '{group}' não escolhida no produto '{product}'")]
    MissingRequiredVariation { product: String, group: String },

    #[error("Variação '{group}' escolhida mais de uma vez no produto '{product}'")]
    DuplicateVariation { product: String, group: String },

    #[error("Produto indisponível: {0}")]
    ProductUnavailable(uuid::Uuid),

    #[error("Pedido sem itens")]
    EmptyOrder,

    #[error("Categoria pai inválida")]
    InvalidCategoryParent,

    #[error("Catálogo indisponível")]
    CatalogUnavailable,

    #[error("Segredo do webhook inválido")]
    InvalidWebhookSecret,

    #[error("Payload do webhook inválido: {0}")]
    InvalidWebhookPayload(String),

    #[error("Método não permitido")]
    MethodNotAllowed,

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Erro no provedor de e-mail: {0}")]
    EmailProviderError(#[from] reqwest::Error),
}

// O erro já traduzido, pronto para virar resposta HTTP
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::UnknownOption { .. }
            | AppError::MissingRequiredVariation { .. }
            | AppError::DuplicateVariation { .. }
            | AppError::ProductUnavailable(_)
            | AppError::EmptyOrder
            | AppError::InvalidCategoryParent
            | AppError::InvalidWebhookPayload(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials
            | AppError::InvalidToken
            | AppError::InvalidWebhookSecret => StatusCode::UNAUTHORIZED,
            AppError::SubscriptionExpired => StatusCode::PAYMENT_REQUIRED,
            AppError::UserNotFound
            | AppError::ResourceNotFound(_)
            | AppError::CatalogUnavailable
            | AppError::DatabaseError(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::EmailAlreadyExists => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte o erro de domínio em `ApiError`, com a mensagem no idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let lang = locale.0.as_str();
        let status = self.status_code();

        let (error, details) = match self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<Value> = field_errors
                        .iter()
                        .map(|e| {
                            let key = e
                                .message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| format!("validation.{}", e.code));
                            Value::String(i18n.translate(lang, &key))
                        })
                        .collect();
                    details.insert(field.to_string(), Value::Array(messages));
                }
                (i18n.translate(lang, "errors.validation"), Some(Value::Object(details)))
            }
            AppError::EmailAlreadyExists => (i18n.translate(lang, "errors.email_exists"), None),
            AppError::InvalidCredentials => (i18n.translate(lang, "errors.invalid_credentials"), None),
            AppError::InvalidToken => (i18n.translate(lang, "errors.invalid_token"), None),
            AppError::UserNotFound => (i18n.translate(lang, "errors.user_not_found"), None),
            AppError::SubscriptionExpired => (i18n.translate(lang, "errors.subscription_expired"), None),
            AppError::ResourceNotFound(resource) => {
                let resource_name = i18n.translate(lang, &format!("resources.{}", resource));
                (
                    i18n.translate_with(lang, "errors.not_found", &[("resource", &resource_name)]),
                    None,
                )
            }
            AppError::UnknownOption { product, option } => (
                i18n.translate_with(lang, "errors.unknown_option", &[("product", product), ("option", option)]),
                None,
            ),
            AppError::MissingRequiredVariation { product, group } => (
                i18n.translate_with(lang, "errors.missing_variation", &[("product", product), ("group", group)]),
                None,
            ),
            AppError::DuplicateVariation { product, group } => (
                i18n.translate_with(lang, "errors.duplicate_variation", &[("product", product), ("group", group)]),
                None,
            ),
            AppError::ProductUnavailable(id) => (
                i18n.translate_with(lang, "errors.product_unavailable", &[("id", &id.to_string())]),
                None,
            ),
            AppError::EmptyOrder => (i18n.translate(lang, "errors.empty_order"), None),
            AppError::InvalidCategoryParent => (i18n.translate(lang, "errors.invalid_category_parent"), None),
            AppError::CatalogUnavailable => (i18n.translate(lang, "errors.catalog_unavailable"), None),
            AppError::InvalidWebhookSecret => (i18n.translate(lang, "errors.invalid_webhook_secret"), None),
            AppError::InvalidWebhookPayload(reason) => (
                i18n.translate(lang, "errors.invalid_webhook_payload"),
                Some(json!({ "reason": reason })),
            ),
            AppError::MethodNotAllowed => (i18n.translate(lang, "errors.method_not_allowed"), None),
            AppError::DatabaseError(sqlx::Error::RowNotFound) => {
                (i18n.translate(lang, "errors.not_found_generic"), None)
            }

            // DatabaseError, InternalServerError e afins viram 500.
            // O detalhe fica só no log.
            e => {
                tracing::error!("🔥 Erro Interno do Servidor: {:?}", e);
                (i18n.translate(lang, "errors.internal"), None)
            }
        };

        ApiError { status, error, details }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "validation.required"))]
        name: String,
    }

    fn pt() -> Locale {
        Locale("pt".to_string())
    }

    #[test]
    fn maps_domain_errors_to_http_status() {
        assert_eq!(AppError::InvalidWebhookSecret.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::SubscriptionExpired.status_code(), StatusCode::PAYMENT_REQUIRED);
        assert_eq!(AppError::EmailAlreadyExists.status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::MethodNotAllowed.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(AppError::ResourceNotFound("order").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::DatabaseError(sqlx::Error::RowNotFound).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::DatabaseError(sqlx::Error::PoolTimedOut).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_message_names_the_resource() {
        let i18n = I18nStore::load().unwrap();
        let api = AppError::ResourceNotFound("order").to_api_error(&pt(), &i18n);
        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert_eq!(api.error, "Pedido não encontrado(a).");

        let en = AppError::ResourceNotFound("order").to_api_error(&Locale("en".into()), &i18n);
        assert_eq!(en.error, "Order not found.");
    }

    #[test]
    fn validation_errors_carry_translated_field_details() {
        let i18n = I18nStore::load().unwrap();
        let errors = Sample { name: String::new() }.validate().unwrap_err();

        let api = AppError::ValidationError(errors).to_api_error(&pt(), &i18n);

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.unwrap();
        assert_eq!(details["name"][0], "Campo obrigatório.");
    }

    #[test]
    fn internal_errors_hide_the_cause() {
        let i18n = I18nStore::load().unwrap();
        let api = AppError::InternalServerError(anyhow::anyhow!("senha do banco vazou"))
            .to_api_error(&pt(), &i18n);

        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.error.contains("senha"));
    }
}
