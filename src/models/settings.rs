// src/models/settings.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

// Dados da vitrine (1:1 com o usuário)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BakerySettings {
    #[schema(ignore)]
    pub user_id: Uuid,

    #[schema(example = "Doces da Maria")]
    pub bakery_name: String,

    #[schema(example = "https://cdn.exemplo.com/logo.png")]
    pub logo_url: Option<String>,

    pub banner_url: Option<String>,

    #[schema(example = "Rua das Flores, 123 - Centro")]
    pub address: Option<String>,

    #[schema(example = "(11) 3333-4444")]
    pub phone: Option<String>,

    #[schema(example = "5511999998888")]
    pub whatsapp: Option<String>,

    #[schema(example = "@docesdamaria")]
    pub instagram: Option<String>,

    #[schema(example = "Bolos e doces artesanais feitos com carinho.")]
    pub presentation_message: Option<String>,

    pub updated_at: Option<DateTime<Utc>>,
}

impl BakerySettings {
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            bakery_name: String::from("Minha Confeitaria"),
            logo_url: None,
            banner_url: None,
            address: None,
            phone: None,
            whatsapp: None,
            instagram: None,
            presentation_message: None,
            updated_at: None,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[validate(length(min = 1, max = 120, message = "validation.name_length"))]
    #[schema(example = "Doces da Maria")]
    pub bakery_name: String,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub instagram: Option<String>,
    pub presentation_message: Option<String>,
}
