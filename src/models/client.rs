// src/models/client.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::validation::validate_phone;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    #[schema(ignore)]
    pub user_id: Uuid,
    #[schema(example = "Joana Lima")]
    pub name: String,
    #[schema(example = "(11) 97777-6666")]
    pub phone: Option<String>,
    #[schema(example = "joana@email.com")]
    pub email: Option<String>,
    #[schema(example = "Rua das Flores, 123 - Centro")]
    pub address: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientPayload {
    #[validate(length(min = 1, max = 120, message = "validation.name_length"))]
    #[schema(example = "Joana Lima")]
    pub name: String,
    #[validate(length(max = 20, message = "validation.phone"), custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[validate(email(message = "validation.email"))]
    pub email: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClientFilter {
    /// Busca por nome, telefone ou e-mail
    pub search: Option<String>,
}

/// Só os dígitos do telefone; é assim que o catálogo reencontra o cliente.
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_normalization_keeps_only_digits() {
        assert_eq!(normalize_phone("(11) 97777-6666"), "11977776666");
        assert_eq!(normalize_phone("+55 11 9 7777 6666"), "5511977776666");
    }

    #[test]
    fn phone_must_carry_area_code_and_number() {
        let mut payload = ClientPayload {
            name: "Ana".into(),
            phone: Some("(11) 9777".into()),
            email: None,
            address: None,
            notes: None,
        };
        assert!(payload.validate().is_err());

        payload.phone = Some("(11) 97777-6666".into());
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn invalid_email_is_rejected() {
        let payload = ClientPayload {
            name: "Ana".into(),
            phone: None,
            email: Some("ana-sem-arroba".into()),
            address: None,
            notes: None,
        };
        assert!(payload.validate().is_err());
    }
}
