// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use utoipa::ToSchema;

// Representa um usuário (tenant) vindo do banco de dados.
// Os campos de assinatura são a fonte da verdade para plano e vencimento.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    #[schema(example = "contato@docesdamaria.com.br")]
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    #[schema(example = "monthly")]
    pub plan: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,

    // Contas criadas pelo webhook recebem senha gerada e precisam trocá-la
    pub must_change_password: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn has_active_subscription(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at > now)
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: Uuid,
    #[schema(example = "Maria Souza")]
    pub full_name: Option<String>,
    #[schema(example = "(11) 98888-7777")]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatus {
    pub plan: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub active: bool,
    pub days_left: i64,
}

impl SubscriptionStatus {
    pub fn from_user(user: &User, now: DateTime<Utc>) -> Self {
        let days_left = user
            .expires_at
            .map(|expires_at| (expires_at - now).num_days().max(0))
            .unwrap_or(0);

        Self {
            plan: user.plan.clone(),
            payment_date: user.payment_date,
            expires_at: user.expires_at,
            active: user.has_active_subscription(now),
            days_left,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user: User,
    pub profile: Option<Profile>,
    pub subscription: SubscriptionStatus,
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(email(message = "validation.email"))]
    #[schema(example = "contato@docesdamaria.com.br")]
    pub email: String,
    #[validate(length(min = 6, message = "validation.password_length"))]
    pub password: String,
    #[validate(length(min = 1, max = 120, message = "validation.name_length"))]
    #[schema(example = "Maria Souza")]
    pub full_name: Option<String>,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "validation.email"))]
    pub email: String,
    #[validate(length(min = 6, message = "validation.password_length"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordPayload {
    pub current_password: String,
    #[validate(length(min = 6, message = "validation.password_length"))]
    pub new_password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub must_change_password: bool,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user(expires_at: Option<DateTime<Utc>>) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: "a@b.com".into(),
            password_hash: "x".into(),
            plan: Some("monthly".into()),
            payment_date: Some(now),
            expires_at,
            must_change_password: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn subscription_is_active_only_before_expiry() {
        let now = Utc::now();
        assert!(user(Some(now + Duration::days(3))).has_active_subscription(now));
        assert!(!user(Some(now - Duration::seconds(1))).has_active_subscription(now));
        assert!(!user(None).has_active_subscription(now));
    }

    #[test]
    fn status_reports_days_left_and_never_negative() {
        let now = Utc::now();
        let status = SubscriptionStatus::from_user(&user(Some(now + Duration::days(10) + Duration::hours(1))), now);
        assert!(status.active);
        assert_eq!(status.days_left, 10);

        let expired = SubscriptionStatus::from_user(&user(Some(now - Duration::days(4))), now);
        assert!(!expired.active);
        assert_eq!(expired.days_left, 0);
    }
}
