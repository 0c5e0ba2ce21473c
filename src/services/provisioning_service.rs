// src/services/provisioning_service.rs
//
// Webhook da Cakto: cria ou renova a conta de quem pagou e cancela quando há estorno.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sqlx::PgPool;
use subtle::ConstantTimeEq;

use crate::{
    common::{db_utils::set_tenant, error::AppError},
    db::{
        subscription_repo::SubscriptionRecord,
        user_repo::NewUser,
        SettingsRepository, SubscriptionRepository, UserRepository,
    },
    models::{
        auth::User,
        webhook::{action_for_event, CaktoCustomer, CaktoWebhookPayload, Plan, WebhookAction, WebhookResponse},
    },
    services::email::{welcome_email, Delivery, Mailer},
};

const PASSWORD_LEN: usize = 12;
// Sem caracteres ambíguos (0/O, 1/l/I)
const PASSWORD_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnpqrstuvwxyz23456789";

/// Compara o segredo recebido com o configurado em tempo constante.
pub fn secret_matches(received: Option<&str>, expected: &str) -> bool {
    match received {
        Some(received) if !expected.is_empty() => bool::from(received.as_bytes().ct_eq(expected.as_bytes())),
        _ => false,
    }
}

pub fn generate_password() -> String {
    let mut rng = rand::rng();
    (0..PASSWORD_LEN)
        .map(|_| PASSWORD_CHARSET[rng.random_range(0..PASSWORD_CHARSET.len())] as char)
        .collect()
}

/// Renovação soma a partir do vencimento atual, se ele ainda estiver no futuro.
pub fn extended_expiry(current: Option<DateTime<Utc>>, now: DateTime<Utc>, plan: Plan) -> DateTime<Utc> {
    let start = current.filter(|expires_at| *expires_at > now).unwrap_or(now);
    start + Duration::days(plan.days())
}

enum Provisioned {
    Renewed(User),
    Created { user: User, password: String },
}

#[derive(Clone)]
pub struct ProvisioningService {
    pool: PgPool,
    user_repo: UserRepository,
    subscription_repo: SubscriptionRepository,
    settings_repo: SettingsRepository,
    mailer: Arc<dyn Mailer>,
    login_url: String,
}

impl ProvisioningService {
    pub fn new(
        pool: PgPool,
        user_repo: UserRepository,
        subscription_repo: SubscriptionRepository,
        settings_repo: SettingsRepository,
        mailer: Arc<dyn Mailer>,
        login_url: String,
    ) -> Self {
        Self { pool, user_repo, subscription_repo, settings_repo, mailer, login_url }
    }

    pub async fn handle(&self, payload: CaktoWebhookPayload) -> Result<WebhookResponse, AppError> {
        let action = action_for_event(&payload.event);
        tracing::info!(event = %payload.event, ?action, "🪝 Webhook Cakto recebido");

        match action {
            WebhookAction::Provision => self.provision(&payload).await,
            WebhookAction::Revoke => self.revoke(&payload).await,
            WebhookAction::Ignore => Ok(WebhookResponse::ignored(&payload.event)),
        }
    }

    fn customer_email(payload: &CaktoWebhookPayload) -> Result<(&CaktoCustomer, String), AppError> {
        let customer = payload
            .data
            .customer
            .as_ref()
            .ok_or_else(|| AppError::InvalidWebhookPayload("data.customer ausente".into()))?;
        let email = customer
            .email
            .as_deref()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| e.contains('@'))
            .ok_or_else(|| AppError::InvalidWebhookPayload("data.customer.email ausente ou inválido".into()))?;
        Ok((customer, email))
    }

    async fn provision(&self, payload: &CaktoWebhookPayload) -> Result<WebhookResponse, AppError> {
        let (customer, email) = Self::customer_email(payload)?;

        // Dois webhooks simultâneos para um e-mail novo: o segundo perde na unique e vira renovação
        let outcome = match self.provision_once(payload, customer, &email).await {
            Err(AppError::EmailAlreadyExists) => self.provision_once(payload, customer, &email).await?,
            other => other?,
        };

        match outcome {
            Provisioned::Renewed(user) => {
                tracing::info!(user_id = %user.id, plan = ?user.plan, expires_at = ?user.expires_at, "🔁 Assinatura renovada");
                Ok(WebhookResponse {
                    message: "Assinatura atualizada".into(),
                    user_id: Some(user.id),
                    created: Some(false),
                    email_sent: None,
                })
            }
            Provisioned::Created { user, password } => {
                let name = customer.name.as_deref().unwrap_or_default();
                let message = welcome_email(name, &user.email, &password, &self.login_url);

                // Falha no e-mail não desfaz a conta
                let email_sent = match self.mailer.send(&message).await {
                    Ok(Delivery::Sent) => true,
                    Ok(Delivery::Skipped) => false,
                    Err(e) => {
                        tracing::error!(user_id = %user.id, "🔥 Falha ao enviar credenciais: {:?}", e);
                        false
                    }
                };

                tracing::info!(user_id = %user.id, email_sent, "✅ Conta criada pelo webhook");
                Ok(WebhookResponse {
                    message: "Conta criada".into(),
                    user_id: Some(user.id),
                    created: Some(true),
                    email_sent: Some(email_sent),
                })
            }
        }
    }

    async fn provision_once(
        &self,
        payload: &CaktoWebhookPayload,
        customer: &CaktoCustomer,
        email: &str,
    ) -> Result<Provisioned, AppError> {
        let data = &payload.data;
        let plan = Plan::from_names(
            data.offer.as_ref().and_then(|o| o.name.as_deref()),
            data.product.as_ref().and_then(|p| p.name.as_deref()),
        );
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let existing = self.user_repo.find_by_email_for_update(&mut *tx, email).await?;
        let starts_at = existing
            .as_ref()
            .and_then(|u| u.expires_at)
            .filter(|expires_at| *expires_at > now)
            .unwrap_or(now);
        let expires_at = extended_expiry(existing.as_ref().and_then(|u| u.expires_at), now, plan);

        let outcome = match existing {
            Some(user) => {
                let user = self
                    .user_repo
                    .update_subscription(&mut *tx, user.id, plan.as_str(), Some(now), expires_at)
                    .await?;
                set_tenant(&mut tx, user.id).await?;
                Provisioned::Renewed(user)
            }
            None => {
                let password = generate_password();
                let to_hash = password.clone();
                let password_hash = tokio::task::spawn_blocking(move || bcrypt::hash(&to_hash, bcrypt::DEFAULT_COST))
                    .await
                    .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

                let user = self
                    .user_repo
                    .create_user(
                        &mut *tx,
                        NewUser {
                            email,
                            password_hash: &password_hash,
                            plan: plan.as_str(),
                            payment_date: Some(now),
                            expires_at,
                            must_change_password: true,
                        },
                    )
                    .await?;

                // Daqui em diante as tabelas com RLS precisam do tenant
                set_tenant(&mut tx, user.id).await?;

                let full_name = customer.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
                self.user_repo
                    .create_profile(&mut *tx, user.id, full_name, customer.phone.as_deref())
                    .await?;
                self.settings_repo
                    .create_default(&mut *tx, user.id, full_name.unwrap_or("Minha Confeitaria"))
                    .await?;

                Provisioned::Created { user, password }
            }
        };

        let user_id = match &outcome {
            Provisioned::Renewed(user) | Provisioned::Created { user, .. } => user.id,
        };
        let payment = data.payment.as_ref();
        self.subscription_repo
            .record(
                &mut *tx,
                SubscriptionRecord {
                    user_id,
                    event: &payload.event,
                    plan: plan.as_str(),
                    status: "active",
                    amount: payment
                        .and_then(|p| p.amount)
                        .or_else(|| data.offer.as_ref().and_then(|o| o.price)),
                    payment_method: payment.and_then(|p| p.method.as_deref()),
                    external_id: payment.and_then(|p| p.id.as_deref()),
                    starts_at,
                    expires_at,
                },
            )
            .await?;

        tx.commit().await?;
        Ok(outcome)
    }

    async fn revoke(&self, payload: &CaktoWebhookPayload) -> Result<WebhookResponse, AppError> {
        let (_, email) = Self::customer_email(payload)?;
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let Some(user) = self.user_repo.find_by_email_for_update(&mut *tx, &email).await? else {
            tracing::warn!(event = %payload.event, "⚠️ Cancelamento para e-mail sem conta");
            return Ok(WebhookResponse {
                message: "Nenhuma conta para cancelar".into(),
                user_id: None,
                created: None,
                email_sent: None,
            });
        };

        let plan = user.plan.clone().unwrap_or_else(|| Plan::Monthly.as_str().to_string());
        let user = self
            .user_repo
            .update_subscription(&mut *tx, user.id, &plan, None, now)
            .await?;

        set_tenant(&mut tx, user.id).await?;
        let payment = payload.data.payment.as_ref();
        self.subscription_repo
            .record(
                &mut *tx,
                SubscriptionRecord {
                    user_id: user.id,
                    event: &payload.event,
                    plan: &plan,
                    status: "canceled",
                    amount: payment.and_then(|p| p.amount),
                    payment_method: payment.and_then(|p| p.method.as_deref()),
                    external_id: payment.and_then(|p| p.id.as_deref()),
                    starts_at: now,
                    expires_at: now,
                },
            )
            .await?;

        tx.commit().await?;

        tracing::info!(user_id = %user.id, event = %payload.event, "⛔ Assinatura cancelada");
        Ok(WebhookResponse {
            message: "Assinatura cancelada".into(),
            user_id: Some(user.id),
            created: Some(false),
            email_sent: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_comparison() {
        assert!(secret_matches(Some("s3gredo"), "s3gredo"));
        assert!(!secret_matches(Some("s3gred"), "s3gredo"));
        assert!(!secret_matches(None, "s3gredo"));
        // Segredo não configurado nunca autoriza
        assert!(!secret_matches(Some(""), ""));
    }

    #[test]
    fn generated_password_uses_the_safe_charset() {
        let password = generate_password();
        assert_eq!(password.len(), PASSWORD_LEN);
        assert!(password.bytes().all(|b| PASSWORD_CHARSET.contains(&b)));
        assert_ne!(generate_password(), generate_password());
    }

    #[test]
    fn renewal_extends_from_the_later_of_now_and_current_expiry() {
        let now = Utc::now();

        let active = now + Duration::days(10);
        assert_eq!(extended_expiry(Some(active), now, Plan::Monthly), active + Duration::days(30));

        let lapsed = now - Duration::days(3);
        assert_eq!(extended_expiry(Some(lapsed), now, Plan::Annual), now + Duration::days(365));

        assert_eq!(extended_expiry(None, now, Plan::Quarterly), now + Duration::days(90));
    }
}
