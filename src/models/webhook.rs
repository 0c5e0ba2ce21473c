// src/models/webhook.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use utoipa::ToSchema;

pub const CAKTO_SECRET_HEADER: &str = "x-cakto-secret";

// --- Payload da Cakto ---

#[derive(Debug, Deserialize, ToSchema)]
pub struct CaktoWebhookPayload {
    #[schema(example = "purchase_approved")]
    pub event: String,
    #[serde(default)]
    pub data: CaktoData,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CaktoData {
    pub customer: Option<CaktoCustomer>,
    pub payment: Option<CaktoPayment>,
    pub offer: Option<CaktoOffer>,
    pub product: Option<CaktoProduct>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaktoCustomer {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub doc_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaktoPayment {
    pub id: Option<String>,
    pub amount: Option<Decimal>,
    #[serde(alias = "paymentMethod")]
    pub method: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CaktoOffer {
    pub id: Option<String>,
    pub name: Option<String>,
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CaktoProduct {
    pub id: Option<String>,
    pub name: Option<String>,
}

// --- Interpretação ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookAction {
    Provision,
    Revoke,
    Ignore,
}

pub fn action_for_event(event: &str) -> WebhookAction {
    match event.trim().to_lowercase().as_str() {
        "purchase_approved" | "subscription_renewed" => WebhookAction::Provision,
        "subscription_canceled" | "subscription_cancelled" | "refund" | "chargeback" => {
            WebhookAction::Revoke
        }
        _ => WebhookAction::Ignore,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    Trial,
    Monthly,
    Quarterly,
    Semiannual,
    Annual,
}

impl Plan {
    pub fn as_str(self) -> &'static str {
        match self {
            Plan::Trial => "trial",
            Plan::Monthly => "monthly",
            Plan::Quarterly => "quarterly",
            Plan::Semiannual => "semiannual",
            Plan::Annual => "annual",
        }
    }

    pub fn days(self) -> i64 {
        match self {
            Plan::Trial => 7,
            Plan::Monthly => 30,
            Plan::Quarterly => 90,
            Plan::Semiannual => 180,
            Plan::Annual => 365,
        }
    }

    /// O plano vem do nome da oferta (ou do produto, se a oferta não tiver nome).
    pub fn from_names(offer_name: Option<&str>, product_name: Option<&str>) -> Plan {
        let name = offer_name
            .filter(|n| !n.trim().is_empty())
            .or(product_name)
            .unwrap_or_default()
            .to_lowercase();

        if name.contains("anual") || name.contains("annual") || name.contains("yearly") {
            Plan::Annual
        } else if name.contains("semestral") {
            Plan::Semiannual
        } else if name.contains("trimestral") || name.contains("quarterly") {
            Plan::Quarterly
        } else {
            Plan::Monthly
        }
    }
}

// --- Resposta ---

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_sent: Option<bool>,
}

impl WebhookResponse {
    pub fn ignored(event: &str) -> Self {
        Self {
            message: format!("Evento '{}' ignorado", event),
            user_id: None,
            created: None,
            email_sent: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_events_to_actions() {
        assert_eq!(action_for_event("purchase_approved"), WebhookAction::Provision);
        assert_eq!(action_for_event("subscription_renewed"), WebhookAction::Provision);
        assert_eq!(action_for_event("subscription_cancelled"), WebhookAction::Revoke);
        assert_eq!(action_for_event("refund"), WebhookAction::Revoke);
        assert_eq!(action_for_event("pix_gerado"), WebhookAction::Ignore);
    }

    #[test]
    fn plan_comes_from_offer_name_then_product_name() {
        assert_eq!(Plan::from_names(Some("Plano Anual"), None), Plan::Annual);
        assert_eq!(Plan::from_names(Some("Semestral Promo"), Some("Anual")), Plan::Semiannual);
        assert_eq!(Plan::from_names(Some("  "), Some("Assinatura Trimestral")), Plan::Quarterly);
        assert_eq!(Plan::from_names(None, None), Plan::Monthly);
        assert_eq!(Plan::Annual.days(), 365);
    }

    #[test]
    fn parses_a_cakto_payload_with_missing_sections() {
        let payload: CaktoWebhookPayload = serde_json::from_value(serde_json::json!({
            "event": "purchase_approved",
            "data": {
                "customer": { "name": "Maria", "email": "maria@ex.com", "docNumber": "123" },
                "payment": { "amount": 49.9, "paymentMethod": "pix" }
            }
        }))
        .unwrap();

        let customer = payload.data.customer.unwrap();
        assert_eq!(customer.email.as_deref(), Some("maria@ex.com"));
        assert_eq!(payload.data.payment.unwrap().method.as_deref(), Some("pix"));
        assert!(payload.data.offer.is_none());
    }
}
