// src/services/email.rs
//
// Envio de e-mails transacionais (credenciais de acesso).

use async_trait::async_trait;
use serde_json::json;

use crate::common::error::AppError;

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    Skipped, // Provedor não configurado
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<Delivery, AppError>;
}

// --- Resend (HTTP) ---

#[derive(Clone)]
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
    from: String,
}

impl ResendMailer {
    pub fn new(api_key: String, from: String) -> Self {
        Self { client: reqwest::Client::new(), api_key, from }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, message: &EmailMessage) -> Result<Delivery, AppError> {
        let response = self
            .client
            .post(RESEND_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.from,
                "to": [message.to],
                "subject": message.subject,
                "html": message.html,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::InternalServerError(anyhow::anyhow!(
                "Resend recusou o e-mail: {} - {}",
                status,
                error_text
            )));
        }

        tracing::info!(to = %message.to, "📧 E-mail enviado");
        Ok(Delivery::Sent)
    }
}

// --- Sem provedor ---

#[derive(Clone, Default)]
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, message: &EmailMessage) -> Result<Delivery, AppError> {
        tracing::warn!(to = %message.to, "⚠️ RESEND_API_KEY ausente; e-mail não enviado");
        Ok(Delivery::Skipped)
    }
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// E-mail de boas-vindas com a senha provisória.
pub fn welcome_email(name: &str, email: &str, password: &str, login_url: &str) -> EmailMessage {
    let greeting = match name.trim() {
        "" => "Olá!".to_string(),
        name => format!("Olá, {}!", escape_html(name)),
    };

    let html = format!(
        r#"<div style="font-family: sans-serif; max-width: 480px; margin: 0 auto;">
  <h2>{greeting}</h2>
  <p>Sua assinatura foi confirmada e sua conta já está pronta.</p>
  <p><strong>E-mail:</strong> {email}<br><strong>Senha provisória:</strong> <code>{password}</code></p>
  <p>Por segurança, você vai precisar trocar a senha no primeiro acesso.</p>
  <p><a href="{login_url}" style="display: inline-block; padding: 10px 18px; background: #d9467a; color: #fff; text-decoration: none; border-radius: 6px;">Acessar o sistema</a></p>
</div>"#,
        email = escape_html(email),
        password = escape_html(password),
        login_url = escape_html(login_url),
    );

    EmailMessage {
        to: email.to_string(),
        subject: "Seu acesso à Confeitaria está pronto".to_string(),
        html,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_email_carries_credentials_and_link() {
        let msg = welcome_email("Maria", "maria@doces.com", "Ab3dEf6hIj9k", "https://app.confeitaria.app/login");

        assert_eq!(msg.to, "maria@doces.com");
        assert!(msg.html.contains("Olá, Maria!"));
        assert!(msg.html.contains("Ab3dEf6hIj9k"));
        assert!(msg.html.contains("https://app.confeitaria.app/login"));
    }

    #[test]
    fn welcome_email_escapes_customer_name() {
        let msg = welcome_email("<b>Zé</b>", "ze@doces.com", "x", "http://localhost:5173");
        assert!(msg.html.contains("&lt;b&gt;Zé&lt;/b&gt;"));
        assert!(!msg.html.contains("<b>Zé"));

        let anonymous = welcome_email("  ", "ze@doces.com", "x", "http://localhost:5173");
        assert!(anonymous.html.contains("Olá!"));
    }

    #[tokio::test]
    async fn disabled_mailer_skips_delivery() {
        let msg = welcome_email("Ana", "ana@doces.com", "senha", "http://localhost:5173");
        assert_eq!(DisabledMailer.send(&msg).await.unwrap(), Delivery::Skipped);
    }
}
