// src/db/subscription_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;

// Histórico de pagamentos/cancelamentos recebidos pelo webhook
#[derive(Clone, Default)]
pub struct SubscriptionRepository;

pub struct SubscriptionRecord<'a> {
    pub user_id: Uuid,
    pub event: &'a str,
    pub plan: &'a str,
    pub status: &'a str,
    pub amount: Option<Decimal>,
    pub payment_method: Option<&'a str>,
    pub external_id: Option<&'a str>,
    pub starts_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SubscriptionRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn record<'e, E>(&self, executor: E, record: SubscriptionRecord<'_>) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO subscriptions (
                user_id, event, plan, status, amount, payment_method, external_id, starts_at, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(record.user_id)
        .bind(record.event)
        .bind(record.plan)
        .bind(record.status)
        .bind(record.amount)
        .bind(record.payment_method)
        .bind(record.external_id)
        .bind(record.starts_at)
        .bind(record.expires_at)
        .fetch_one(executor)
        .await?;
        Ok(id)
    }
}
