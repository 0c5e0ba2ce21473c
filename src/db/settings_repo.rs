// src/db/settings_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;
use crate::{
    common::error::AppError,
    models::settings::{BakerySettings, UpdateSettingsRequest},
};

#[derive(Clone, Default)]
pub struct SettingsRepository;

impl SettingsRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_settings<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
    ) -> Result<Option<BakerySettings>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let settings = sqlx::query_as::<_, BakerySettings>(
            "SELECT * FROM bakery_settings WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(executor)
        .await?;
        Ok(settings)
    }

    // Se ainda não existir, devolve o padrão em vez de 404
    pub async fn get_settings<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
    ) -> Result<BakerySettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        Ok(self
            .find_settings(executor, user_id)
            .await?
            .unwrap_or_else(|| BakerySettings::empty(user_id)))
    }

    /// Linha inicial criada junto com a conta. Não sobrescreve se já existir.
    pub async fn create_default<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        bakery_name: &str,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO bakery_settings (user_id, bakery_name)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(bakery_name)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn update_settings<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        input: &UpdateSettingsRequest,
    ) -> Result<BakerySettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // UPSERT (Insert or Update)
        let settings = sqlx::query_as::<_, BakerySettings>(
            r#"
            INSERT INTO bakery_settings (
                user_id, bakery_name, logo_url, banner_url, address,
                phone, whatsapp, instagram, presentation_message
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (user_id)
            DO UPDATE SET
                bakery_name = EXCLUDED.bakery_name,
                logo_url = EXCLUDED.logo_url,
                banner_url = EXCLUDED.banner_url,
                address = EXCLUDED.address,
                phone = EXCLUDED.phone,
                whatsapp = EXCLUDED.whatsapp,
                instagram = EXCLUDED.instagram,
                presentation_message = EXCLUDED.presentation_message,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(input.bakery_name.trim())
        .bind(&input.logo_url)
        .bind(&input.banner_url)
        .bind(&input.address)
        .bind(&input.phone)
        .bind(&input.whatsapp)
        .bind(&input.instagram)
        .bind(&input.presentation_message)
        .fetch_one(executor)
        .await?;

        Ok(settings)
    }
}
