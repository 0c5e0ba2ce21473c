// src/db/user_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{Profile, User},
};

// O repositório de usuários: tabela 'users' (sem RLS) e 'profiles'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub plan: &'a str,
    pub payment_date: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub must_change_password: bool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu e-mail (sem diferenciar maiúsculas)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    // Versão transacional, com lock da linha (webhooks concorrentes para o mesmo e-mail)
    pub async fn find_by_email_for_update<'e, E>(
        &self,
        executor: E,
        email: &str,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE LOWER(email) = LOWER($1) FOR UPDATE",
        )
        .bind(email.trim())
        .fetch_optional(executor)
        .await?;
        Ok(user)
    }

    // Cria um novo usuário no banco de dados
    pub async fn create_user<'e, E>(&self, executor: E, new_user: NewUser<'_>) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, plan, payment_date, expires_at, must_change_password)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(new_user.email.trim())
        .bind(new_user.password_hash)
        .bind(new_user.plan)
        .bind(new_user.payment_date)
        .bind(new_user.expires_at)
        .bind(new_user.must_change_password)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            // Converte erro de violação de chave única em um erro mais amigável
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::EmailAlreadyExists;
                }
            }
            AppError::DatabaseError(e)
        })
    }

    pub async fn update_subscription<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        plan: &str,
        payment_date: Option<DateTime<Utc>>,
        expires_at: DateTime<Utc>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET plan = $2, payment_date = COALESCE($3, payment_date), expires_at = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(plan)
        .bind(payment_date)
        .bind(expires_at)
        .fetch_one(executor)
        .await?;
        Ok(user)
    }

    pub async fn update_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, must_change_password = FALSE, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // --- PERFIL ---

    pub async fn create_profile<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        full_name: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Profile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (user_id, full_name, phone)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE
                SET full_name = COALESCE(EXCLUDED.full_name, profiles.full_name),
                    phone = COALESCE(EXCLUDED.phone, profiles.phone),
                    updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(full_name)
        .bind(phone)
        .fetch_one(executor)
        .await?;
        Ok(profile)
    }

    pub async fn find_profile<'e, E>(&self, executor: E, user_id: Uuid) -> Result<Option<Profile>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(executor)
            .await?;
        Ok(profile)
    }
}
