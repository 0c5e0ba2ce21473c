// src/db/client_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::client::{normalize_phone, Client, ClientPayload},
};

#[derive(Clone, Default)]
pub struct ClientRepository;

impl ClientRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        input: &ClientPayload,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (user_id, name, phone, email, address, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(input.name.trim())
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .bind(&input.notes)
        .fetch_one(executor)
        .await?;
        Ok(client)
    }

    // Filtro feito no banco (ILIKE) em vez de trazer tudo para a memória
    pub async fn list<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        search: Option<&str>,
    ) -> Result<Vec<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT * FROM clients
            WHERE user_id = $1
              AND ($2::text IS NULL OR name ILIKE $2 OR phone ILIKE $2 OR email ILIKE $2)
            ORDER BY name ASC
            "#,
        )
        .bind(user_id)
        .bind(pattern)
        .fetch_all(executor)
        .await?;
        Ok(clients)
    }

    pub async fn find<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        client_id: Uuid,
    ) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(
            "SELECT * FROM clients WHERE user_id = $1 AND id = $2",
        )
        .bind(user_id)
        .bind(client_id)
        .fetch_optional(executor)
        .await?;
        Ok(client)
    }

    pub async fn find_by_phone<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        phone: &str,
    ) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(
            r#"
            SELECT * FROM clients
            WHERE user_id = $1 AND regexp_replace(phone, '\D', '', 'g') = $2
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(normalize_phone(phone))
        .fetch_optional(executor)
        .await?;
        Ok(client)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        client_id: Uuid,
        input: &ClientPayload,
    ) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients
            SET name = $3, phone = $4, email = $5, address = $6, notes = $7, updated_at = NOW()
            WHERE user_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(client_id)
        .bind(input.name.trim())
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .bind(&input.notes)
        .fetch_optional(executor)
        .await?;
        Ok(client)
    }

    // Os pedidos mantêm client_name; o FK vira NULL
    pub async fn delete<'e, E>(&self, executor: E, user_id: Uuid, client_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM clients WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(client_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
