// src/db/category_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::category::{Category, CategoryPayload},
};

#[derive(Clone, Default)]
pub struct CategoryRepository;

impl CategoryRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        input: &CategoryPayload,
    ) -> Result<Category, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (user_id, parent_id, name, banner_url, position)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(input.parent_id)
        .bind(input.name.trim())
        .bind(&input.banner_url)
        .bind(input.position)
        .fetch_one(executor)
        .await?;
        Ok(category)
    }

    pub async fn list<'e, E>(&self, executor: E, user_id: Uuid) -> Result<Vec<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT * FROM categories
            WHERE user_id = $1
            ORDER BY position ASC, name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?;
        Ok(categories)
    }

    pub async fn find<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        category_id: Uuid,
    ) -> Result<Option<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE user_id = $1 AND id = $2",
        )
        .bind(user_id)
        .bind(category_id)
        .fetch_optional(executor)
        .await?;
        Ok(category)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        category_id: Uuid,
        input: &CategoryPayload,
    ) -> Result<Option<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET parent_id = $3, name = $4, banner_url = $5, position = $6, updated_at = NOW()
            WHERE user_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(category_id)
        .bind(input.parent_id)
        .bind(input.name.trim())
        .bind(&input.banner_url)
        .bind(input.position)
        .fetch_optional(executor)
        .await?;
        Ok(category)
    }

    pub async fn has_subcategories<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        category_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM categories WHERE user_id = $1 AND parent_id = $2)",
        )
        .bind(user_id)
        .bind(category_id)
        .fetch_one(executor)
        .await?;
        Ok(exists)
    }

    // Subcategorias vão junto (ON DELETE CASCADE); produtos ficam sem categoria
    pub async fn delete<'e, E>(&self, executor: E, user_id: Uuid, category_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM categories WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(category_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
