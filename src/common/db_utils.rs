// src/common/db_utils.rs

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::config::AppState;
use crate::middleware::auth::AuthenticatedUser;

// ---
// Helper RLS: A "Chave" para o Banco de Dados
// ---
/// Abre a transação da requisição já com `app.user_id` definido.
/// O `set_config(..., true)` só vale dentro de uma transação, por isso o handler
/// recebe a transação e faz o commit no final.
pub(crate) async fn begin_rls_transaction(
    app_state: &AppState,
    user: &AuthenticatedUser,
) -> Result<Transaction<'static, Postgres>, AppError> {
    begin_tenant_transaction(&app_state.db_pool, user.0.id).await
}

/// Mesma coisa, para rotas públicas (catálogo) e para o webhook, onde o tenant vem do path
/// ou acabou de ser criado.
pub(crate) async fn begin_tenant_transaction(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Transaction<'static, Postgres>, AppError> {
    let mut tx = pool.begin().await?;
    set_tenant(&mut tx, user_id).await?;
    Ok(tx)
}

pub(crate) async fn set_tenant(
    tx: &mut Transaction<'static, Postgres>,
    user_id: Uuid,
) -> Result<(), AppError> {
    sqlx::query("SELECT set_config('app.user_id', $1, true)")
        .bind(user_id.to_string())
        .execute(&mut **tx)
        .await?;
    Ok(())
}
