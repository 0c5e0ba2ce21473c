//src/main.rs

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;

use crate::config::{AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar
    let config = Config::from_env()?;
    let bind_addr = config.bind_addr.clone();
    let app_state = AppState::new(config).await?;

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados")?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Falha ao iniciar o listener TCP em {}", bind_addr))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    tracing::info!("📚 Documentação em http://{}/swagger-ui", bind_addr);

    axum::serve(listener, app).await.context("Erro no servidor Axum")?;
    Ok(())
}
