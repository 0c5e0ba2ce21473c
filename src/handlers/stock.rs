// src/handlers/stock.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::begin_rls_transaction,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::stock::{AdjustStockPayload, StockFilter, StockItem, StockItemPayload},
};

// POST /api/stock
#[utoipa::path(
    post,
    path = "/api/stock",
    tag = "Estoque",
    request_body = StockItemPayload,
    responses(
        (status = 201, description = "Item de estoque cadastrado", body = StockItem),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_stock_item(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<StockItemPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);
    payload.validate().map_err(AppError::from).map_err(err)?;

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    let item = app_state
        .stock_repo
        .create(&mut *tx, user.0.id, &payload)
        .await
        .map_err(err)?;
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok((StatusCode::CREATED, Json(item)))
}

// GET /api/stock
// ?lowOnly=true devolve só os alertas de estoque baixo
#[utoipa::path(
    get,
    path = "/api/stock",
    tag = "Estoque",
    params(StockFilter),
    responses((status = 200, description = "Itens de estoque", body = Vec<StockItem>)),
    security(("api_jwt" = []))
)]
pub async fn list_stock_items(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(filter): Query<StockFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    let items = app_state
        .stock_repo
        .list(&mut *tx, user.0.id, filter.low_only)
        .await
        .map_err(err)?;
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok((StatusCode::OK, Json(items)))
}

// GET /api/stock/alerts
#[utoipa::path(
    get,
    path = "/api/stock/alerts",
    tag = "Estoque",
    responses((status = 200, description = "Itens no mínimo ou abaixo dele", body = Vec<StockItem>)),
    security(("api_jwt" = []))
)]
pub async fn low_stock_alerts(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    let items = app_state
        .stock_repo
        .list(&mut *tx, user.0.id, true)
        .await
        .map_err(err)?;
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    if !items.is_empty() {
        tracing::debug!(user_id = %user.0.id, count = items.len(), "⚠️ Itens com estoque baixo");
    }
    Ok((StatusCode::OK, Json(items)))
}

// GET /api/stock/{id}
#[utoipa::path(
    get,
    path = "/api/stock/{id}",
    tag = "Estoque",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 200, description = "Item de estoque", body = StockItem),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_stock_item(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(item_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    let item = app_state
        .stock_repo
        .find(&mut *tx, user.0.id, item_id)
        .await
        .map_err(err)?
        .ok_or_else(|| err(AppError::ResourceNotFound("stock_item")))?;
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok((StatusCode::OK, Json(item)))
}

// PUT /api/stock/{id}
#[utoipa::path(
    put,
    path = "/api/stock/{id}",
    tag = "Estoque",
    params(("id" = Uuid, Path, description = "ID do item")),
    request_body = StockItemPayload,
    responses(
        (status = 200, description = "Item atualizado", body = StockItem),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_stock_item(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<StockItemPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);
    payload.validate().map_err(AppError::from).map_err(err)?;

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    let item = app_state
        .stock_repo
        .update(&mut *tx, user.0.id, item_id, &payload)
        .await
        .map_err(err)?
        .ok_or_else(|| err(AppError::ResourceNotFound("stock_item")))?;
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok((StatusCode::OK, Json(item)))
}

// POST /api/stock/{id}/adjust
// Entrada (delta positivo) ou consumo (negativo); o saldo nunca fica abaixo de zero
#[utoipa::path(
    post,
    path = "/api/stock/{id}/adjust",
    tag = "Estoque",
    params(("id" = Uuid, Path, description = "ID do item")),
    request_body = AdjustStockPayload,
    responses(
        (status = 200, description = "Saldo ajustado", body = StockItem),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn adjust_stock_item(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<AdjustStockPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);
    payload.validate().map_err(AppError::from).map_err(err)?;

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    let item = app_state
        .stock_repo
        .adjust(&mut *tx, user.0.id, item_id, payload.delta)
        .await
        .map_err(err)?
        .ok_or_else(|| err(AppError::ResourceNotFound("stock_item")))?;
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok((StatusCode::OK, Json(item)))
}

// DELETE /api/stock/{id}
#[utoipa::path(
    delete,
    path = "/api/stock/{id}",
    tag = "Estoque",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 204, description = "Item excluído"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_stock_item(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(item_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    let deleted = app_state
        .stock_repo
        .delete(&mut *tx, user.0.id, item_id)
        .await
        .map_err(err)?;
    if !deleted {
        return Err(err(AppError::ResourceNotFound("stock_item")));
    }
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok(StatusCode::NO_CONTENT)
}
