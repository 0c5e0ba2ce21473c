// src/handlers/finance.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::begin_rls_transaction,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::finance::{FinanceSummary, FinancialEntry, FinancialEntryPayload, PeriodQuery, TopProductEntry},
};

// =============================================================================
//  LANÇAMENTOS
// =============================================================================

// POST /api/finance/entries
#[utoipa::path(
    post,
    path = "/api/finance/entries",
    tag = "Financeiro",
    request_body = FinancialEntryPayload,
    responses(
        (status = 201, description = "Lançamento registrado", body = FinancialEntry),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_entry(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<FinancialEntryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);
    payload.validate().map_err(AppError::from).map_err(err)?;

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    let entry = app_state
        .finance_repo
        .create_entry(&mut *tx, user.0.id, &payload)
        .await
        .map_err(err)?;
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok((StatusCode::CREATED, Json(entry)))
}

// GET /api/finance/entries
#[utoipa::path(
    get,
    path = "/api/finance/entries",
    tag = "Financeiro",
    params(PeriodQuery),
    responses((status = 200, description = "Lançamentos do período", body = Vec<FinancialEntry>)),
    security(("api_jwt" = []))
)]
pub async fn list_entries(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(query): Query<PeriodQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);
    query.validate().map_err(AppError::from).map_err(err)?;
    let (from, to) = query.resolve(Utc::now().date_naive());

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    let entries = app_state
        .finance_repo
        .list_entries(&mut *tx, user.0.id, from, to, query.kind)
        .await
        .map_err(err)?;
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok((StatusCode::OK, Json(entries)))
}

// DELETE /api/finance/entries/{id}
#[utoipa::path(
    delete,
    path = "/api/finance/entries/{id}",
    tag = "Financeiro",
    params(("id" = Uuid, Path, description = "ID do lançamento")),
    responses(
        (status = 204, description = "Lançamento excluído"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_entry(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(entry_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    let deleted = app_state
        .finance_repo
        .delete_entry(&mut *tx, user.0.id, entry_id)
        .await
        .map_err(err)?;
    if !deleted {
        return Err(err(AppError::ResourceNotFound("financial_entry")));
    }
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  RELATÓRIOS
// =============================================================================

// GET /api/finance/summary
#[utoipa::path(
    get,
    path = "/api/finance/summary",
    tag = "Financeiro",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Faturamento, despesas e resultado do período", body = FinanceSummary),
        (status = 400, description = "Período inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(query): Query<PeriodQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);
    query.validate().map_err(AppError::from).map_err(err)?;
    let (from, to) = query.resolve(Utc::now().date_naive());

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    let summary = app_state
        .finance_service
        .summary(&mut *tx, user.0.id, from, to)
        .await
        .map_err(err)?;
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok((StatusCode::OK, Json(summary)))
}

// GET /api/finance/top-products
#[utoipa::path(
    get,
    path = "/api/finance/top-products",
    tag = "Financeiro",
    params(PeriodQuery),
    responses((status = 200, description = "Produtos mais vendidos no período", body = Vec<TopProductEntry>)),
    security(("api_jwt" = []))
)]
pub async fn top_products(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(query): Query<PeriodQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);
    query.validate().map_err(AppError::from).map_err(err)?;
    let (from, to) = query.resolve(Utc::now().date_naive());

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    let ranking = app_state
        .finance_service
        .top_products(&mut *tx, user.0.id, from, to, query.limit)
        .await
        .map_err(err)?;
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok((StatusCode::OK, Json(ranking)))
}
