// src/handlers/catalog.rs
//
// Vitrine pública: sem token, o tenant vem no caminho.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::catalog::{CheckoutPayload, CheckoutResponse, PublicCatalog},
};

// GET /api/catalog/{tenant_id}
#[utoipa::path(
    get,
    path = "/api/catalog/{tenant_id}",
    tag = "Catálogo",
    params(("tenant_id" = Uuid, Path, description = "ID da confeitaria")),
    responses(
        (status = 200, description = "Dados da loja, categorias e produtos publicados", body = PublicCatalog),
        (status = 404, description = "Catálogo indisponível")
    )
)]
pub async fn get_catalog(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(tenant_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let catalog = app_state
        .catalog_service
        .get_catalog(tenant_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(catalog)))
}

// POST /api/catalog/{tenant_id}/checkout
#[utoipa::path(
    post,
    path = "/api/catalog/{tenant_id}/checkout",
    tag = "Catálogo",
    params(("tenant_id" = Uuid, Path, description = "ID da confeitaria")),
    request_body = CheckoutPayload,
    responses(
        (status = 201, description = "Pedido registrado como orçamento", body = CheckoutResponse),
        (status = 400, description = "Itens inválidos"),
        (status = 404, description = "Catálogo indisponível")
    )
)]
pub async fn checkout(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(tenant_id): Path<Uuid>,
    Json(payload): Json<CheckoutPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);
    payload.validate().map_err(AppError::from).map_err(err)?;

    let response = app_state
        .catalog_service
        .checkout(tenant_id, payload)
        .await
        .map_err(err)?;

    Ok((StatusCode::CREATED, Json(response)))
}
