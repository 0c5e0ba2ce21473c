// src/handlers/products.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sqlx::PgConnection;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::begin_rls_transaction,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::product::{CatalogVisibilityPayload, Product, ProductFilter, ProductPayload, SetStockPayload},
};

// Categoria e subcategoria precisam ser da conta; a subcategoria, filha da categoria escolhida
async fn check_categories(
    app_state: &AppState,
    conn: &mut PgConnection,
    user_id: Uuid,
    payload: &ProductPayload,
) -> Result<(), AppError> {
    if let Some(category_id) = payload.category_id {
        app_state
            .category_repo
            .find(&mut *conn, user_id, category_id)
            .await?
            .ok_or(AppError::ResourceNotFound("category"))?;
    }
    if let Some(subcategory_id) = payload.subcategory_id {
        let sub = app_state
            .category_repo
            .find(&mut *conn, user_id, subcategory_id)
            .await?
            .ok_or(AppError::ResourceNotFound("category"))?;
        if sub.parent_id.is_none() || (payload.category_id.is_some() && sub.parent_id != payload.category_id) {
            return Err(AppError::InvalidCategoryParent);
        }
    }
    Ok(())
}

// POST /api/products
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Produtos",
    request_body = ProductPayload,
    responses(
        (status = 201, description = "Produto criado", body = Product),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<ProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);
    payload.validate().map_err(AppError::from).map_err(err)?;

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    check_categories(&app_state, &mut tx, user.0.id, &payload).await.map_err(err)?;
    let product = app_state
        .product_repo
        .create(&mut *tx, user.0.id, &payload)
        .await
        .map_err(err)?;
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    tracing::info!(user_id = %user.0.id, product_id = %product.id, "🎂 Produto criado");
    Ok((StatusCode::CREATED, Json(product)))
}

// GET /api/products
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Produtos",
    params(ProductFilter),
    responses((status = 200, description = "Produtos", body = Vec<Product>)),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(filter): Query<ProductFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    let products = app_state
        .product_repo
        .list(&mut *tx, user.0.id, &filter)
        .await
        .map_err(err)?;
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok((StatusCode::OK, Json(products)))
}

// GET /api/products/{id}
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Produtos",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto", body = Product),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    let product = app_state
        .product_repo
        .find(&mut *tx, user.0.id, product_id)
        .await
        .map_err(err)?
        .ok_or_else(|| err(AppError::ResourceNotFound("product")))?;
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok((StatusCode::OK, Json(product)))
}

// PUT /api/products/{id}
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "Produtos",
    params(("id" = Uuid, Path, description = "ID do produto")),
    request_body = ProductPayload,
    responses(
        (status = 200, description = "Produto atualizado", body = Product),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<ProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);
    payload.validate().map_err(AppError::from).map_err(err)?;

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    check_categories(&app_state, &mut tx, user.0.id, &payload).await.map_err(err)?;
    let product = app_state
        .product_repo
        .update(&mut *tx, user.0.id, product_id, &payload)
        .await
        .map_err(err)?
        .ok_or_else(|| err(AppError::ResourceNotFound("product")))?;
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok((StatusCode::OK, Json(product)))
}

// DELETE /api/products/{id}
// Itens de pedidos antigos mantêm nome e preço
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Produtos",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 204, description = "Produto excluído"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    let deleted = app_state
        .product_repo
        .delete(&mut *tx, user.0.id, product_id)
        .await
        .map_err(err)?;
    if !deleted {
        return Err(err(AppError::ResourceNotFound("product")));
    }
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok(StatusCode::NO_CONTENT)
}

// PUT /api/products/{id}/stock
#[utoipa::path(
    put,
    path = "/api/products/{id}/stock",
    tag = "Produtos",
    params(("id" = Uuid, Path, description = "ID do produto")),
    request_body = SetStockPayload,
    responses(
        (status = 200, description = "Saldo contado manualmente", body = Product),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_stock(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<SetStockPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);
    payload.validate().map_err(AppError::from).map_err(err)?;

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    let product = app_state
        .product_repo
        .set_stock_quantity(&mut *tx, user.0.id, product_id, payload.stock_quantity)
        .await
        .map_err(err)?
        .ok_or_else(|| err(AppError::ResourceNotFound("product")))?;
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok((StatusCode::OK, Json(product)))
}

// PUT /api/products/{id}/catalog
#[utoipa::path(
    put,
    path = "/api/products/{id}/catalog",
    tag = "Produtos",
    params(("id" = Uuid, Path, description = "ID do produto")),
    request_body = CatalogVisibilityPayload,
    responses(
        (status = 200, description = "Visibilidade no catálogo alterada", body = Product),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_catalog_visibility(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<CatalogVisibilityPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    let product = app_state
        .product_repo
        .set_catalog_visibility(&mut *tx, user.0.id, product_id, payload.show_in_catalog)
        .await
        .map_err(err)?
        .ok_or_else(|| err(AppError::ResourceNotFound("product")))?;
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok((StatusCode::OK, Json(product)))
}
