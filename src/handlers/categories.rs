// src/handlers/categories.rs

use axum::{
    extract::{Path, State},
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
    models::category::{build_category_tree, Category, CategoryNode, CategoryPayload},
};

// O pai precisa ser uma categoria principal da mesma conta (um nível só)
async fn check_parent(
    app_state: &AppState,
    conn: &mut PgConnection,
    user_id: Uuid,
    category_id: Option<Uuid>,
    parent_id: Option<Uuid>,
) -> Result<(), AppError> {
    let Some(parent_id) = parent_id else {
        return Ok(());
    };
    if Some(parent_id) == category_id {
        return Err(AppError::InvalidCategoryParent);
    }

    let parent = app_state.category_repo.find(&mut *conn, user_id, parent_id).await?;
    if !parent.is_some_and(|p| p.parent_id.is_none()) {
        return Err(AppError::InvalidCategoryParent);
    }

    // Quem já tem subcategorias não pode virar subcategoria
    if let Some(id) = category_id {
        if app_state.category_repo.has_subcategories(&mut *conn, user_id, id).await? {
            return Err(AppError::InvalidCategoryParent);
        }
    }
    Ok(())
}

// POST /api/categories
#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "Categorias",
    request_body = CategoryPayload,
    responses(
        (status = 201, description = "Categoria criada", body = Category),
        (status = 400, description = "Dados inválidos ou pai inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CategoryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);
    payload.validate().map_err(AppError::from).map_err(err)?;

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    check_parent(&app_state, &mut tx, user.0.id, None, payload.parent_id)
        .await
        .map_err(err)?;
    let category = app_state
        .category_repo
        .create(&mut *tx, user.0.id, &payload)
        .await
        .map_err(err)?;
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok((StatusCode::CREATED, Json(category)))
}

// GET /api/categories
#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Categorias",
    responses((status = 200, description = "Lista plana por posição e nome", body = Vec<Category>)),
    security(("api_jwt" = []))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    let categories = app_state.category_repo.list(&mut *tx, user.0.id).await.map_err(err)?;
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok((StatusCode::OK, Json(categories)))
}

// GET /api/categories/tree
#[utoipa::path(
    get,
    path = "/api/categories/tree",
    tag = "Categorias",
    responses((status = 200, description = "Categorias com as subcategorias aninhadas", body = Vec<CategoryNode>)),
    security(("api_jwt" = []))
)]
pub async fn category_tree(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    let categories = app_state.category_repo.list(&mut *tx, user.0.id).await.map_err(err)?;
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok((StatusCode::OK, Json(build_category_tree(categories))))
}

// PUT /api/categories/{id}
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    tag = "Categorias",
    params(("id" = Uuid, Path, description = "ID da categoria")),
    request_body = CategoryPayload,
    responses(
        (status = 200, description = "Categoria atualizada", body = Category),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_category(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(category_id): Path<Uuid>,
    Json(payload): Json<CategoryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);
    payload.validate().map_err(AppError::from).map_err(err)?;

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    check_parent(&app_state, &mut tx, user.0.id, Some(category_id), payload.parent_id)
        .await
        .map_err(err)?;
    let category = app_state
        .category_repo
        .update(&mut *tx, user.0.id, category_id, &payload)
        .await
        .map_err(err)?
        .ok_or_else(|| err(AppError::ResourceNotFound("category")))?;
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok((StatusCode::OK, Json(category)))
}

// DELETE /api/categories/{id}
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    tag = "Categorias",
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses(
        (status = 204, description = "Categoria excluída (subcategorias juntas)"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_category(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(category_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    let deleted = app_state
        .category_repo
        .delete(&mut *tx, user.0.id, category_id)
        .await
        .map_err(err)?;
    if !deleted {
        return Err(err(AppError::ResourceNotFound("category")));
    }
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok(StatusCode::NO_CONTENT)
}
