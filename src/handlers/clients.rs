// src/handlers/clients.rs

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
    models::{
        client::{Client, ClientFilter, ClientPayload},
        order::{Order, OrderFilter},
    },
};

// POST /api/clients
#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "Clientes",
    request_body = ClientPayload,
    responses(
        (status = 201, description = "Cliente cadastrado", body = Client),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<ClientPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);
    payload.validate().map_err(AppError::from).map_err(err)?;

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    let client = app_state
        .client_repo
        .create(&mut *tx, user.0.id, &payload)
        .await
        .map_err(err)?;
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok((StatusCode::CREATED, Json(client)))
}

// GET /api/clients
#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "Clientes",
    params(ClientFilter),
    responses((status = 200, description = "Clientes por nome", body = Vec<Client>)),
    security(("api_jwt" = []))
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(filter): Query<ClientFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    let clients = app_state
        .client_repo
        .list(&mut *tx, user.0.id, filter.search.as_deref())
        .await
        .map_err(err)?;
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok((StatusCode::OK, Json(clients)))
}

// GET /api/clients/{id}
#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    tag = "Clientes",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente", body = Client),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_client(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(client_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    let client = app_state
        .client_repo
        .find(&mut *tx, user.0.id, client_id)
        .await
        .map_err(err)?
        .ok_or_else(|| err(AppError::ResourceNotFound("client")))?;
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok((StatusCode::OK, Json(client)))
}

// PUT /api/clients/{id}
#[utoipa::path(
    put,
    path = "/api/clients/{id}",
    tag = "Clientes",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    request_body = ClientPayload,
    responses(
        (status = 200, description = "Cliente atualizado", body = Client),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_client(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(client_id): Path<Uuid>,
    Json(payload): Json<ClientPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);
    payload.validate().map_err(AppError::from).map_err(err)?;

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    let client = app_state
        .client_repo
        .update(&mut *tx, user.0.id, client_id, &payload)
        .await
        .map_err(err)?
        .ok_or_else(|| err(AppError::ResourceNotFound("client")))?;
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok((StatusCode::OK, Json(client)))
}

// DELETE /api/clients/{id}
// Os pedidos continuam com o nome do cliente; só perdem o vínculo
#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    tag = "Clientes",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 204, description = "Cliente excluído"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_client(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(client_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    let deleted = app_state
        .client_repo
        .delete(&mut *tx, user.0.id, client_id)
        .await
        .map_err(err)?;
    if !deleted {
        return Err(err(AppError::ResourceNotFound("client")));
    }
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/clients/{id}/orders
#[utoipa::path(
    get,
    path = "/api/clients/{id}/orders",
    tag = "Clientes",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Histórico de pedidos do cliente", body = Vec<Order>),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_client_orders(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(client_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    app_state
        .client_repo
        .find(&mut *tx, user.0.id, client_id)
        .await
        .map_err(err)?
        .ok_or_else(|| err(AppError::ResourceNotFound("client")))?;

    let filter = OrderFilter { client_id: Some(client_id), ..Default::default() };
    let orders = app_state
        .order_repo
        .list(&mut *tx, user.0.id, &filter)
        .await
        .map_err(err)?;
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok((StatusCode::OK, Json(orders)))
}
