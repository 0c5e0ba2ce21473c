// src/handlers/orders.rs

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
    models::order::{
        ChangeStatusPayload, CreateOrderPayload, Order, OrderDetail, OrderFilter, OrderOrigin,
        StatusChangeResponse, UpdateOrderPayload,
    },
};

// POST /api/orders
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Pedidos",
    request_body = CreateOrderPayload,
    responses(
        (status = 201, description = "Pedido criado com itens e totais calculados", body = OrderDetail),
        (status = 400, description = "Itens inválidos ou pedido vazio"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);
    payload.validate().map_err(AppError::from).map_err(err)?;

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    let detail = app_state
        .order_service
        .create(&mut *tx, user.0.id, payload, OrderOrigin::Admin)
        .await
        .map_err(err)?;
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok((StatusCode::CREATED, Json(detail)))
}

// GET /api/orders
#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Pedidos",
    params(OrderFilter),
    responses((status = 200, description = "Pedidos mais recentes primeiro", body = Vec<Order>)),
    security(("api_jwt" = []))
)]
pub async fn list_orders(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(filter): Query<OrderFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    let orders = app_state
        .order_service
        .list(&mut *tx, user.0.id, &filter)
        .await
        .map_err(err)?;
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok((StatusCode::OK, Json(orders)))
}

// GET /api/orders/{id}
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "Pedidos",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Pedido com itens", body = OrderDetail),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_order(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    let detail = app_state
        .order_service
        .get(&mut *tx, user.0.id, order_id)
        .await
        .map_err(err)?;
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok((StatusCode::OK, Json(detail)))
}

// PUT /api/orders/{id}
#[utoipa::path(
    put,
    path = "/api/orders/{id}",
    tag = "Pedidos",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    request_body = UpdateOrderPayload,
    responses(
        (status = 200, description = "Pedido atualizado e totais recalculados", body = OrderDetail),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_order(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<UpdateOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);
    payload.validate().map_err(AppError::from).map_err(err)?;

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    let detail = app_state
        .order_service
        .update(&mut *tx, user.0.id, order_id, payload)
        .await
        .map_err(err)?;
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok((StatusCode::OK, Json(detail)))
}

// PATCH /api/orders/{id}/status
#[utoipa::path(
    patch,
    path = "/api/orders/{id}/status",
    tag = "Pedidos",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    request_body = ChangeStatusPayload,
    responses(
        (status = 200, description = "Status alterado; estoque de produtos ajustado", body = StatusChangeResponse),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_order_status(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<ChangeStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    let response = app_state
        .order_service
        .change_status(&mut *tx, user.0.id, order_id, payload.status)
        .await
        .map_err(err)?;
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok((StatusCode::OK, Json(response)))
}

// DELETE /api/orders/{id}
#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    tag = "Pedidos",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 204, description = "Pedido excluído; estoque devolvido se já tinha sido baixado"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_order(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    app_state
        .order_service
        .delete(&mut *tx, user.0.id, order_id)
        .await
        .map_err(err)?;
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok(StatusCode::NO_CONTENT)
}
