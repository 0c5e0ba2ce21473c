// src/handlers/settings.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::{
        db_utils::begin_rls_transaction,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::settings::{BakerySettings, UpdateSettingsRequest},
};

// GET /api/settings
// Sem registro salvo devolve os valores padrão
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Configurações",
    responses((status = 200, description = "Dados da confeitaria", body = BakerySettings)),
    security(("api_jwt" = []))
)]
pub async fn get_settings(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    let settings = app_state
        .settings_repo
        .get_settings(&mut *tx, user.0.id)
        .await
        .map_err(err)?;
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok((StatusCode::OK, Json(settings)))
}

// PUT /api/settings
#[utoipa::path(
    put,
    path = "/api/settings",
    tag = "Configurações",
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Configurações salvas", body = BakerySettings),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);
    payload.validate().map_err(AppError::from).map_err(err)?;

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    let updated = app_state
        .settings_repo
        .update_settings(&mut *tx, user.0.id, &payload)
        .await
        .map_err(err)?;
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok((StatusCode::OK, Json(updated)))
}
