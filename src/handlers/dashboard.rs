// src/handlers/dashboard.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::{
        db_utils::begin_rls_transaction,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::dashboard::DashboardSummary,
};

// GET /api/dashboard/summary
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Resumo operacional do dia", body = DashboardSummary),
        (status = 401, description = "Não autorizado"),
        (status = 402, description = "Assinatura vencida")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(err)?;
    let summary = app_state
        .dashboard_service
        .get_summary(&mut *tx, user.0.id)
        .await
        .map_err(err)?;
    tx.commit().await.map_err(AppError::from).map_err(err)?;

    Ok((StatusCode::OK, Json(summary)))
}
