// src/handlers/webhooks.rs

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::webhook::{CaktoWebhookPayload, WebhookResponse, CAKTO_SECRET_HEADER},
    services::provisioning_service::secret_matches,
};

// POST /api/webhooks/cakto
// O corpo só é interpretado depois de conferir o segredo
#[utoipa::path(
    post,
    path = "/api/webhooks/cakto",
    tag = "Webhooks",
    request_body = CaktoWebhookPayload,
    params(("x-cakto-secret" = String, Header, description = "Segredo compartilhado com a Cakto")),
    responses(
        (status = 200, description = "Evento processado", body = WebhookResponse),
        (status = 400, description = "Corpo inválido ou e-mail do cliente ausente"),
        (status = 401, description = "Segredo inválido"),
        (status = 405, description = "Método não permitido")
    )
)]
pub async fn cakto_webhook(
    State(app_state): State<AppState>,
    locale: Locale,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let err = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let received = headers.get(CAKTO_SECRET_HEADER).and_then(|v| v.to_str().ok());
    if !secret_matches(received, &app_state.config.cakto_webhook_secret) {
        tracing::warn!("🚫 Webhook Cakto com segredo inválido");
        return Err(err(AppError::InvalidWebhookSecret));
    }

    let payload: CaktoWebhookPayload = serde_json::from_slice(&body)
        .map_err(|e| err(AppError::InvalidWebhookPayload(e.to_string())))?;

    let response = app_state
        .provisioning_service
        .handle(payload)
        .await
        .map_err(err)?;

    Ok((StatusCode::OK, Json(response)))
}

// Qualquer outro método na rota do webhook
pub async fn method_not_allowed(State(app_state): State<AppState>, locale: Locale) -> ApiError {
    AppError::MethodNotAllowed.to_api_error(&locale, &app_state.i18n_store)
}
