// src/middleware/subscription.rs

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
};

// Roda depois do auth_guard. Assinatura vencida (ou nunca paga) bloqueia as rotas de negócio com 402.
pub async fn subscription_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let active = request
        .extensions()
        .get::<AuthenticatedUser>()
        .map(|user| user.0.has_active_subscription(Utc::now()));

    match active {
        Some(true) => Ok(next.run(request).await),
        Some(false) => Err(AppError::SubscriptionExpired.to_api_error(&locale, &app_state.i18n_store)),
        None => Err(AppError::InvalidToken.to_api_error(&locale, &app_state.i18n_store)),
    }
}
