// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::auth::User,
};

// Extrator para obter o usuário autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

// Guard das rotas protegidas: valida o Bearer e coloca o usuário nas extensions
pub async fn auth_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_owned())
        .ok_or_else(|| AppError::InvalidToken.to_api_error(&locale, &app_state.i18n_store))?;

    let user = app_state
        .auth_service
        .validate_token(&token)
        .await
        // Token válido de conta apagada também é 401
        .map_err(|e| match e {
            AppError::UserNotFound => AppError::InvalidToken,
            other => other,
        })
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<AuthenticatedUser>().cloned() {
            Some(user) => Ok(user),
            None => {
                let locale = Locale::from_request_parts(parts, state).await.unwrap_or_default();
                Err(AppError::InvalidToken.to_api_error(&locale, &state.i18n_store))
            }
        }
    }
}
