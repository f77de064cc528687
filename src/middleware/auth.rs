// src/middleware/auth.rs

use axum::{
    extract::{FromRef, FromRequestParts, Query, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

use serde::Deserialize;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::user::CurrentUser,
};

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

// Lê "Authorization: Bearer <token>" ou, para o EventSource do navegador, `?token=`
fn bearer_token(parts: &Parts) -> Option<String> {
    let from_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string());

    from_header.or_else(|| {
        Query::<TokenQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(query)| query.token)
            .filter(|token| !token.is_empty())
    })
}

/// Resolve o usuário da requisição. `Ok(None)` = anônimo.
pub async fn authenticate(parts: &Parts, app_state: &AppState) -> Result<Option<CurrentUser>, AppError> {
    if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
        return Ok(Some(user.0.clone()));
    }
    let Some(token) = bearer_token(parts) else {
        return Ok(None);
    };
    let auth_uid = app_state.auth_service.validate_token(&token)?;
    app_state.profile_service.resolve_current_user(&auth_uid).await
}

// O middleware: rotas que exigem login (com perfil completo)
pub async fn auth_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (mut parts, body) = request.into_parts();

    let user = authenticate(&parts, &app_state)
        .await
        .and_then(|user| user.ok_or(AppError::InvalidToken))
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // Insere o usuário nos "extensions" da requisição
    parts.extensions.insert(AuthenticatedUser(user));
    Ok(next.run(Request::from_parts(parts, body)).await)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub CurrentUser);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        authenticate(parts, &app_state)
            .await?
            .map(AuthenticatedUser)
            .ok_or(AppError::InvalidToken)
    }
}

// Identidade opcional: clientes convidados podem enviar Bravos sem login.
// Token inválido continua sendo erro.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        Ok(MaybeUser(authenticate(parts, &app_state).await?))
    }
}

// Só o authUid do token, sem exigir perfil (o stream de sync lida com perfil ausente)
#[derive(Debug, Clone)]
pub struct Identity(pub Option<String>);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        match bearer_token(parts) {
            Some(token) => Ok(Identity(Some(app_state.auth_service.validate_token(&token)?))),
            None => Ok(Identity(None)),
        }
    }
}
