// src/middleware/role.rs

use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::authenticate, i18n::Locale},
    models::user::{CurrentUser, UserType},
    services::guard::{resolve, RouteDecision},
};

/// 1. O Trait que define quais papéis podem acessar a rota
pub trait RoleDef: Send + Sync + 'static {
    fn allowed() -> &'static [UserType];
}

/// 2. O Extractor (Guardião). Entrega o usuário já validado.
pub struct RequireRole<R> {
    pub user: CurrentUser,
    _role: PhantomData<R>,
}

impl<R, S> FromRequestParts<S> for RequireRole<R>
where
    R: RoleDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let locale = Locale::from_request_parts(parts, state)
            .await
            .unwrap_or_default();
        let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

        let user = authenticate(parts, &app_state).await.map_err(to_api)?;

        // Do lado do servidor o estado nunca está "carregando"
        match resolve(false, user.as_ref(), R::allowed()) {
            RouteDecision::Allow => match user {
                Some(user) => Ok(RequireRole { user, _role: PhantomData }),
                None => Err(to_api(AppError::InvalidToken)),
            },
            RouteDecision::Redirect(redirect_to) => Err(to_api(AppError::RoleRedirect { redirect_to })),
            RouteDecision::Wait => Err(to_api(AppError::ServiceUnavailable("session loading".into()))),
        }
    }
}

// ---
// DEFINIÇÃO DOS PAPÉIS (TIPOS)
// ---

pub struct AssociateOnly;
impl RoleDef for AssociateOnly {
    fn allowed() -> &'static [UserType] { &[UserType::Associate] }
}

pub struct CorporateOnly;
impl RoleDef for CorporateOnly {
    fn allowed() -> &'static [UserType] { &[UserType::Corporate] }
}

pub struct CustomerOnly;
impl RoleDef for CustomerOnly {
    fn allowed() -> &'static [UserType] { &[UserType::Customer] }
}

// Quem participa de conversas sobre um Bravo
pub struct AssociateOrCustomer;
impl RoleDef for AssociateOrCustomer {
    fn allowed() -> &'static [UserType] { &[UserType::Associate, UserType::Customer] }
}
