// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        role::{CustomerOnly, RequireRole},
    },
    models::{
        auth::{AuthResponse, LoginUserPayload},
        user::{CurrentUser, UserType},
    },
};

// Cada portal de login aceita um conjunto de papéis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Portal {
    Business,
    Customer,
}

impl Portal {
    fn accepts(self, user: &CurrentUser) -> Result<(), AppError> {
        match self {
            Portal::Business if user.is(UserType::Customer) => Err(AppError::WrongPortal(
                "This form is for Business or Associate logins. Please use the customer login page.".into(),
            )),
            Portal::Customer if !user.is(UserType::Customer) => Err(AppError::WrongPortal(
                "This login is for customers only. Please use the Business & Associate login.".into(),
            )),
            _ => Ok(()),
        }
    }
}

async fn login_through(
    app_state: &AppState,
    portal: Portal,
    payload: LoginUserPayload,
) -> Result<AuthResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let auth_uid = app_state
        .auth_service
        .verify_credentials(&payload.email, &payload.password)
        .await?;
    let user = app_state.profile_service.require_current_user(&auth_uid).await?;
    portal.accepts(&user)?;

    if portal == Portal::Customer {
        if let Some(tip_id) = payload.claim_tip_id.as_deref() {
            // Falha ao vincular o Bravo não impede o login
            if let Err(e) = app_state.tip_service.claim_tip(tip_id, &user).await {
                tracing::warn!("⚠️ Não foi possível vincular o Bravo {} ao cliente {}: {}", tip_id, auth_uid, e);
            }
        }
    }

    let token = app_state.auth_service.create_token(&auth_uid)?;
    Ok(AuthResponse {
        token,
        home_path: user.user_type.home_path().to_string(),
        current_user: user,
    })
}

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Login de empresa ou associado", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas"),
        (status = 403, description = "Conta de cliente no portal errado")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<LoginUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let response = login_through(&app_state, Portal::Business, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(response)))
}

// POST /api/auth/customer-login
#[utoipa::path(
    post,
    path = "/api/auth/customer-login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Login de cliente (vincula claimTipId, se enviado)", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas"),
        (status = 403, description = "Conta de empresa no portal de clientes")
    )
)]
pub async fn customer_login(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<LoginUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let response = login_through(&app_state, Portal::Customer, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(response)))
}

// GET /api/users/me
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Usuário da sessão", body = CurrentUser),
        (status = 401, description = "Token ausente ou inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<CurrentUser> {
    Json(user)
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvatarPayload {
    #[validate(length(min = 1, message = "Avatar URL cannot be empty."))]
    pub avatar_url: String,
}

// PATCH /api/users/me/avatar
#[utoipa::path(
    patch,
    path = "/api/users/me/avatar",
    tag = "Users",
    request_body = AvatarPayload,
    responses(
        (status = 200, description = "Avatar do cliente atualizado", body = CurrentUser)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_avatar(
    State(app_state): State<AppState>,
    locale: Locale,
    customer: RequireRole<CustomerOnly>,
    Json(payload): Json<AvatarPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .profile_service
        .update_avatar(&customer.user, &payload.avatar_url)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let user = CurrentUser { avatar_url: Some(payload.avatar_url), ..customer.user };
    Ok((StatusCode::OK, Json(user)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(user_type: UserType) -> CurrentUser {
        CurrentUser { auth_uid: "u".into(), id: "u".into(), user_type, avatar_url: None }
    }

    #[test]
    fn portals_reject_the_other_side() {
        assert!(Portal::Business.accepts(&user(UserType::Associate)).is_ok());
        assert!(Portal::Business.accepts(&user(UserType::Corporate)).is_ok());
        assert!(matches!(
            Portal::Business.accepts(&user(UserType::Customer)),
            Err(AppError::WrongPortal(_))
        ));

        assert!(Portal::Customer.accepts(&user(UserType::Customer)).is_ok());
        assert!(matches!(
            Portal::Customer.accepts(&user(UserType::Associate)),
            Err(AppError::WrongPortal(_))
        ));
    }
}
