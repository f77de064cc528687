// src/handlers/signup.rs

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    models::signup::{SelectAccountTypePayload, SignupForm, SignupOutcome, WizardView},
};

// POST /api/signup
#[utoipa::path(
    post,
    path = "/api/signup",
    tag = "Signup",
    responses(
        (status = 201, description = "Nova sessão do wizard (etapa 0)", body = WizardView)
    )
)]
pub async fn create_session(State(app_state): State<AppState>) -> impl IntoResponse {
    (StatusCode::CREATED, Json(app_state.signup_service.create().await))
}

// GET /api/signup/{id}
#[utoipa::path(
    get,
    path = "/api/signup/{id}",
    tag = "Signup",
    responses(
        (status = 200, description = "Etapa atual", body = WizardView),
        (status = 404, description = "Sessão não encontrada")
    ),
    params(("id" = Uuid, Path, description = "ID da sessão do wizard"))
)]
pub async fn get_session(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let view = app_state
        .signup_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(view)))
}

// POST /api/signup/{id}/account-type
#[utoipa::path(
    post,
    path = "/api/signup/{id}/account-type",
    tag = "Signup",
    request_body = SelectAccountTypePayload,
    responses(
        (status = 200, description = "Tipo de conta escolhido", body = WizardView),
        (status = 400, description = "Fora da etapa 0")
    ),
    params(("id" = Uuid, Path, description = "ID da sessão do wizard"))
)]
pub async fn select_account_type(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<SelectAccountTypePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let view = app_state
        .signup_service
        .select_account_type(id, payload.account_type)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(view)))
}

// POST /api/signup/{id}/next
#[utoipa::path(
    post,
    path = "/api/signup/{id}/next",
    tag = "Signup",
    request_body = SignupForm,
    responses(
        (status = 200, description = "Campos mesclados; avançou uma etapa", body = WizardView),
        (status = 400, description = "Etapa exige verificação ou envio")
    ),
    params(("id" = Uuid, Path, description = "ID da sessão do wizard"))
)]
pub async fn next_step(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(form): Json<SignupForm>,
) -> Result<impl IntoResponse, ApiError> {
    let view = app_state
        .signup_service
        .next(id, form)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(view)))
}

// POST /api/signup/{id}/back
#[utoipa::path(
    post,
    path = "/api/signup/{id}/back",
    tag = "Signup",
    responses(
        (status = 200, description = "Voltou uma etapa", body = WizardView)
    ),
    params(("id" = Uuid, Path, description = "ID da sessão do wizard"))
)]
pub async fn previous_step(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let view = app_state
        .signup_service
        .back(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(view)))
}

// POST /api/signup/{id}/reset
#[utoipa::path(
    post,
    path = "/api/signup/{id}/reset",
    tag = "Signup",
    responses(
        (status = 200, description = "Wizard reiniciado (mesmo ID)", body = WizardView)
    ),
    params(("id" = Uuid, Path, description = "ID da sessão do wizard"))
)]
pub async fn reset_session(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let view = app_state
        .signup_service
        .reset(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(view)))
}

// POST /api/signup/{id}/verify
#[utoipa::path(
    post,
    path = "/api/signup/{id}/verify",
    tag = "Signup",
    request_body = SignupForm,
    responses(
        (status = 200, description = "Verificação do funcionário (claim, request ou error)", body = WizardView),
        (status = 400, description = "Email e Employer ID obrigatórios")
    ),
    params(("id" = Uuid, Path, description = "ID da sessão do wizard"))
)]
pub async fn verify_employee(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(form): Json<SignupForm>,
) -> Result<impl IntoResponse, ApiError> {
    let view = app_state
        .signup_service
        .verify(id, form)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(view)))
}

// POST /api/signup/{id}/submit
#[utoipa::path(
    post,
    path = "/api/signup/{id}/submit",
    tag = "Signup",
    request_body = SignupForm,
    responses(
        (status = 200, description = "Conta criada (com token) ou pedido de entrada enviado", body = SignupOutcome),
        (status = 400, description = "Campos obrigatórios ausentes"),
        (status = 409, description = "Email já cadastrado ou conta já reivindicada")
    ),
    params(("id" = Uuid, Path, description = "ID da sessão do wizard"))
)]
pub async fn submit(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(form): Json<SignupForm>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = app_state
        .signup_service
        .submit(id, form)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(outcome)))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AvatarQuery {
    pub file_name: String,
}

// POST /api/signup/{id}/avatar
// Sem login: a sessão do wizard é a credencial do upload
#[utoipa::path(
    post,
    path = "/api/signup/{id}/avatar",
    tag = "Signup",
    params(("id" = Uuid, Path, description = "ID da sessão do wizard"), AvatarQuery),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Imagem salva; `avatarUrl` preenchido na sessão", body = WizardView),
        (status = 400, description = "Arquivo vazio, nome inválido ou tipo de conta ainda não escolhido"),
        (status = 404, description = "Sessão não encontrada")
    )
)]
pub async fn upload_avatar(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Query(query): Query<AvatarQuery>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let view = app_state
        .signup_service
        .upload_avatar(id, &query.file_name, body.to_vec())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(view)))
}
