// src/handlers/associates.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        role::{AssociateOnly, RequireRole},
    },
    models::{
        associate::{Associate, ProfileUpdatePayload, TippingProfile},
        report::AssociateEarnings,
        tip::Tip,
    },
};

// GET /api/associates/{id}
#[utoipa::path(
    get,
    path = "/api/associates/{id}",
    tag = "Associates",
    responses(
        (status = 200, description = "Perfil público do associado", body = Associate),
        (status = 404, description = "Associado não encontrado")
    ),
    params(("id" = String, Path, description = "ID do associado"))
)]
pub async fn get_associate(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(associate_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let associate = app_state
        .associate_service
        .get(&associate_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(associate)))
}

// GET /api/associates/{id}/tipping-profile
#[utoipa::path(
    get,
    path = "/api/associates/{id}/tipping-profile",
    tag = "Associates",
    responses(
        (status = 200, description = "Dados do formulário de Bravo (inclui se gorjetas estão liberadas)", body = TippingProfile),
        (status = 404, description = "Associado não encontrado")
    ),
    params(("id" = String, Path, description = "ID do associado"))
)]
pub async fn get_tipping_profile(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(associate_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = app_state
        .tip_service
        .tipping_profile(&associate_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(profile)))
}

// PATCH /api/associates/me
#[utoipa::path(
    patch,
    path = "/api/associates/me",
    tag = "Associates",
    request_body = ProfileUpdatePayload,
    responses(
        (status = 200, description = "Perfil atualizado", body = Associate),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_my_profile(
    State(app_state): State<AppState>,
    locale: Locale,
    associate: RequireRole<AssociateOnly>,
    Json(payload): Json<ProfileUpdatePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let updated = app_state
        .associate_service
        .update_profile(&associate.user, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(updated)))
}

// GET /api/associates/me/earnings
#[utoipa::path(
    get,
    path = "/api/associates/me/earnings",
    tag = "Associates",
    responses(
        (status = 200, description = "Ganhos de hoje, da semana, do mês e total", body = AssociateEarnings)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_my_earnings(
    State(app_state): State<AppState>,
    locale: Locale,
    associate: RequireRole<AssociateOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let earnings = app_state
        .report_service
        .associate_earnings(&associate.user.id, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(earnings)))
}

// GET /api/associates/me/tips
#[utoipa::path(
    get,
    path = "/api/associates/me/tips",
    tag = "Associates",
    responses(
        (status = 200, description = "Bravos recebidos, mais recentes primeiro", body = [Tip])
    ),
    security(("api_jwt" = []))
)]
pub async fn get_my_tips(
    State(app_state): State<AppState>,
    locale: Locale,
    associate: RequireRole<AssociateOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let tips = app_state
        .tip_service
        .tips_for_associate(&associate.user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(tips)))
}
