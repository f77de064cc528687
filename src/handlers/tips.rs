// src/handlers/tips.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::MaybeUser,
        i18n::Locale,
        role::{AssociateOnly, CustomerOnly, RequireRole},
    },
    models::tip::{SendTipPayload, SentTip, ThankYouNote, Tip},
};

// POST /api/tips
#[utoipa::path(
    post,
    path = "/api/tips",
    tag = "Tips",
    request_body = SendTipPayload,
    responses(
        (status = 201, description = "Bravo enviado (pagamento cobrado quando há valor)", body = SentTip),
        (status = 400, description = "Dados do Bravo inválidos"),
        (status = 402, description = "Pagamento recusado")
    ),
    security((), ("api_jwt" = []))
)]
pub async fn send_tip(
    State(app_state): State<AppState>,
    locale: Locale,
    MaybeUser(sender): MaybeUser,
    Json(payload): Json<SendTipPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let sent = app_state
        .tip_service
        .send_tip(payload, sender.as_ref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(sent)))
}

// POST /api/tips/{id}/claim
#[utoipa::path(
    post,
    path = "/api/tips/{id}/claim",
    tag = "Tips",
    responses(
        (status = 200, description = "Bravo vinculado ao cliente", body = Tip),
        (status = 409, description = "Bravo já vinculado a outro cliente")
    ),
    params(("id" = String, Path, description = "ID do Bravo")),
    security(("api_jwt" = []))
)]
pub async fn claim_tip(
    State(app_state): State<AppState>,
    locale: Locale,
    customer: RequireRole<CustomerOnly>,
    Path(tip_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let tip = app_state
        .tip_service
        .claim_tip(&tip_id, &customer.user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(tip)))
}

// GET /api/tips/history
#[utoipa::path(
    get,
    path = "/api/tips/history",
    tag = "Tips",
    responses(
        (status = 200, description = "Bravos enviados pelo cliente, mais recentes primeiro", body = [Tip])
    ),
    security(("api_jwt" = []))
)]
pub async fn customer_history(
    State(app_state): State<AppState>,
    locale: Locale,
    customer: RequireRole<CustomerOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let tips = app_state
        .tip_service
        .customer_history(&customer.user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(tips)))
}

// POST /api/tips/{id}/thank-you-note
#[utoipa::path(
    post,
    path = "/api/tips/{id}/thank-you-note",
    tag = "Tips",
    responses(
        (status = 200, description = "Sugestão de agradecimento gerada por IA", body = ThankYouNote),
        (status = 403, description = "Bravo de outro associado")
    ),
    params(("id" = String, Path, description = "ID do Bravo")),
    security(("api_jwt" = []))
)]
pub async fn thank_you_note(
    State(app_state): State<AppState>,
    locale: Locale,
    associate: RequireRole<AssociateOnly>,
    Path(tip_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let note = app_state
        .tip_service
        .thank_you_note(&tip_id, &associate.user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(ThankYouNote { note })))
}
