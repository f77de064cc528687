// src/handlers/messages.rs

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
        i18n::Locale,
        role::{AssociateOrCustomer, RequireRole},
    },
    models::message::{Message, SendMessagePayload},
};

// GET /api/tips/{id}/messages
#[utoipa::path(
    get,
    path = "/api/tips/{id}/messages",
    tag = "Messages",
    responses(
        (status = 200, description = "Conversa sobre o Bravo, em ordem cronológica", body = [Message]),
        (status = 403, description = "Usuário não participa deste Bravo")
    ),
    params(("id" = String, Path, description = "ID do Bravo")),
    security(("api_jwt" = []))
)]
pub async fn list_messages(
    State(app_state): State<AppState>,
    locale: Locale,
    participant: RequireRole<AssociateOrCustomer>,
    Path(tip_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let messages = app_state
        .message_service
        .conversation(&tip_id, &participant.user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(messages)))
}

// POST /api/tips/{id}/messages
#[utoipa::path(
    post,
    path = "/api/tips/{id}/messages",
    tag = "Messages",
    request_body = SendMessagePayload,
    responses(
        (status = 201, description = "Mensagem enviada", body = Message),
        (status = 422, description = "Destinatário sem conta")
    ),
    params(("id" = String, Path, description = "ID do Bravo")),
    security(("api_jwt" = []))
)]
pub async fn send_message(
    State(app_state): State<AppState>,
    locale: Locale,
    participant: RequireRole<AssociateOrCustomer>,
    Path(tip_id): Path<String>,
    Json(payload): Json<SendMessagePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let message = app_state
        .message_service
        .send(&tip_id, &participant.user, &payload.text)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(message)))
}
