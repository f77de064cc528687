// src/handlers/scan.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::scan::{ScanPayload, ScanResult},
};

// POST /api/scan
#[utoipa::path(
    post,
    path = "/api/scan",
    tag = "Scan",
    request_body = ScanPayload,
    responses(
        (status = 200, description = "Para onde navegar depois da leitura do QR", body = ScanResult),
        (status = 400, description = "Não é um QR code do Bravos"),
        (status = 404, description = "Associado do QR não encontrado")
    )
)]
pub async fn scan(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<ScanPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|_| AppError::InvalidScanPayload.to_api_error(&locale, &app_state.i18n_store))?;

    let result = app_state
        .scan_service
        .route(&payload.data)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(result)))
}
