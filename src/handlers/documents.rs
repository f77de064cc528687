// src/handlers/documents.rs

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::{common::error::ApiError, config::AppState, middleware::i18n::Locale};

// GET /api/associates/{id}/qr
#[utoipa::path(
    get,
    path = "/api/associates/{id}/qr",
    tag = "Documents",
    responses(
        (status = 200, description = "QR code (SVG) do formulário de Bravo", content_type = "image/svg+xml", body = String),
        (status = 404, description = "Associado não encontrado")
    ),
    params(("id" = String, Path, description = "ID do associado"))
)]
pub async fn associate_qr(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(associate_id): Path<String>,
) -> Result<Response, ApiError> {
    let svg = app_state
        .document_service
        .associate_qr_svg(&associate_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}

// GET /api/associates/{id}/tip-card
#[utoipa::path(
    get,
    path = "/api/associates/{id}/tip-card",
    tag = "Documents",
    responses(
        (status = 200, description = "Cartão para impressão com o QR code", content_type = "application/pdf", body = Vec<u8>),
        (status = 404, description = "Associado não encontrado")
    ),
    params(("id" = String, Path, description = "ID do associado"))
)]
pub async fn associate_tip_card(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(associate_id): Path<String>,
) -> Result<Response, ApiError> {
    let pdf_bytes = app_state
        .document_service
        .tip_card_pdf(&associate_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // Configura os Headers para o navegador mostrar o PDF
    let disposition = format!("inline; filename=\"bravos_{}.pdf\"", associate_id);
    let headers = [
        (header::CONTENT_TYPE, "application/pdf"),
        (header::CONTENT_DISPOSITION, disposition.as_str()),
    ];

    Ok((headers, pdf_bytes).into_response())
}
