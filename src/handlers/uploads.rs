// src/handlers/uploads.rs

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UploadQuery {
    /// Pasta de destino (ex: `avatars`, `logos`)
    pub folder: String,
    pub file_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub url: String,
}

// POST /api/uploads
#[utoipa::path(
    post,
    path = "/api/uploads",
    tag = "Uploads",
    params(UploadQuery),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "Arquivo salvo; devolve a URL pública", body = UploadResponse),
        (status = 400, description = "Nome de arquivo ou pasta inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    if body.is_empty() {
        return Err(AppError::InvalidInput("The uploaded file is empty.".into())
            .to_api_error(&locale, &app_state.i18n_store));
    }

    let url = app_state
        .storage
        .upload(&query.folder, &query.file_name, body.to_vec())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tracing::info!("📤 Upload de {} por {}", query.file_name, user.auth_uid);
    Ok((StatusCode::CREATED, Json(UploadResponse { url })))
}
