// src/handlers/corporations.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        role::{CorporateOnly, RequireRole},
    },
    models::{
        associate::{AddAssociatePayload, Associate, AssociateTipsPayload, BulkImportResult},
        corporation::{CorporateEntity, CorporateSettings},
        join_request::JoinRequest,
        report::{CorporateReport, CorporateSummary, ReportQuery},
        tip::{DistributePayload, DistributionSummary},
    },
    services::report_service::{leaderboard_csv, report_file_name},
};

// Todas as rotas abaixo operam sobre a corporação do usuário logado (`user.id`)

// GET /api/corporations/me
#[utoipa::path(
    get,
    path = "/api/corporations/me",
    tag = "Corporations",
    responses(
        (status = 200, description = "Dados da corporação", body = CorporateEntity),
        (status = 404, description = "Corporação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_my_corporation(
    State(app_state): State<AppState>,
    locale: Locale,
    corporate: RequireRole<CorporateOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let corporation = app_state
        .corporate_service
        .corporation(&corporate.user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(corporation)))
}

// PATCH /api/corporations/me/settings
#[utoipa::path(
    patch,
    path = "/api/corporations/me/settings",
    tag = "Corporations",
    request_body = CorporateSettings,
    responses(
        (status = 200, description = "Configurações atualizadas (allowTips, logoUrl)", body = CorporateEntity)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    locale: Locale,
    corporate: RequireRole<CorporateOnly>,
    Json(payload): Json<CorporateSettings>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = app_state
        .corporate_service
        .update_settings(&corporate.user.id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(updated)))
}

// GET /api/corporations/me/associates
#[utoipa::path(
    get,
    path = "/api/corporations/me/associates",
    tag = "Corporations",
    responses(
        (status = 200, description = "Equipe da corporação", body = [Associate])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_team(
    State(app_state): State<AppState>,
    locale: Locale,
    corporate: RequireRole<CorporateOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let team = app_state
        .corporate_service
        .team(&corporate.user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(team)))
}

// POST /api/corporations/me/associates
#[utoipa::path(
    post,
    path = "/api/corporations/me/associates",
    tag = "Corporations",
    request_body = AddAssociatePayload,
    responses(
        (status = 201, description = "Associado adicionado", body = Associate),
        (status = 400, description = "Campos obrigatórios ausentes")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_associate(
    State(app_state): State<AppState>,
    locale: Locale,
    corporate: RequireRole<CorporateOnly>,
    Json(payload): Json<AddAssociatePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let associate = app_state
        .corporate_service
        .add_associate(&corporate.user.id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(associate)))
}

// POST /api/corporations/me/associates/import
#[utoipa::path(
    post,
    path = "/api/corporations/me/associates/import",
    tag = "Corporations",
    request_body(content = String, content_type = "text/csv", description = "Cabeçalho: email,name,role,aboutMe"),
    responses(
        (status = 200, description = "Resultado do import em lote", body = BulkImportResult),
        (status = 400, description = "CSV inválido ou sem linhas válidas")
    ),
    security(("api_jwt" = []))
)]
pub async fn import_associates(
    State(app_state): State<AppState>,
    locale: Locale,
    corporate: RequireRole<CorporateOnly>,
    csv: String,
) -> Result<impl IntoResponse, ApiError> {
    let result = app_state
        .corporate_service
        .bulk_import(&corporate.user.id, &csv)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(result)))
}

// DELETE /api/corporations/me/associates/{id}
#[utoipa::path(
    delete,
    path = "/api/corporations/me/associates/{id}",
    tag = "Corporations",
    responses(
        (status = 204, description = "Associado removido"),
        (status = 403, description = "Associado de outra corporação")
    ),
    params(("id" = String, Path, description = "ID do associado")),
    security(("api_jwt" = []))
)]
pub async fn remove_associate(
    State(app_state): State<AppState>,
    locale: Locale,
    corporate: RequireRole<CorporateOnly>,
    Path(associate_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .corporate_service
        .remove_associate(&corporate.user.id, &associate_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// PATCH /api/corporations/me/associates/{id}
#[utoipa::path(
    patch,
    path = "/api/corporations/me/associates/{id}",
    tag = "Corporations",
    request_body = AssociateTipsPayload,
    responses(
        (status = 200, description = "Gorjetas do associado ligadas/desligadas", body = Associate)
    ),
    params(("id" = String, Path, description = "ID do associado")),
    security(("api_jwt" = []))
)]
pub async fn set_associate_tips(
    State(app_state): State<AppState>,
    locale: Locale,
    corporate: RequireRole<CorporateOnly>,
    Path(associate_id): Path<String>,
    Json(payload): Json<AssociateTipsPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let associate = app_state
        .corporate_service
        .set_associate_tips(&corporate.user.id, &associate_id, payload.allow_tips)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(associate)))
}

// GET /api/corporations/me/join-requests
#[utoipa::path(
    get,
    path = "/api/corporations/me/join-requests",
    tag = "Corporations",
    responses(
        (status = 200, description = "Pedidos de entrada pendentes", body = [JoinRequest])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_join_requests(
    State(app_state): State<AppState>,
    locale: Locale,
    corporate: RequireRole<CorporateOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let requests = app_state
        .corporate_service
        .pending_requests(&corporate.user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(requests)))
}

// POST /api/corporations/me/join-requests/{id}/approve
#[utoipa::path(
    post,
    path = "/api/corporations/me/join-requests/{id}/approve",
    tag = "Corporations",
    responses(
        (status = 200, description = "Pedido aprovado; associado criado", body = Associate),
        (status = 400, description = "Pedido já tratado")
    ),
    params(("id" = String, Path, description = "ID do pedido")),
    security(("api_jwt" = []))
)]
pub async fn approve_join_request(
    State(app_state): State<AppState>,
    locale: Locale,
    corporate: RequireRole<CorporateOnly>,
    Path(request_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let associate = app_state
        .corporate_service
        .approve_request(&corporate.user.id, &request_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(associate)))
}

// POST /api/corporations/me/join-requests/{id}/deny
#[utoipa::path(
    post,
    path = "/api/corporations/me/join-requests/{id}/deny",
    tag = "Corporations",
    responses(
        (status = 204, description = "Pedido negado")
    ),
    params(("id" = String, Path, description = "ID do pedido")),
    security(("api_jwt" = []))
)]
pub async fn deny_join_request(
    State(app_state): State<AppState>,
    locale: Locale,
    corporate: RequireRole<CorporateOnly>,
    Path(request_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .corporate_service
        .deny_request(&corporate.user.id, &request_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/corporations/me/summary
#[utoipa::path(
    get,
    path = "/api/corporations/me/summary",
    tag = "Corporations",
    responses(
        (status = 200, description = "Pool atual: gorjetas do dia, total, retenção e líquido", body = CorporateSummary)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    corporate: RequireRole<CorporateOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = app_state
        .report_service
        .corporate_summary(&corporate.user.id, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(summary)))
}

// POST /api/corporations/me/distribute
#[utoipa::path(
    post,
    path = "/api/corporations/me/distribute",
    tag = "Corporations",
    request_body = DistributePayload,
    responses(
        (status = 200, description = "Pool zerado; resumo apenas para exibição", body = DistributionSummary),
        (status = 403, description = "Associado de outra corporação")
    ),
    security(("api_jwt" = []))
)]
pub async fn distribute(
    State(app_state): State<AppState>,
    locale: Locale,
    corporate: RequireRole<CorporateOnly>,
    Json(payload): Json<DistributePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = app_state
        .tip_service
        .distribute(&corporate.user.id, payload.associate_id.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(summary)))
}

// GET /api/corporations/me/reports
#[utoipa::path(
    get,
    path = "/api/corporations/me/reports",
    tag = "Corporations",
    params(ReportQuery),
    responses(
        (status = 200, description = "KPIs e ranking do período", body = CorporateReport)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_report(
    State(app_state): State<AppState>,
    locale: Locale,
    corporate: RequireRole<CorporateOnly>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let report = app_state
        .report_service
        .corporate_report(&corporate.user.id, query.period, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(report)))
}

// GET /api/corporations/me/reports/csv
#[utoipa::path(
    get,
    path = "/api/corporations/me/reports/csv",
    tag = "Corporations",
    params(ReportQuery),
    responses(
        (status = 200, description = "Ranking do período em CSV", content_type = "text/csv", body = String)
    ),
    security(("api_jwt" = []))
)]
pub async fn export_report_csv(
    State(app_state): State<AppState>,
    locale: Locale,
    corporate: RequireRole<CorporateOnly>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ApiError> {
    let now = Utc::now();
    let report = app_state
        .report_service
        .corporate_report(&corporate.user.id, query.period, now)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let disposition = format!("attachment; filename=\"{}\"", report_file_name(query.period, now));
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
        (header::CONTENT_DISPOSITION, disposition.as_str()),
    ];

    Ok((headers, leaderboard_csv(&report.leaderboard)).into_response())
}
