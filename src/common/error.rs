use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

// Nosso tipo de erro de domínio. Cada variante é uma falha "escopada" numa ação do usuário:
// nada aqui derruba o processo.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error")]
    ValidationError(#[from] validator::ValidationErrors),

    // Campo obrigatório vazio e afins (mensagem inline, envio bloqueado)
    #[error("{0}")]
    InvalidInput(String),

    #[error("This email is already registered. Please log in.")]
    EmailAlreadyExists,

    #[error("Password should be at least 6 characters long.")]
    WeakPassword,

    #[error("Failed to login. Please check your credentials.")]
    InvalidCredentials,

    #[error("Invalid or missing authentication token.")]
    InvalidToken,

    #[error("User profile not found. Please complete setup.")]
    ProfileNotFound,

    #[error("{0}")]
    WrongPortal(String),

    #[error("You do not have access to this resource.")]
    Forbidden,

    // O guard de papéis devolve para onde o cliente deve ir
    #[error("Redirect required")]
    RoleRedirect { redirect_to: String },

    #[error("Associate not found: {0}")]
    AssociateNotFound(String),

    #[error("Corporation not found: {0}")]
    CorporationNotFound(String),

    #[error("Bravo not found: {0}")]
    TipNotFound(String),

    #[error("Join request not found: {0}")]
    JoinRequestNotFound(String),

    #[error("Document not found: {collection}/{id}")]
    DocumentNotFound { collection: &'static str, id: String },

    #[error("This account has already been claimed. Please log in.")]
    AlreadyClaimed,

    #[error("This Bravo has already been claimed by another customer.")]
    TipAlreadyClaimed,

    #[error("The recipient has not set up their account for messaging.")]
    RecipientUnavailable,

    #[error("Not a valid Bravos QR code.")]
    InvalidScanPayload,

    #[error("Associate not found from the scanned code.")]
    ScannedAssociateNotFound,

    #[error("Payment declined: {0}")]
    PaymentDeclined(String),

    #[error("Signup session not found.")]
    SignupSessionNotFound,

    #[error("{0}")]
    InvalidSignupStep(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Font not found: {0}")]
    FontNotFound(String),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // `anyhow::Error` captura o contexto de qualquer outro erro inesperado.
    #[error("Internal server error")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// O erro que de fato vai para o cliente (já traduzido)
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidInput(_)
            | AppError::WeakPassword
            | AppError::InvalidScanPayload
            | AppError::InvalidSignupStep(_) => StatusCode::BAD_REQUEST,
            AppError::EmailAlreadyExists | AppError::AlreadyClaimed | AppError::TipAlreadyClaimed => {
                StatusCode::CONFLICT
            }
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::WrongPortal(_) | AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::RoleRedirect { redirect_to } => {
                if redirect_to.ends_with("login") {
                    StatusCode::UNAUTHORIZED
                } else {
                    StatusCode::FORBIDDEN
                }
            }
            AppError::ProfileNotFound
            | AppError::AssociateNotFound(_)
            | AppError::CorporationNotFound(_)
            | AppError::TipNotFound(_)
            | AppError::JoinRequestNotFound(_)
            | AppError::DocumentNotFound { .. }
            | AppError::ScannedAssociateNotFound
            | AppError::SignupSessionNotFound => StatusCode::NOT_FOUND,
            AppError::RecipientUnavailable => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::PaymentDeclined(_) => StatusCode::PAYMENT_REQUIRED,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Chave estável usada pelo I18nStore. Variantes sem chave usam o `Display` em inglês.
    pub fn i18n_key(&self) -> Option<&'static str> {
        match self {
            AppError::ValidationError(_) => Some("validation_failed"),
            AppError::EmailAlreadyExists => Some("email_already_exists"),
            AppError::WeakPassword => Some("weak_password"),
            AppError::InvalidCredentials => Some("invalid_credentials"),
            AppError::InvalidToken => Some("invalid_token"),
            AppError::ProfileNotFound => Some("profile_not_found"),
            AppError::Forbidden => Some("forbidden"),
            AppError::RoleRedirect { .. } => Some("role_redirect"),
            AppError::AlreadyClaimed => Some("already_claimed"),
            AppError::TipAlreadyClaimed => Some("tip_already_claimed"),
            AppError::RecipientUnavailable => Some("recipient_unavailable"),
            AppError::InvalidScanPayload => Some("invalid_scan_payload"),
            AppError::ScannedAssociateNotFound => Some("scanned_associate_not_found"),
            AppError::SignupSessionNotFound => Some("signup_session_not_found"),
            _ => None,
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                Some(json!(details))
            }
            AppError::RoleRedirect { redirect_to } => Some(json!({ "redirectTo": redirect_to })),
            _ => None,
        }
    }

    /// Converte o erro de domínio na resposta localizada.
    pub fn to_api_error(self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status();

        if status.is_server_error() {
            // O `tracing` loga a mensagem detalhada que o `thiserror` nos deu.
            tracing::error!("🔥 Erro Interno do Servidor: {:?}", self);
        }

        let error = match self.i18n_key().and_then(|key| store.translate(&locale.0, key)) {
            Some(message) => message.to_string(),
            None if status == StatusCode::INTERNAL_SERVER_ERROR => store
                .translate(&locale.0, "unexpected")
                .unwrap_or("An unexpected error occurred.")
                .to_string(),
            None => self.to_string(),
        };

        ApiError {
            status,
            error,
            details: self.details(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

// Para extratores que rejeitam antes de sabermos o idioma: cai no inglês padrão.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), I18nStore::shared())
            .into_response()
    }
}
