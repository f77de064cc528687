// src/models/auth.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::user::CurrentUser;

// Registro do serviço de autenticação (coleção `credentials`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub auth_uid: String,
    pub email: String,
    pub password_hash: String,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginUserPayload {
    #[validate(email(message = "The email provided is invalid."))]
    #[schema(example = "ana@hotel.com")]
    pub email: String,

    #[validate(length(min = 1, message = "Please enter both email and password."))]
    pub password: String,

    // Bravo enviado como convidado, para ser vinculado depois do login
    #[serde(default)]
    pub claim_tip_id: Option<String>,
}

// Resposta de autenticação com o token
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub current_user: CurrentUser,
    #[schema(example = "/associate")]
    pub home_path: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (authUid)
    pub exp: usize,  // Expiration time (quando o token expira)
    pub iat: usize,  // Issued At (quando o token foi criado)
}
