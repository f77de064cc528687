// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, Credential},
};

const MIN_PASSWORD_LEN: usize = 6;

// O serviço de autenticação: credenciais (bcrypt) + sessão (JWT com sub = authUid)
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, bcrypt_cost: u32) -> Self {
        Self { user_repo, jwt_secret, bcrypt_cost }
    }

    /// Cria a identidade e devolve o novo authUid.
    pub async fn register_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::WeakPassword);
        }

        // Hashing é CPU-bound: roda fora do executor
        let password_clone = password.to_owned();
        let cost = self.bcrypt_cost;
        let hashed_password = tokio::task::spawn_blocking(move || hash(&password_clone, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let auth_uid = Uuid::new_v4().simple().to_string();
        self.user_repo
            .create_credential(&Credential {
                auth_uid: auth_uid.clone(),
                email: email.trim().to_lowercase(),
                password_hash: hashed_password,
            })
            .await?;

        tracing::info!("👤 Nova identidade criada para {}", email);
        Ok(auth_uid)
    }

    /// Confere email/senha e devolve o authUid.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<String, AppError> {
        let credential = self
            .user_repo
            .find_credential_by_email(email.trim())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = credential.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        Ok(credential.auth_uid)
    }

    /// Valida o token e devolve o authUid (claim `sub`).
    pub fn validate_token(&self, token: &str) -> Result<String, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(token_data.claims.sub)
    }

    pub fn create_token(&self, auth_uid: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: auth_uid.to_string(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
