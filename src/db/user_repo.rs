// src/db/user_repo.rs

use serde_json::json;

use crate::{
    common::error::AppError,
    db::documents::{decode_all, Collection, Filter, SharedDocumentStore},
    models::{auth::Credential, user::UserProfile},
};

// Perfis (`users/{authUid}`) e credenciais do serviço de autenticação
#[derive(Clone)]
pub struct UserRepository {
    store: SharedDocumentStore,
}

impl UserRepository {
    pub fn new(store: SharedDocumentStore) -> Self {
        Self { store }
    }

    pub async fn find_profile(&self, auth_uid: &str) -> Result<Option<UserProfile>, AppError> {
        match self.store.get(Collection::Users, auth_uid).await? {
            // O ID do documento é o authUid, não um campo do perfil
            Some(doc) => Ok(Some(serde_json::from_value(doc.data)?)),
            None => Ok(None),
        }
    }

    pub async fn set_profile(&self, auth_uid: &str, profile: &UserProfile) -> Result<(), AppError> {
        self.store
            .set(Collection::Users, auth_uid, serde_json::to_value(profile)?)
            .await
    }

    pub async fn update_avatar(&self, auth_uid: &str, avatar_url: &str) -> Result<(), AppError> {
        self.store
            .update(Collection::Users, auth_uid, json!({ "avatarUrl": avatar_url }))
            .await
    }

    pub async fn find_credential_by_email(&self, email: &str) -> Result<Option<Credential>, AppError> {
        let docs = self
            .store
            .query(Collection::Credentials, &[Filter::eq("email", email.to_lowercase())])
            .await?;
        let credentials: Vec<Credential> = decode_all(Collection::Credentials, docs);
        Ok(credentials.into_iter().next())
    }

    /// Cria a credencial. Um email só pode ter uma credencial.
    pub async fn create_credential(&self, credential: &Credential) -> Result<(), AppError> {
        let created = self
            .store
            .create_unique(
                Collection::Credentials,
                &credential.auth_uid,
                serde_json::to_value(credential)?,
                &[Filter::eq("email", credential.email.to_lowercase())],
            )
            .await?;
        if !created {
            return Err(AppError::EmailAlreadyExists);
        }
        Ok(())
    }

    pub async fn delete_credential(&self, auth_uid: &str) -> Result<bool, AppError> {
        self.store.delete(Collection::Credentials, auth_uid).await
    }

    pub async fn delete_profile(&self, auth_uid: &str) -> Result<bool, AppError> {
        self.store.delete(Collection::Users, auth_uid).await
    }
}
