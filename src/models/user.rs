// src/models/user.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Os três papéis da aplicação
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Associate,
    Corporate,
    Customer,
}

impl UserType {
    /// Rota inicial de cada papel (o "dashboard" do cliente web)
    pub fn home_path(self) -> &'static str {
        match self {
            UserType::Associate => "/associate",
            UserType::Corporate => "/corporate",
            UserType::Customer => "/customer-dashboard",
        }
    }
}

// ---
// Documento `users/{authUid}`: liga a identidade de auth ao documento do papel
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "type")]
    pub user_type: UserType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associate_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corporate_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl UserProfile {
    pub fn associate(associate_id: &str, avatar_url: &str) -> Self {
        Self {
            user_type: UserType::Associate,
            associate_id: Some(associate_id.to_string()),
            corporate_id: None,
            name: None,
            avatar_url: Some(avatar_url.to_string()),
        }
    }

    pub fn corporate(corporate_id: &str, avatar_url: &str) -> Self {
        Self {
            user_type: UserType::Corporate,
            associate_id: None,
            corporate_id: Some(corporate_id.to_string()),
            name: None,
            avatar_url: Some(avatar_url.to_string()),
        }
    }

    pub fn customer(name: &str, avatar_url: &str) -> Self {
        Self {
            user_type: UserType::Customer,
            associate_id: None,
            corporate_id: None,
            name: Some(name.to_string()),
            avatar_url: Some(avatar_url.to_string()),
        }
    }
}

// ---
// CurrentUser: a visão da sessão, reconstruída a cada mudança de autenticação
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub auth_uid: String,

    // ID do associado, da corporação ou o próprio authUid (clientes)
    pub id: String,

    #[serde(rename = "type")]
    pub user_type: UserType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl CurrentUser {
    pub fn is(&self, user_type: UserType) -> bool {
        self.user_type == user_type
    }
}
