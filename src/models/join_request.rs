// src/models/join_request.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JoinRequestStatus {
    Pending,
    Approved,
    Denied,
}

impl JoinRequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JoinRequestStatus::Pending => "pending",
            JoinRequestStatus::Approved => "approved",
            JoinRequestStatus::Denied => "denied",
        }
    }
}

// Pedido de um funcionário para entrar numa corporação
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub id: String,
    pub corporate_id: String,
    pub email: String,
    pub name: String,
    pub avatar_url: String,
    pub status: JoinRequestStatus,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJoinRequest {
    pub corporate_id: String,
    pub email: String,
    pub name: String,
    pub avatar_url: String,
    pub status: JoinRequestStatus,
    pub timestamp: DateTime<Utc>,
}

impl NewJoinRequest {
    pub fn pending(corporate_id: &str, email: &str, name: &str, avatar_url: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            corporate_id: corporate_id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            avatar_url: avatar_url.to_string(),
            status: JoinRequestStatus::Pending,
            timestamp,
        }
    }

    pub fn into_join_request(self, id: String) -> JoinRequest {
        JoinRequest {
            id,
            corporate_id: self.corporate_id,
            email: self.email,
            name: self.name,
            avatar_url: self.avatar_url,
            status: self.status,
            timestamp: self.timestamp,
        }
    }
}
