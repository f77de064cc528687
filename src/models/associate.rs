// src/models/associate.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// ---
// Associate (o "Profissional" que recebe Bravos)
// ---
// `corporate_id` existe se e somente se `is_corporate` for true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Associate {
    #[schema(example = "ABC123")]
    pub id: String,

    // Só existe depois que o associado reivindica a conta
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_uid: Option<String>,

    #[schema(example = "ana@hotel.com")]
    pub email: String,

    #[schema(example = "Ana Souza")]
    pub name: String,

    #[schema(example = "Concierge")]
    pub role: String,

    pub is_corporate: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corporate_id: Option<String>,

    pub avatar_url: String,
    pub allow_tips: bool,

    #[serde(default)]
    pub about_me: String,
}

impl Associate {
    pub fn is_claimed(&self) -> bool {
        self.auth_uid.is_some()
    }

    pub fn belongs_to(&self, corporate_id: &str) -> bool {
        self.is_corporate && self.corporate_id.as_deref() == Some(corporate_id)
    }
}

/// Dados de um associado ainda sem ID (o documento que vai para o banco).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAssociate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_uid: Option<String>,
    pub email: String,
    pub name: String,
    pub role: String,
    is_corporate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    corporate_id: Option<String>,
    pub avatar_url: String,
    pub allow_tips: bool,
    pub about_me: String,
}

impl NewAssociate {
    pub fn independent(email: &str, name: &str, role: &str, about_me: &str, avatar_url: &str) -> Self {
        Self {
            auth_uid: None,
            email: email.to_string(),
            name: name.to_string(),
            role: role.to_string(),
            is_corporate: false,
            corporate_id: None,
            avatar_url: avatar_url.to_string(),
            allow_tips: true,
            about_me: about_me.to_string(),
        }
    }

    pub fn corporate(
        corporate_id: &str,
        email: &str,
        name: &str,
        role: &str,
        about_me: &str,
        avatar_url: &str,
    ) -> Self {
        Self {
            auth_uid: None,
            email: email.to_string(),
            name: name.to_string(),
            role: role.to_string(),
            is_corporate: true,
            corporate_id: Some(corporate_id.to_string()),
            avatar_url: avatar_url.to_string(),
            allow_tips: true,
            about_me: about_me.to_string(),
        }
    }

    pub fn with_auth_uid(mut self, auth_uid: &str) -> Self {
        self.auth_uid = Some(auth_uid.to_string());
        self
    }

    pub fn with_allow_tips(mut self, allow_tips: bool) -> Self {
        self.allow_tips = allow_tips;
        self
    }

    pub fn corporate_id(&self) -> Option<&str> {
        self.corporate_id.as_deref()
    }

    pub fn into_associate(self, id: String) -> Associate {
        Associate {
            id,
            auth_uid: self.auth_uid,
            email: self.email,
            name: self.name,
            role: self.role,
            is_corporate: self.is_corporate,
            corporate_id: self.corporate_id,
            avatar_url: self.avatar_url,
            allow_tips: self.allow_tips,
            about_me: self.about_me,
        }
    }
}

// Campos que o próprio associado (ou o admin) pode alterar.
// Campos ausentes não entram no patch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssociateSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_tips: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Ana S.")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about_me: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl AssociateSettings {
    pub fn is_empty(&self) -> bool {
        self.allow_tips.is_none()
            && self.name.is_none()
            && self.about_me.is_none()
            && self.avatar_url.is_none()
    }
}

// PATCH /api/associates/me (o associado não altera o próprio allowTips)
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdatePayload {
    #[validate(length(min = 1, message = "Name cannot be empty."))]
    pub name: Option<String>,

    pub about_me: Option<String>,

    #[validate(length(min = 1, message = "Avatar URL cannot be empty."))]
    pub avatar_url: Option<String>,
}

impl From<ProfileUpdatePayload> for AssociateSettings {
    fn from(payload: ProfileUpdatePayload) -> Self {
        Self {
            allow_tips: None,
            name: payload.name,
            about_me: payload.about_me,
            avatar_url: payload.avatar_url,
        }
    }
}

// PATCH /api/corporations/me/associates/{id}
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssociateTipsPayload {
    pub allow_tips: bool,
}

// POST /api/corporations/me/associates
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddAssociatePayload {
    #[validate(length(min = 1, message = "All fields are required."))]
    #[schema(example = "Bruno Lima")]
    pub name: String,

    #[validate(email(message = "The email provided is invalid."))]
    #[schema(example = "bruno@hotel.com")]
    pub email: String,

    #[validate(length(min = 1, message = "All fields are required."))]
    #[schema(example = "Bellhop")]
    pub role: String,

    #[validate(length(min = 1, message = "All fields are required."))]
    pub about_me: String,

    #[serde(default = "default_true")]
    pub allow_tips: bool,
}

fn default_true() -> bool {
    true
}

// Resultado do import em lote via CSV
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkImportResult {
    pub imported: usize,
    pub skipped: usize,
}

// Visão pública usada no formulário de gorjeta
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TippingProfile {
    pub associate: Associate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corporation_name: Option<String>,
    // associado.allowTips && corporação.allowTips (independentes sempre podem)
    pub allow_tips: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_keep_corporate_id_in_sync_with_flag() {
        let solo = NewAssociate::independent("a@b.com", "A", "Barista", "", "url");
        assert!(!solo.is_corporate);
        assert!(solo.corporate_id().is_none());

        let member = NewAssociate::corporate("corp-1", "a@b.com", "A", "Barista", "", "url");
        assert!(member.is_corporate);
        assert_eq!(member.corporate_id(), Some("corp-1"));
    }

    #[test]
    fn settings_patch_skips_missing_fields() {
        let patch = AssociateSettings { allow_tips: Some(false), ..Default::default() };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "allowTips": false }));
    }
}
