// src/models/corporation.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// A empresa que agrupa associados
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CorporateEntity {
    pub id: String,

    #[schema(example = "Hotel Copacabana")]
    pub name: String,

    pub allow_tips: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCorporation {
    pub name: String,
    pub allow_tips: bool,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CorporateSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_tips: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}
