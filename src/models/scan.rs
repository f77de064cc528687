// src/models/scan.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::associate::Associate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ScanPayload {
    // O texto lido do QR code
    #[validate(length(min = 1, message = "Not a valid Bravos QR code."))]
    #[schema(example = "https://bravos.app/#/customer/ABC123")]
    pub data: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    /// Rota do cliente web para onde navegar
    #[schema(example = "/customer?scanned=ABC123")]
    pub redirect_to: String,
    pub associate: Associate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corporation_name: Option<String>,
    // Só para associados corporativos: a equipe inteira (seleção)
    pub teammates: Vec<Associate>,
}
