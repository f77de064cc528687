// src/models/tip.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::payment::PaymentDetails;

// ---
// Tip (o "Bravo")
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tip {
    pub id: String,
    pub associate_id: String,

    // Cópia do corporateId do associado no momento do envio.
    // É o que permite "distribuir" o pool inteiro de uma corporação.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corporate_id: Option<String>,

    #[schema(value_type = f64, example = 10.0)]
    pub amount: Decimal,

    pub message: String,
    pub customer_name: String,
    pub timestamp: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_auth_uid: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTip {
    pub associate_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corporate_id: Option<String>,
    pub amount: Decimal,
    pub message: String,
    pub customer_name: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_auth_uid: Option<String>,
}

impl NewTip {
    pub fn into_tip(self, id: String) -> Tip {
        Tip {
            id,
            associate_id: self.associate_id,
            corporate_id: self.corporate_id,
            amount: self.amount,
            message: self.message,
            customer_name: self.customer_name,
            timestamp: self.timestamp,
            customer_auth_uid: self.customer_auth_uid,
        }
    }
}

// POST /api/tips
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendTipPayload {
    #[validate(length(min = 1, message = "Associate is required."))]
    pub associate_id: String,

    #[serde(default)]
    #[schema(value_type = Option<f64>, example = 10.0)]
    pub amount: Option<Decimal>,

    #[serde(default)]
    #[schema(example = "Thank you for your excellent service!")]
    pub message: String,

    #[serde(default)]
    #[schema(example = "Alex")]
    pub customer_name: String,

    #[serde(default)]
    pub payment: Option<PaymentDetails>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SentTip {
    pub tip: Tip,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
}

// Resumo de uma "distribuição" (apenas para exibição, nada é gravado)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DistributionSummary {
    #[schema(value_type = f64)]
    pub gross: Decimal,
    #[schema(value_type = f64)]
    pub withheld: Decimal,
    #[schema(value_type = f64)]
    pub net: Decimal,
    pub tips_cleared: u64,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DistributePayload {
    // Ausente = pool inteiro da corporação
    #[serde(default)]
    pub associate_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThankYouNote {
    pub note: String,
}
